// Trap and accumulation zones built from the session, the Gaussian band and historical supports
use crate::config::PolicyParams;
use serde_json::Value;
use shared::models::{AnalysisPolicy, MarketBar};
use shared::snapshot::{AccumulationZones, GaussianBand, HistoricalLevels, PriceZone, TrapZones};

/// The primary accumulation zone never starts more than 0.5% under the nearest support.
const SUPPORT_TOLERANCE: f64 = 0.995;

/// Supports that must have been found before a secondary accumulation zone is drawn.
const SECONDARY_ZONE_MIN_SUPPORTS: usize = 4;

pub struct ZoneSynthesizer {
    name: String,
    policy: AnalysisPolicy,
    trap_fraction: f64,
}

impl ZoneSynthesizer {
    pub fn new(params: &PolicyParams) -> Self {
        Self {
            name: format!("Zones({})", params.policy),
            policy: params.policy,
            trap_fraction: params.trap_range_fraction,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> Value {
        serde_json::json!({ "policy": self.policy, "trap_fraction": self.trap_fraction })
    }

    pub fn trap_zones(&self, latest: &MarketBar, band: &GaussianBand) -> TrapZones {
        let offset = latest.range() * self.trap_fraction;
        let (buy_floor, sell_ceiling) = match self.policy {
            // Classic lets the open pull the trap closer to the extreme it sits next to
            AnalysisPolicy::Classic => (
                latest.open.max(latest.high - offset),
                latest.open.min(latest.low + offset),
            ),
            AnalysisPolicy::Extended => (latest.high - offset, latest.low + offset),
        };
        let (mean, sigma) = (band.equilibrium, band.std_dev);

        TrapZones {
            buy_trap: PriceZone::between(buy_floor, latest.high),
            sell_trap: PriceZone::between(latest.low, sell_ceiling),
            seller_defense: PriceZone::between(mean + 2.0 * sigma, mean + 3.0 * sigma),
        }
    }

    pub fn accumulation_zones(&self, band: &GaussianBand, historical: &HistoricalLevels) -> AccumulationZones {
        let (mean, sigma) = (band.equilibrium, band.std_dev);
        let lower_band = mean - 2.0 * sigma;
        let floor = match historical.support(1) {
            Some(nearest) => lower_band.max(nearest * SUPPORT_TOLERANCE),
            None => lower_band,
        };
        let primary = PriceZone::between(floor, mean - sigma);

        let secondary = if historical.distinct_supports >= SECONDARY_ZONE_MIN_SUPPORTS {
            historical
                .support(4)
                .zip(historical.support(3))
                .map(|(deeper, nearer)| PriceZone::between(deeper, nearer))
        } else {
            None
        };

        AccumulationZones { primary, secondary }
    }

    pub fn synthesize(
        &self,
        latest: &MarketBar,
        band: &GaussianBand,
        historical: &HistoricalLevels,
    ) -> (TrapZones, AccumulationZones) {
        (self.trap_zones(latest, band), self.accumulation_zones(band, historical))
    }
}
