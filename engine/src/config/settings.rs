// Engine settings, loaded from an optional JSON file on top of the defaults
use serde::Deserialize;
use shared::models::AnalysisPolicy;
use std::path::Path;

use super::policy::PolicyParams;
use crate::error::{EngineError, Result};

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub policy: AnalysisPolicy,
    pub input: InputSettings,
    pub risk: RiskSettings,
    pub overrides: PolicyOverrides,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputLayout {
    /// Whitespace separated `date open high low close` columns after a header line.
    #[default]
    Table,
    /// Delimited export with named columns (`Data;Abertura;Máximo;Mínimo;Fechamento`).
    Delimited,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct InputSettings {
    pub layout: InputLayout,
    pub delimiter: String, // Single ASCII character; JSON string is easier to write
}

impl Default for InputSettings {
    fn default() -> Self {
        InputSettings {
            layout: InputLayout::Table,
            delimiter: ";".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RiskSettings {
    /// Money per point per contract.
    pub cost_per_point: f64,
}

impl Default for RiskSettings {
    fn default() -> Self {
        // mini index contract
        RiskSettings { cost_per_point: 0.2 }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PolicyOverrides {
    pub atr_stop_multiplier: Option<f64>,
    pub historical_level_count: Option<usize>,
}

impl EngineSettings {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&raw)?;
        tracing::debug!(path = %path.display(), policy = %settings.policy, "Loaded engine settings");
        Ok(settings)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let settings: EngineSettings = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;
        if !(self.risk.cost_per_point.is_finite() && self.risk.cost_per_point > 0.0) {
            return Err(EngineError::ConfigError(format!(
                "risk.cost_per_point must be positive, got {}",
                self.risk.cost_per_point
            )));
        }
        if let Some(k) = self.overrides.atr_stop_multiplier {
            if !(k.is_finite() && k > 0.0) {
                return Err(EngineError::ConfigError(format!(
                    "overrides.atr_stop_multiplier must be positive, got {}",
                    k
                )));
            }
        }
        if self.overrides.historical_level_count == Some(0) {
            return Err(EngineError::ConfigError(
                "overrides.historical_level_count cannot be 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.input.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(EngineError::ConfigError(format!(
                "input.delimiter must be a single ASCII character, got '{}'",
                self.input.delimiter
            ))),
        }
    }

    /// Policy defaults with the configured overrides applied.
    pub fn policy_params(&self) -> PolicyParams {
        let mut params = PolicyParams::for_policy(self.policy);
        if let Some(k) = self.overrides.atr_stop_multiplier {
            params.atr_stop_multiplier = k;
        }
        if let Some(count) = self.overrides.historical_level_count {
            params.historical_level_count = count;
        }
        params
    }
}
