// Helpers shared by the engine's parser and anything that presents a snapshot.

/// Brazilian number and date conventions: `1.234,56` and `dd/mm/yyyy`.
pub mod brazilian_format {
    use anyhow::{anyhow, Result};
    use chrono::NaiveDate;
    use std::str::FromStr;

    // Parses decimals like "1.234,56" or "123,45" into f64
    pub fn parse_decimal(s: &str) -> Result<f64> {
        let normalized = s.trim()
            .replace('.', "")  // Remove thousand separators
            .replace(',', "."); // Replace decimal separator

        f64::from_str(&normalized)
            .map_err(|e| anyhow!("Failed to parse decimal '{}': {}", s, e))
    }

    pub fn parse_date(s: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(s.trim(), "%d/%m/%Y")
            .map_err(|e| anyhow!("Failed to parse date '{}': {}", s, e))
    }

    pub fn format_date(date: NaiveDate) -> String {
        date.format("%d/%m/%Y").to_string()
    }

    /// Formats with `.` grouping thousands and `,` before the decimals.
    pub fn format_decimal(value: f64, decimals: usize) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let digits = format!("{:.decimals$}", value.abs(), decimals = decimals);
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (digits.as_str(), None),
        };

        let mut out = String::with_capacity(digits.len() + int_part.len() / 3 + 1);
        // no "-0,00" for values that round to zero
        if value < 0.0 && digits.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
            out.push('-');
        }
        for (idx, ch) in int_part.chars().enumerate() {
            if idx > 0 && (int_part.len() - idx) % 3 == 0 {
                out.push('.');
            }
            out.push(ch);
        }
        if let Some(frac) = frac_part {
            out.push(',');
            out.push_str(frac);
        }
        out
    }

    pub fn format_price(value: f64) -> String {
        format_decimal(value, 2)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::Datelike;

        #[test]
        fn test_parse_decimal_simple() {
            assert_eq!(parse_decimal("123,45").unwrap(), 123.45);
        }

        #[test]
        fn test_parse_decimal_with_thousands() {
            assert_eq!(parse_decimal("1.234,56").unwrap(), 1234.56);
        }

        #[test]
        fn test_parse_decimal_index_points() {
            // index quotes are exported with a thousands dot and no decimals
            assert_eq!(parse_decimal("124.080").unwrap(), 124080.0);
        }

        #[test]
        fn test_parse_decimal_invalid() {
            assert!(parse_decimal("abc").is_err());
            assert!(parse_decimal("").is_err());
        }

        #[test]
        fn test_parse_date_valid() {
            let date = parse_date("30/12/2024").unwrap();
            assert_eq!((date.year(), date.month(), date.day()), (2024, 12, 30));
        }

        #[test]
        fn test_parse_date_invalid() {
            assert!(parse_date("32/12/2024").is_err());
            assert!(parse_date("2024-12-30").is_err());
        }

        #[test]
        fn test_format_date() {
            let date = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
            assert_eq!(format_date(date), "06/01/2025");
        }

        #[test]
        fn test_format_decimal_grouping() {
            assert_eq!(format_decimal(1234.56, 2), "1.234,56");
            assert_eq!(format_decimal(1234567.0, 0), "1.234.567");
            assert_eq!(format_decimal(123.0, 2), "123,00");
            assert_eq!(format_decimal(-98765.4321, 1), "-98.765,4");
        }

        #[test]
        fn test_format_decimal_negative_zero() {
            assert_eq!(format_decimal(-0.001, 2), "0,00");
        }

        #[test]
        fn test_format_price_round_trip() {
            let text = format_price(600822115.84);
            assert_eq!(text, "600.822.115,84");
            assert_eq!(parse_decimal(&text).unwrap(), 600822115.84);
        }
    }
}
