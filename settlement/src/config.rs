//! Configuration for the settlement engine

use crate::types::{Surcharge, TipMode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Settlement configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Default tip and tax
    pub surcharge: Surcharge,

    /// Output formatting
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "expense-settlement".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            surcharge: Surcharge::new(TipMode::Percentage(Decimal::from(10)), Decimal::ZERO),
            display: DisplayConfig::default(),
        }
    }
}

/// Output formatting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Currency symbol placed before amounts
    pub currency_symbol: String,

    /// Decimal places shown for amounts
    pub decimal_places: u32,

    /// Trip / place label used in messages
    pub place_name: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            decimal_places: 2,
            place_name: "My Trip".to_string(),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load from `SETTLE_*` variables resolved by `lookup`
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> crate::Result<Self> {
        let mut config = Config::default();

        if let Some(symbol) = lookup("SETTLE_CURRENCY_SYMBOL") {
            config.display.currency_symbol = symbol;
        }

        if let Some(place) = lookup("SETTLE_PLACE_NAME") {
            config.display.place_name = place;
        }

        if let Some(places) = lookup("SETTLE_DECIMAL_PLACES") {
            config.display.decimal_places = places.trim().parse().map_err(|e| {
                crate::Error::Config(format!("SETTLE_DECIMAL_PLACES: {}", e))
            })?;
        }

        match (lookup("SETTLE_TIP_PERCENT"), lookup("SETTLE_TIP_FIXED")) {
            (Some(_), Some(_)) => {
                return Err(crate::Error::Config(
                    "SETTLE_TIP_PERCENT and SETTLE_TIP_FIXED are mutually exclusive".to_string(),
                ));
            }
            (Some(tip), None) => {
                config.surcharge.tip =
                    TipMode::Percentage(parse_decimal("SETTLE_TIP_PERCENT", &tip)?);
            }
            (None, Some(tip)) => {
                config.surcharge.tip = TipMode::Fixed(parse_decimal("SETTLE_TIP_FIXED", &tip)?);
            }
            (None, None) => {}
        }

        if let Some(tax) = lookup("SETTLE_TAX_PERCENT") {
            config.surcharge.tax_percent = parse_decimal("SETTLE_TAX_PERCENT", &tax)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> crate::Result<()> {
        self.surcharge
            .validate()
            .map_err(|e| crate::Error::Config(e.to_string()))?;

        if self.display.decimal_places > 8 {
            return Err(crate::Error::Config(format!(
                "decimal_places {} exceeds 8",
                self.display.decimal_places
            )));
        }

        Ok(())
    }
}

fn parse_decimal(var: &str, value: &str) -> crate::Result<Decimal> {
    Decimal::from_str(value.trim())
        .map_err(|e| crate::Error::Config(format!("{}: {}", var, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "expense-settlement");
        assert_eq!(config.surcharge.tip, TipMode::Percentage(Decimal::from(10)));
        assert_eq!(config.surcharge.tax_percent, Decimal::ZERO);
        assert_eq!(config.display.currency_symbol, "₹");
        assert_eq!(config.display.place_name, "My Trip");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[surcharge]
tax_percent = "5"
tip = {{ mode = "fixed", value = "40" }}

[display]
currency_symbol = "$"
place_name = "Goa"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.surcharge.tip, TipMode::Fixed(Decimal::from(40)));
        assert_eq!(config.surcharge.tax_percent, Decimal::from(5));
        assert_eq!(config.display.currency_symbol, "$");
        assert_eq!(config.display.decimal_places, 2);
        assert_eq!(config.service_name, "expense-settlement");
    }

    #[test]
    fn test_from_file_rejects_negative_tax() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[surcharge]\ntax_percent = \"-1\"\n").unwrap();

        assert!(matches!(
            Config::from_file(file.path()),
            Err(crate::Error::Config(_))
        ));
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "surcharge = 12").unwrap();

        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn test_from_vars() {
        let config = Config::from_vars(vars(&[
            ("SETTLE_CURRENCY_SYMBOL", "$"),
            ("SETTLE_PLACE_NAME", "Manali"),
            ("SETTLE_DECIMAL_PLACES", "0"),
            ("SETTLE_TIP_FIXED", "25.50"),
            ("SETTLE_TAX_PERCENT", "18"),
        ]))
        .unwrap();

        assert_eq!(config.display.currency_symbol, "$");
        assert_eq!(config.display.place_name, "Manali");
        assert_eq!(config.display.decimal_places, 0);
        assert_eq!(config.surcharge.tip, TipMode::Fixed(Decimal::new(2550, 2)));
        assert_eq!(config.surcharge.tax_percent, Decimal::from(18));
    }

    #[test]
    fn test_from_vars_defaults() {
        assert_eq!(Config::from_vars(vars(&[])).unwrap(), Config::default());
    }

    #[test]
    fn test_conflicting_tip_vars_rejected() {
        let result = Config::from_vars(vars(&[
            ("SETTLE_TIP_PERCENT", "10"),
            ("SETTLE_TIP_FIXED", "40"),
        ]));

        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_unparseable_var_rejected() {
        let result = Config::from_vars(vars(&[("SETTLE_TAX_PERCENT", "five")]));
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }
}
