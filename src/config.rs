//! Configuration loading
//!
//! All settings are optional with sensible defaults, so the tool runs
//! without a config file at all.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Currency all export amounts are denominated in
    pub base_currency: String,
    pub tax: TaxConfig,
    pub projection: ProjectionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_currency: "SEK".to_string(),
            tax: TaxConfig::default(),
            projection: ProjectionConfig::default(),
        }
    }
}

/// Capital gains tax brackets applied to the realized result
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TaxConfig {
    /// Rate applied to a net realized profit
    pub profit_rate: Decimal,
    /// Share of a net realized loss that is deductible
    pub loss_deductible_rate: Decimal,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            profit_rate: dec!(0.30),
            loss_deductible_rate: dec!(0.70),
        }
    }
}

/// Defaults for the ISK-vs-AF growth projection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub capital: Decimal,
    pub monthly_investment: Decimal,
    pub annual_return: Decimal,
    /// Government borrowing rate driving the ISK standard rate
    pub gov_interest_rate: Decimal,
    /// Tax rate on the final AF gain
    pub af_tax_rate: Decimal,
    pub years: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            capital: dec!(10000),
            monthly_investment: dec!(1000),
            annual_return: dec!(0.05),
            gov_interest_rate: dec!(0.0262),
            af_tax_rate: dec!(0.30),
            years: 20,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file; a missing file yields the
    /// defaults.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
