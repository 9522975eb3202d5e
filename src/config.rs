//! Wizard tunables.

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::Amount;

/// Environment variable overriding the simulated settlement latency, in milliseconds.
pub const SETTLEMENT_MS_VAR: &str = "TOPUP_SETTLEMENT_MS";
/// Environment variable overriding the CERE unit price.
pub const CERE_PRICE_VAR: &str = "TOPUP_CERE_PRICE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WizardConfig {
    /// How long the simulated processor takes to settle a payment.
    pub settlement_latency: Duration,
    /// Price of one CERE in the entered currency.
    pub cere_price: Amount,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            settlement_latency: Duration::from_millis(2000),
            cere_price: Amount::from_scaled(500),
        }
    }
}

impl WizardConfig {
    /// Defaults, overridden by `TOPUP_SETTLEMENT_MS` and `TOPUP_CERE_PRICE` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(SETTLEMENT_MS_VAR) {
            let ms = value.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                var: SETTLEMENT_MS_VAR,
                value: value.clone(),
            })?;
            config.settlement_latency = Duration::from_millis(ms);
        }

        if let Some(value) = lookup(CERE_PRICE_VAR) {
            let price = value
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(|p| Amount::try_from_float(p).ok())
                .filter(Amount::is_positive)
                .ok_or_else(|| ConfigError::Invalid {
                    var: CERE_PRICE_VAR,
                    value: value.clone(),
                })?;
            config.cere_price = price;
        }

        Ok(config)
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.settlement_latency = latency;
        self
    }

    pub fn with_cere_price(mut self, price: Amount) -> Self {
        self.cere_price = price;
        self
    }
}
