//! Application configuration module
//! Handles environment variable loading and validation for the routing
//! and FX settings.

use crate::psp::types::PspCode;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub routing: RoutingConfig,
    pub fx: FxConfig,
}

#[derive(Debug, Clone)]
pub struct RoutingConfig {
    pub default_psp: PspCode,
    pub provider_call_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct FxConfig {
    pub enabled: bool,
    pub payout_currency: String,
    pub markup_pct: Decimal,
    pub jitter_bps: u32,
    pub base_rates: HashMap<String, Decimal>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(AppConfig {
            routing: RoutingConfig::from_env()?,
            fx: FxConfig::from_env()?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.routing.validate()?;
        self.fx.validate()?;
        Ok(())
    }
}

impl RoutingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let default_psp = env::var("DEFAULT_PSP").unwrap_or_else(|_| "stripe".to_string());
        let default_psp = PspCode::from_str(&default_psp)
            .map_err(|_| ConfigError::InvalidValue(format!("DEFAULT_PSP={default_psp}")))?;

        Ok(RoutingConfig {
            default_psp,
            provider_call_timeout_secs: env::var("PROVIDER_CALL_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("PROVIDER_CALL_TIMEOUT_SECS".to_string())
                })?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider_call_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "PROVIDER_CALL_TIMEOUT_SECS cannot be 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl FxConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_rates_raw =
            env::var("FX_BASE_RATES").unwrap_or_else(|_| "USD/MXN=17.20".to_string());

        Ok(FxConfig {
            enabled: env::var("FX_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                == "true",
            payout_currency: env::var("FX_PAYOUT_CURRENCY")
                .unwrap_or_else(|_| "MXN".to_string())
                .to_uppercase(),
            markup_pct: env::var("FX_MARKUP_PCT")
                .unwrap_or_else(|_| "0.00".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("FX_MARKUP_PCT".to_string()))?,
            jitter_bps: env::var("FX_JITTER_BPS")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("FX_JITTER_BPS".to_string()))?,
            base_rates: parse_base_rates(&base_rates_raw)?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.payout_currency.is_empty() {
            return Err(ConfigError::InvalidValue(
                "FX_PAYOUT_CURRENCY cannot be empty".to_string(),
            ));
        }
        if self.enabled && self.base_rates.is_empty() {
            return Err(ConfigError::InvalidValue(
                "FX_BASE_RATES cannot be empty when FX_ENABLED=true".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parses `"USD/MXN=17.20,EUR/MXN=18.90"` into the base-rate table.
fn parse_base_rates(raw: &str) -> Result<HashMap<String, Decimal>, ConfigError> {
    let mut rates = HashMap::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let (pair, rate) = entry
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidValue(format!("FX_BASE_RATES entry: {entry}")))?;
        let rate = Decimal::from_str(rate.trim())
            .map_err(|_| ConfigError::InvalidValue(format!("FX_BASE_RATES entry: {entry}")))?;
        rates.insert(pair.trim().to_uppercase(), rate);
    }
    Ok(rates)
}
