//! Engine configuration.
//!
//! Loaded from environment variables with fallback to defaults.
//!
//! | Variable                      | Default        |
//! |-------------------------------|----------------|
//! | `BOOKING_DATABASE_PATH`       | `bookings.db`  |
//! | `BOOKING_DB_MAX_CONNECTIONS`  | `5`            |
//! | `BOOKING_DB_BUSY_TIMEOUT_MS`  | `5000`         |
//! | `BOOKING_BULK_DISCOUNT_BPS`   | `3333`         |
//! | `BOOKING_BULK_ROUNDING`       | `down`         |

use std::env;
use std::time::Duration;

use booking_core::{PricingPolicy, Rate, RoundingMode, DEFAULT_BULK_DISCOUNT_BPS};

use crate::pool::DbConfig;

pub const DATABASE_PATH_VAR: &str = "BOOKING_DATABASE_PATH";
pub const MAX_CONNECTIONS_VAR: &str = "BOOKING_DB_MAX_CONNECTIONS";
pub const BUSY_TIMEOUT_VAR: &str = "BOOKING_DB_BUSY_TIMEOUT_MS";
pub const BULK_DISCOUNT_VAR: &str = "BOOKING_BULK_DISCOUNT_BPS";
pub const BULK_ROUNDING_VAR: &str = "BOOKING_BULK_ROUNDING";

const DEFAULT_DATABASE_PATH: &str = "bookings.db";

/// Everything needed to open a [`Database`](crate::Database) and build its engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub db: DbConfig,
    pub policy: PricingPolicy,
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let path = lookup(DATABASE_PATH_VAR).unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());
        let defaults = DbConfig::new(path);

        let max_connections: u32 = parse_or(&lookup, MAX_CONNECTIONS_VAR, defaults.max_connections)?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue(MAX_CONNECTIONS_VAR.to_string()));
        }

        let busy_timeout_ms: u64 = parse_or(&lookup, BUSY_TIMEOUT_VAR, defaults.busy_timeout.as_millis() as u64)?;

        let bulk_bps: u32 = parse_or(&lookup, BULK_DISCOUNT_VAR, DEFAULT_BULK_DISCOUNT_BPS)?;
        if bulk_bps > 10_000 {
            return Err(ConfigError::InvalidValue(BULK_DISCOUNT_VAR.to_string()));
        }

        let defaults_policy = PricingPolicy::default();
        let bulk_rounding = match lookup(BULK_ROUNDING_VAR) {
            Some(raw) => parse_rounding(&raw)?,
            None => defaults_policy.bulk_rounding,
        };

        Ok(EngineConfig {
            db: defaults
                .max_connections(max_connections)
                .busy_timeout(Duration::from_millis(busy_timeout_ms)),
            policy: defaults_policy
                .bulk_discount_rate(Rate::from_bps(bulk_bps))
                .bulk_rounding(bulk_rounding),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

fn parse_rounding(raw: &str) -> Result<RoundingMode, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "down" => Ok(RoundingMode::Down),
        "half_up" => Ok(RoundingMode::HalfUp),
        _ => Err(ConfigError::InvalidValue(BULK_ROUNDING_VAR.to_string())),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<EngineConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.db.database_path.to_str(), Some("bookings.db"));
        assert_eq!(config.db.max_connections, 5);
        assert_eq!(config.db.busy_timeout, Duration::from_secs(5));
        assert_eq!(config.policy, PricingPolicy::default());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            (DATABASE_PATH_VAR, "/var/lib/bookings/live.db"),
            (MAX_CONNECTIONS_VAR, "12"),
            (BUSY_TIMEOUT_VAR, "750"),
            (BULK_DISCOUNT_VAR, "2500"),
            (BULK_ROUNDING_VAR, "HALF_UP"),
        ])
        .unwrap();

        assert_eq!(config.db.max_connections, 12);
        assert_eq!(config.db.busy_timeout, Duration::from_millis(750));
        assert_eq!(config.policy.bulk_discount_rate, Rate::from_bps(2500));
        assert_eq!(config.policy.bulk_rounding, RoundingMode::HalfUp);
        assert_eq!(config.policy.coupon_rounding, RoundingMode::HalfUp);
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = load(&[(MAX_CONNECTIONS_VAR, "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == MAX_CONNECTIONS_VAR));

        let err = load(&[(MAX_CONNECTIONS_VAR, "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == MAX_CONNECTIONS_VAR));

        let err = load(&[(BULK_DISCOUNT_VAR, "10001")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == BULK_DISCOUNT_VAR));

        let err = load(&[(BULK_ROUNDING_VAR, "banker")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for BOOKING_BULK_ROUNDING");
    }
}
