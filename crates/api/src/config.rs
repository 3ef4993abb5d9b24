//! Application configuration loaded from environment variables.

use std::time::Duration;

use common::WarehouseId;
use fulfillment::{FulfillmentConfig, RetryPolicy};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `FULFILL_MAX_ATTEMPTS` — fulfillment retry budget (default: `5`)
/// - `FULFILL_BASE_DELAY_MS` — first backoff delay (default: `2000`)
/// - `FULFILL_WAREHOUSE` — warehouse stock is allocated from
///   (default: `"wh_primary"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub warehouse: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_attempts: std::env::var("FULFILL_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            base_delay_ms: std::env::var("FULFILL_BASE_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2000),
            warehouse: std::env::var("FULFILL_WAREHOUSE")
                .unwrap_or_else(|_| "wh_primary".to_string()),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the orchestrator configuration from the tuning knobs.
    pub fn fulfillment_config(&self) -> FulfillmentConfig {
        FulfillmentConfig {
            retry: RetryPolicy {
                base_delay: Duration::from_millis(self.base_delay_ms),
                max_attempts: self.max_attempts,
                ..RetryPolicy::default()
            },
            warehouse_id: WarehouseId::new(self.warehouse.as_str()),
            ..FulfillmentConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            max_attempts: 5,
            base_delay_ms: 2000,
            warehouse: "wh_primary".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.base_delay_ms, 2000);
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_fulfillment_config_uses_knobs() {
        let config = Config {
            max_attempts: 3,
            base_delay_ms: 100,
            warehouse: "wh_nairobi".to_string(),
            ..Config::default()
        };
        let fc = config.fulfillment_config();
        assert_eq!(fc.retry.max_attempts, 3);
        assert_eq!(fc.retry.base_delay, Duration::from_millis(100));
        assert_eq!(fc.warehouse_id, WarehouseId::new("wh_nairobi"));
    }
}
