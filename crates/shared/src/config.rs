//! Application configuration management.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::types::MAX_DECIMAL_PRECISION;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger defaults applied to tenants without stored settings.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a connection before giving up.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    8
}

/// Ledger defaults.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LedgerConfig {
    /// Calendar month (1-12) in which a fiscal year starts.
    #[serde(default = "default_start_month")]
    pub default_fiscal_year_start_month: u32,
    /// Fractional digits kept on every amount.
    #[serde(default = "default_precision")]
    pub default_decimal_precision: u32,
}

fn default_start_month() -> u32 {
    1
}

fn default_precision() -> u32 {
    2
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_fiscal_year_start_month: default_start_month(),
            default_decimal_precision: default_precision(),
        }
    }
}

impl LedgerConfig {
    /// Settings used for a tenant that has none stored.
    #[must_use]
    pub const fn tenant_defaults(&self) -> TenantSettings {
        TenantSettings {
            fiscal_year_start_month: self.default_fiscal_year_start_month,
            decimal_precision: self.default_decimal_precision,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "info,sea_orm=warn,sqlx=warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

/// Per-tenant ledger settings. Read by the core, never written by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSettings {
    /// Calendar month (1-12) in which the tenant's fiscal year starts.
    pub fiscal_year_start_month: u32,
    /// Fractional digits kept on every amount.
    pub decimal_precision: u32,
}

impl Default for TenantSettings {
    fn default() -> Self {
        LedgerConfig::default().tenant_defaults()
    }
}

impl TenantSettings {
    /// Checks that the month and precision are in range.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=12).contains(&self.fiscal_year_start_month) {
            return Err(AppError::Config(format!(
                "fiscal year start month must be 1-12, got {}",
                self.fiscal_year_start_month
            )));
        }
        if self.decimal_precision > MAX_DECIMAL_PRECISION {
            return Err(AppError::Config(format!(
                "decimal precision must be at most {MAX_DECIMAL_PRECISION}, got {}",
                self.decimal_precision
            )));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later overriding earlier: `config/default`, `config/{RUN_MODE}`,
    /// `config/local`, then `LEDGERLINE__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or fails validation.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("LEDGERLINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Validates cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a value is out of range.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.min_connections > self.database.max_connections {
            return Err(AppError::Config(
                "database.min_connections exceeds database.max_connections".to_string(),
            ));
        }
        self.ledger.tenant_defaults().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_env() {
        temp_env::with_vars(
            [
                ("LEDGERLINE__DATABASE__URL", Some("postgres://localhost/ledger")),
                ("LEDGERLINE__DATABASE__MAX_CONNECTIONS", Some("4")),
                ("LEDGERLINE__LEDGER__DEFAULT_FISCAL_YEAR_START_MONTH", Some("4")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/ledger");
                assert_eq!(config.database.max_connections, 4);
                assert_eq!(config.database.min_connections, 1);
                assert_eq!(config.ledger.default_fiscal_year_start_month, 4);
                assert_eq!(config.ledger.default_decimal_precision, 2);
                assert!(!config.logging.json);
            },
        );
    }

    #[test]
    fn test_load_rejects_bad_start_month() {
        temp_env::with_vars(
            [
                ("LEDGERLINE__DATABASE__URL", Some("postgres://localhost/ledger")),
                ("LEDGERLINE__LEDGER__DEFAULT_FISCAL_YEAR_START_MONTH", Some("13")),
            ],
            || {
                let err = AppConfig::load().unwrap_err();
                assert!(matches!(err, AppError::Config(_)));
            },
        );
    }

    #[test]
    fn test_tenant_settings_validate() {
        assert!(TenantSettings::default().validate().is_ok());
        let settings = TenantSettings {
            fiscal_year_start_month: 1,
            decimal_precision: 9,
        };
        assert!(settings.validate().is_err());
    }
}
