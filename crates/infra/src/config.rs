//! Configuration loading and representation.
//!
//! Everything comes from environment variables; unset variables fall back to
//! defaults, malformed ones are a start-up error.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use stockwatch_inventory::NegativeStockPolicy;
use stockwatch_products::{ProvisionDefaults, SkuScope};
use stockwatch_sales::SalesWindow;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("{0} must be set when USE_PERSISTENT_STORES is enabled")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// `Some` when persistent stores are enabled.
    pub database: Option<DatabaseConfig>,
    pub sales_window: SalesWindow,
    pub provision_defaults: ProvisionDefaults,
    pub sku_scope: SkuScope,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database: None,
            sales_window: SalesWindow::default(),
            provision_defaults: ProvisionDefaults::default(),
            sku_scope: SkuScope::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &'static str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = AppConfig::default();

        let bind_addr = parse_or(var("BIND_ADDR"), "BIND_ADDR", defaults.bind_addr)?;

        let persistent = matches!(
            var("USE_PERSISTENT_STORES").as_deref(),
            Some("1") | Some("true") | Some("TRUE") | Some("yes")
        );
        let database = if persistent {
            let url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let max_connections = parse_or(var("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 10u32)?;
            let timeout_secs = parse_or(var("DB_ACQUIRE_TIMEOUT_SECS"), "DB_ACQUIRE_TIMEOUT_SECS", 5u64)?;
            Some(DatabaseConfig {
                url,
                max_connections,
                acquire_timeout: Duration::from_secs(timeout_secs),
            })
        } else {
            None
        };

        let window_days = parse_or(var("SALES_WINDOW_DAYS"), "SALES_WINDOW_DAYS", SalesWindow::DEFAULT_DAYS)?;
        let sales_window = SalesWindow::days(window_days).map_err(|e| invalid("SALES_WINDOW_DAYS", e))?;

        let low_stock_threshold = parse_or(
            var("DEFAULT_LOW_STOCK_THRESHOLD"),
            "DEFAULT_LOW_STOCK_THRESHOLD",
            defaults.provision_defaults.low_stock_threshold,
        )?;
        if low_stock_threshold < 0 {
            return Err(invalid("DEFAULT_LOW_STOCK_THRESHOLD", "must not be negative"));
        }

        let negative_stock: NegativeStockPolicy =
            parse_or(var("NEGATIVE_STOCK_POLICY"), "NEGATIVE_STOCK_POLICY", NegativeStockPolicy::default())?;
        let sku_scope: SkuScope = parse_or(var("SKU_SCOPE"), "SKU_SCOPE", SkuScope::default())?;

        Ok(Self {
            bind_addr,
            database,
            sales_window,
            provision_defaults: ProvisionDefaults {
                low_stock_threshold,
                negative_stock,
            },
            sku_scope,
        })
    }
}

fn invalid(var: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.to_string(),
    }
}

fn parse_or<T>(value: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v.parse().map_err(|e| invalid(var, e)),
        None => Ok(default),
    }
}
