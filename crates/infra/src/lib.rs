//! Infrastructure layer: storage, provisioning orchestration, config.

pub mod config;
pub mod provisioning;
pub mod sales;
pub mod store;

pub use config::{AppConfig, ConfigError, DatabaseConfig};
pub use provisioning::{ProductProvisioner, ProvisionError, ProvisionedProduct};
pub use sales::SalesOracle;
pub use store::{CatalogStore, FaultPoint, InMemoryStore, SalesLedger, StoreError};
