//! `stockwatch-alerts`
//!
//! **Responsibility:** the low-stock alert computation.
//!
//! This crate is read-only with respect to the domain:
//! - It never writes inventory, products or sales.
//! - It reaches storage only through the ports in [`source`], which the infra
//!   layer implements (in-memory and Postgres).
//! - Absence of data (no sales, no supplier) is normal control flow; only
//!   source failures are errors, and they abort the whole evaluation.

pub mod low_stock;
pub mod result;
pub mod source;

pub use low_stock::LowStockEvaluator;
pub use result::{AlertError, LowStockAlert, LowStockReport};
pub use source::{CatalogReader, SalesRecency, SourceError, StockoutEstimator};
