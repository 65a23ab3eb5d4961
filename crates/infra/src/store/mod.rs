//! Catalog, stock and sales storage boundary.
//!
//! The in-memory store backs dev and tests; the Postgres store is behind the
//! `postgres` feature.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod r#trait;

pub use in_memory::{FaultPoint, InMemoryStore};
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;
pub use r#trait::{CatalogStore, SalesLedger, StoreError};
