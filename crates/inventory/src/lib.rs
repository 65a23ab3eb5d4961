//! Inventory domain module: warehouses and per-warehouse stock rows.
//!
//! Pure domain logic (no IO, no HTTP, no storage). Stock movements beyond the
//! initial row are owned by other services; this crate only models the state
//! that provisioning writes and the alert evaluator reads.

pub mod stock;
pub mod warehouse;

pub use stock::{Inventory, NegativeStockPolicy};
pub use warehouse::Warehouse;
