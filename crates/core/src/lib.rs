//! `stockwatch-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by every other crate:
//! strongly-typed identifiers, the domain error model, and the `Price` value
//! object. No IO, no storage, no HTTP.

pub mod entity;
pub mod error;
pub mod id;
pub mod price;
pub mod value_object;

pub use entity::{Entity, TenantOwned};
pub use error::DomainError;
pub use id::{CompanyId, InventoryId, ProductId, SaleId, SupplierId, WarehouseId};
pub use price::Price;
pub use value_object::ValueObject;
