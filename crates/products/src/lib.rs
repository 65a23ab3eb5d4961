//! Products domain module.
//!
//! This crate contains the business rules for the product catalog: the
//! `Product` record, SKU uniqueness scoping, and validation of provisioning
//! requests. Everything here is deterministic domain logic (no IO, no HTTP, no
//! storage); the atomic write lives in the infra layer.

pub mod product;
pub mod provision;

pub use product::{Product, SkuScope};
pub use provision::{ProvisionDefaults, ProvisionProduct, ValidatedProvision};
