//! Parties domain module: companies (tenants) and suppliers.
//!
//! Plain domain records with constructor-level validation (no IO, no storage).

pub mod company;
pub mod supplier;

pub use company::Company;
pub use supplier::{Supplier, SupplierContact};
