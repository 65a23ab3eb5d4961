//! Provisioning request validation.
//!
//! A `ProvisionProduct` carries the raw request (everything optional, so that
//! "missing" is distinguishable from "malformed"). `validate` is the only way to
//! obtain a `ValidatedProvision`, which is what the store is allowed to write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockwatch_core::{CompanyId, DomainError, Price, ProductId, SupplierId, WarehouseId};
use stockwatch_inventory::{Inventory, NegativeStockPolicy};

use crate::product::Product;

/// Defaults and policies applied while validating a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionDefaults {
    pub low_stock_threshold: i64,
    pub negative_stock: NegativeStockPolicy,
}

impl Default for ProvisionDefaults {
    fn default() -> Self {
        Self {
            low_stock_threshold: 10,
            negative_stock: NegativeStockPolicy::Allow,
        }
    }
}

/// Command: create a product together with its first stock row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionProduct {
    pub company_id: CompanyId,
    pub name: Option<String>,
    pub sku: Option<String>,
    /// Decimal text, e.g. `"19.99"`. Never a float.
    pub price: Option<String>,
    pub warehouse_id: Option<WarehouseId>,
    pub initial_quantity: Option<i64>,
    pub is_bundle: Option<bool>,
    pub low_stock_threshold: Option<i64>,
    pub primary_supplier_id: Option<SupplierId>,
    pub occurred_at: DateTime<Utc>,
}

/// A request that passed every write-independent precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProvision {
    pub product: Product,
    pub inventory: Inventory,
}

impl ValidatedProvision {
    pub fn warehouse_id(&self) -> WarehouseId {
        self.inventory.warehouse_id
    }
}

impl ProvisionProduct {
    /// Check required fields and formats, apply defaults, and mint ids.
    ///
    /// Store-dependent rules (SKU uniqueness, warehouse ownership, supplier
    /// existence) are checked by the caller against the store.
    pub fn validate(&self, defaults: ProvisionDefaults) -> Result<ValidatedProvision, DomainError> {
        let name = required_text(self.name.as_deref(), "name")?;
        let sku = required_text(self.sku.as_deref(), "sku")?;
        let price: Price = required_text(self.price.as_deref(), "price")?.parse()?;
        let warehouse_id = self.warehouse_id.ok_or_else(|| DomainError::missing("warehouse_id"))?;

        let initial_quantity = self.initial_quantity.unwrap_or(0);
        defaults
            .negative_stock
            .check(initial_quantity)
            .map_err(|_| DomainError::validation("initial_quantity cannot be negative"))?;

        let low_stock_threshold = self.low_stock_threshold.unwrap_or(defaults.low_stock_threshold);
        if low_stock_threshold < 0 {
            return Err(DomainError::validation("low_stock_threshold cannot be negative"));
        }

        let product = Product {
            id: ProductId::new(),
            company_id: self.company_id,
            name,
            sku,
            price,
            is_bundle: self.is_bundle.unwrap_or(false),
            low_stock_threshold,
            primary_supplier_id: self.primary_supplier_id,
        };
        let inventory = Inventory::initial(product.id, warehouse_id, initial_quantity, self.occurred_at);

        Ok(ValidatedProvision { product, inventory })
    }
}

fn required_text(value: Option<&str>, field: &str) -> Result<String, DomainError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(DomainError::missing(field)),
    }
}
