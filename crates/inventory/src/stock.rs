use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockwatch_core::{DomainError, Entity, InventoryId, ProductId, WarehouseId};

/// Whether stock rows may hold negative quantities (backorders).
///
/// The business has not settled this; the default keeps the permissive
/// behaviour and the stricter variant is opt-in through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativeStockPolicy {
    #[default]
    Allow,
    Reject,
}

impl NegativeStockPolicy {
    pub fn check(self, quantity: i64) -> Result<(), DomainError> {
        match self {
            NegativeStockPolicy::Reject if quantity < 0 => Err(DomainError::validation(
                "quantity cannot be negative",
            )),
            _ => Ok(()),
        }
    }
}

impl core::str::FromStr for NegativeStockPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "reject" => Ok(Self::Reject),
            other => Err(DomainError::validation(format!(
                "unknown negative stock policy '{other}' (expected allow or reject)"
            ))),
        }
    }
}

/// Stock of one product in one warehouse.
///
/// Tenant ownership is transitive through the product: a row is visible to a
/// company only if its product belongs to that company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub id: InventoryId,
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub quantity: i64,
    pub updated_at: DateTime<Utc>,
}

impl Inventory {
    /// First stock row for a freshly provisioned product.
    pub fn initial(
        product_id: ProductId,
        warehouse_id: WarehouseId,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InventoryId::new(),
            product_id,
            warehouse_id,
            quantity,
            updated_at: now,
        }
    }

    /// Strictly below `threshold`. Equal to the threshold is *not* low.
    pub fn is_below(&self, threshold: i64) -> bool {
        self.quantity < threshold
    }
}

impl Entity for Inventory {
    type Id = InventoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
