use serde::Serialize;
use thiserror::Error;

use stockwatch_core::{InventoryId, ProductId, WarehouseId};
use stockwatch_parties::SupplierContact;

use crate::source::SourceError;

/// One (product, warehouse) pair whose stock is below the product's threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowStockAlert {
    pub product_id: ProductId,
    pub product_name: String,
    pub sku: String,
    pub warehouse_id: WarehouseId,
    pub warehouse_name: String,
    pub current_stock: i64,
    pub threshold: i64,
    /// Forwarded from the stockout estimator; `null` when it has no estimate.
    pub days_until_stockout: Option<u32>,
    /// `null` when the product has no primary supplier. Never suppresses the alert.
    pub supplier: Option<SupplierContact>,
}

/// Evaluation output: the alerts and their count.
///
/// Only constructible from the alert list, so `total_alerts` always equals
/// `alerts.len()`. Alert order is the source scan order and is not sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowStockReport {
    alerts: Vec<LowStockAlert>,
    total_alerts: usize,
}

impl LowStockReport {
    pub fn new(alerts: Vec<LowStockAlert>) -> Self {
        let total_alerts = alerts.len();
        Self { alerts, total_alerts }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn alerts(&self) -> &[LowStockAlert] {
        &self.alerts
    }

    pub fn total_alerts(&self) -> usize {
        self.total_alerts
    }
}

#[derive(Debug, Error)]
pub enum AlertError {
    /// A port failed; the evaluation is abandoned rather than returned partially.
    #[error("{operation} failed")]
    Source {
        operation: &'static str,
        #[source]
        source: SourceError,
    },

    /// A stock row points at a product or warehouse the store cannot resolve.
    #[error("inventory row {inventory_id} references missing {entity}")]
    DanglingReference {
        inventory_id: InventoryId,
        entity: &'static str,
    },
}

impl AlertError {
    pub(crate) fn port(operation: &'static str) -> impl FnOnce(SourceError) -> Self {
        move |source| Self::Source { operation, source }
    }
}
