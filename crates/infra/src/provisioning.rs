//! Product provisioning (application-level orchestration).
//!
//! ```text
//! ProvisionProduct
//!   ↓
//! 1. Validate fields, apply defaults, mint ids (pure, products crate)
//!   ↓
//! 2. Check the warehouse belongs to the company
//!   ↓
//! 3. Check the primary supplier exists (when given)
//!   ↓
//! 4. Check SKU uniqueness within the configured scope
//!   ↓
//! 5. Atomically write product + first stock row
//! ```
//!
//! Steps 1-4 never write. Only step 5 touches storage, and the store
//! guarantees it writes both rows or neither.

use thiserror::Error;
use tracing::{error, info, instrument, warn};

use stockwatch_alerts::SourceError;
use stockwatch_core::{DomainError, InventoryId, ProductId};
use stockwatch_products::{ProvisionDefaults, ProvisionProduct, SkuScope, ValidatedProvision};

use crate::store::CatalogStore;

/// Outcome classes of a failed provisioning request.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The caller can fix the request.
    #[error("{0}")]
    Validation(String),

    /// A product with this SKU already exists.
    #[error("{0}")]
    Conflict(String),

    /// Anything unexpected. The display text is deliberately opaque; the cause
    /// is kept as the error source for logs.
    #[error("product creation failed")]
    Persistence(#[source] SourceError),
}

impl ProvisionError {
    fn persistence(err: impl Into<SourceError>) -> Self {
        ProvisionError::Persistence(err.into())
    }
}

impl From<DomainError> for ProvisionError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => ProvisionError::Validation(msg),
        }
    }
}

/// Ids of the two rows a successful provisioning created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionedProduct {
    pub product_id: ProductId,
    pub inventory_id: InventoryId,
}

/// Creates products together with their first stock row.
pub struct ProductProvisioner<S> {
    store: S,
    defaults: ProvisionDefaults,
    sku_scope: SkuScope,
}

impl<S> ProductProvisioner<S>
where
    S: CatalogStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            defaults: ProvisionDefaults::default(),
            sku_scope: SkuScope::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: ProvisionDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_sku_scope(mut self, sku_scope: SkuScope) -> Self {
        self.sku_scope = sku_scope;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[instrument(
        skip(self, request),
        fields(company_id = %request.company_id, sku = request.sku.as_deref().unwrap_or(""))
    )]
    pub async fn provision(&self, request: ProvisionProduct) -> Result<ProvisionedProduct, ProvisionError> {
        let validated = request.validate(self.defaults)?;
        self.check_references(&validated).await?;
        self.check_sku_free(&validated).await?;

        let inventory_id = validated.inventory.id;
        let ValidatedProvision { product, inventory } = validated;
        let sku = product.sku.clone();

        let product_id = self
            .store
            .save_product_and_inventory(product, inventory)
            .await
            .map_err(|e| {
                error!(error = %e, sku = %sku, "product provisioning write failed; rolled back");
                ProvisionError::persistence(e)
            })?;

        info!(product_id = %product_id, inventory_id = %inventory_id, "product provisioned");
        Ok(ProvisionedProduct { product_id, inventory_id })
    }

    async fn check_references(&self, validated: &ValidatedProvision) -> Result<(), ProvisionError> {
        let company_id = validated.product.company_id;
        let warehouse_id = validated.warehouse_id();

        let warehouse = self
            .store
            .find_warehouse(company_id, warehouse_id)
            .await
            .map_err(ProvisionError::Persistence)?;
        if warehouse.is_none() {
            warn!(warehouse_id = %warehouse_id, "warehouse not found for company");
            return Err(ProvisionError::Validation(format!(
                "warehouse {warehouse_id} does not exist for this company"
            )));
        }

        if let Some(supplier_id) = validated.product.primary_supplier_id {
            let supplier = self
                .store
                .find_supplier(supplier_id)
                .await
                .map_err(ProvisionError::Persistence)?;
            if supplier.is_none() {
                return Err(ProvisionError::Validation(format!(
                    "supplier {supplier_id} does not exist"
                )));
            }
        }
        Ok(())
    }

    async fn check_sku_free(&self, validated: &ValidatedProvision) -> Result<(), ProvisionError> {
        let product = &validated.product;
        let taken = match self.sku_scope {
            SkuScope::Company => self.store.exists_by_sku(product.company_id, &product.sku).await,
            SkuScope::Global => self.store.exists_by_sku_globally(&product.sku).await,
        }
        .map_err(ProvisionError::persistence)?;

        if taken {
            info!(sku = %product.sku, "duplicate sku rejected");
            return Err(ProvisionError::Conflict("SKU already exists".to_string()));
        }
        Ok(())
    }
}
