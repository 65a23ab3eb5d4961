use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

use stockwatch_alerts::CatalogReader;
use stockwatch_core::{CompanyId, ProductId};
use stockwatch_inventory::{Inventory, Warehouse};
use stockwatch_parties::{Company, Supplier};
use stockwatch_products::Product;
use stockwatch_sales::SalesRecord;

/// Storage operation error.
///
/// These are **infrastructure errors** (constraints, connectivity) as opposed to
/// domain errors (validation). Callers must not leak the message to end users.
///
/// ## Error Categories
///
/// - **UniqueViolation**: a uniqueness constraint rejected the write
/// - **ForeignKey**: a write referenced a row that does not exist (or belongs to
///   another company)
/// - **InvalidWrite**: the write itself was malformed (e.g. unlinked rows)
/// - **Backend**: connectivity, pool, decoding, or any other storage failure
/// - **Injected**: a test-armed fault fired
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key violated: {0}")]
    ForeignKey(String),

    #[error("invalid write: {0}")]
    InvalidWrite(String),

    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("injected fault: {0}")]
    Injected(&'static str),
}

/// Tenant-scoped write side of the catalog.
///
/// Read lookups come from [`CatalogReader`]; this trait adds the uniqueness
/// checks and writes provisioning and seeding need.
///
/// ## Atomicity
///
/// `save_product_and_inventory` persists both rows or neither. A reader must
/// never observe the product without its first stock row, and a failure at any
/// point inside the write leaves the store exactly as it was.
///
/// ## Uniqueness
///
/// Implementations enforce `(company_id, sku)` uniqueness themselves, so a race
/// between `exists_by_sku` and the insert still cannot produce duplicates.
#[async_trait]
pub trait CatalogStore: CatalogReader {
    async fn exists_by_sku(&self, company_id: CompanyId, sku: &str) -> Result<bool, StoreError>;

    /// Existence check across every company (for global SKU scoping).
    async fn exists_by_sku_globally(&self, sku: &str) -> Result<bool, StoreError>;

    /// Atomically insert a product and its first stock row; returns the product id.
    async fn save_product_and_inventory(
        &self,
        product: Product,
        inventory: Inventory,
    ) -> Result<ProductId, StoreError>;

    async fn insert_company(&self, company: Company) -> Result<(), StoreError>;

    async fn find_company(&self, company_id: CompanyId) -> Result<Option<Company>, StoreError>;

    async fn insert_warehouse(&self, warehouse: Warehouse) -> Result<(), StoreError>;

    async fn insert_supplier(&self, supplier: Supplier) -> Result<(), StoreError>;
}

/// Read/write access to sales history.
#[async_trait]
pub trait SalesLedger: Send + Sync {
    async fn record_sale(&self, sale: SalesRecord) -> Result<(), StoreError>;

    async fn has_sales_since(
        &self,
        company_id: CompanyId,
        product_id: ProductId,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Total units sold since `since` (inclusive).
    async fn units_sold_since(
        &self,
        company_id: CompanyId,
        product_id: ProductId,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    /// Sum of non-negative stock across all warehouses of the product.
    async fn on_hand(&self, company_id: CompanyId, product_id: ProductId) -> Result<i64, StoreError>;
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn exists_by_sku(&self, company_id: CompanyId, sku: &str) -> Result<bool, StoreError> {
        (**self).exists_by_sku(company_id, sku).await
    }

    async fn exists_by_sku_globally(&self, sku: &str) -> Result<bool, StoreError> {
        (**self).exists_by_sku_globally(sku).await
    }

    async fn save_product_and_inventory(
        &self,
        product: Product,
        inventory: Inventory,
    ) -> Result<ProductId, StoreError> {
        (**self).save_product_and_inventory(product, inventory).await
    }

    async fn insert_company(&self, company: Company) -> Result<(), StoreError> {
        (**self).insert_company(company).await
    }

    async fn find_company(&self, company_id: CompanyId) -> Result<Option<Company>, StoreError> {
        (**self).find_company(company_id).await
    }

    async fn insert_warehouse(&self, warehouse: Warehouse) -> Result<(), StoreError> {
        (**self).insert_warehouse(warehouse).await
    }

    async fn insert_supplier(&self, supplier: Supplier) -> Result<(), StoreError> {
        (**self).insert_supplier(supplier).await
    }
}

#[async_trait]
impl<S> SalesLedger for Arc<S>
where
    S: SalesLedger + ?Sized,
{
    async fn record_sale(&self, sale: SalesRecord) -> Result<(), StoreError> {
        (**self).record_sale(sale).await
    }

    async fn has_sales_since(
        &self,
        company_id: CompanyId,
        product_id: ProductId,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        (**self).has_sales_since(company_id, product_id, since).await
    }

    async fn units_sold_since(
        &self,
        company_id: CompanyId,
        product_id: ProductId,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        (**self).units_sold_since(company_id, product_id, since).await
    }

    async fn on_hand(&self, company_id: CompanyId, product_id: ProductId) -> Result<i64, StoreError> {
        (**self).on_hand(company_id, product_id).await
    }
}
