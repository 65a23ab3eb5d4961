//! Read ports consumed by the evaluator.
//!
//! Stock and warehouse reads take the company explicitly and implementations
//! must scope them to it. Products and suppliers are looked up by id; the
//! evaluator checks product ownership itself. Nothing here carries ambient
//! tenant state.

use async_trait::async_trait;
use std::sync::Arc;

use stockwatch_core::{CompanyId, ProductId, SupplierId, WarehouseId};
use stockwatch_inventory::{Inventory, Warehouse};
use stockwatch_parties::Supplier;
use stockwatch_products::Product;
use stockwatch_sales::SalesWindow;

/// Opaque failure reported by a port implementation.
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Tenant-scoped catalog and stock lookups.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// All stock rows whose product belongs to `company_id`, in storage order.
    async fn find_inventory_by_company(&self, company_id: CompanyId) -> Result<Vec<Inventory>, SourceError>;

    /// Looked up by id alone so that a stock row pointing at another
    /// company's product can be told apart from one pointing at nothing.
    async fn find_product(&self, product_id: ProductId) -> Result<Option<Product>, SourceError>;

    /// `None` when the warehouse does not exist *or* belongs to another company.
    async fn find_warehouse(
        &self,
        company_id: CompanyId,
        warehouse_id: WarehouseId,
    ) -> Result<Option<Warehouse>, SourceError>;

    async fn find_supplier(&self, supplier_id: SupplierId) -> Result<Option<Supplier>, SourceError>;
}

/// "Has this product sold within the trailing window?"
///
/// A pure predicate: implementations must not record or mutate anything.
#[async_trait]
pub trait SalesRecency: Send + Sync {
    async fn has_recent_sales(
        &self,
        company_id: CompanyId,
        product_id: ProductId,
        window: SalesWindow,
    ) -> Result<bool, SourceError>;
}

/// Days until the product runs out; `None` when no estimate can be made.
#[async_trait]
pub trait StockoutEstimator: Send + Sync {
    async fn estimated_days_until_stockout(
        &self,
        company_id: CompanyId,
        product_id: ProductId,
    ) -> Result<Option<u32>, SourceError>;
}

#[async_trait]
impl<S> CatalogReader for Arc<S>
where
    S: CatalogReader + ?Sized,
{
    async fn find_inventory_by_company(&self, company_id: CompanyId) -> Result<Vec<Inventory>, SourceError> {
        (**self).find_inventory_by_company(company_id).await
    }

    async fn find_product(&self, product_id: ProductId) -> Result<Option<Product>, SourceError> {
        (**self).find_product(product_id).await
    }

    async fn find_warehouse(
        &self,
        company_id: CompanyId,
        warehouse_id: WarehouseId,
    ) -> Result<Option<Warehouse>, SourceError> {
        (**self).find_warehouse(company_id, warehouse_id).await
    }

    async fn find_supplier(&self, supplier_id: SupplierId) -> Result<Option<Supplier>, SourceError> {
        (**self).find_supplier(supplier_id).await
    }
}

#[async_trait]
impl<S> SalesRecency for Arc<S>
where
    S: SalesRecency + ?Sized,
{
    async fn has_recent_sales(
        &self,
        company_id: CompanyId,
        product_id: ProductId,
        window: SalesWindow,
    ) -> Result<bool, SourceError> {
        (**self).has_recent_sales(company_id, product_id, window).await
    }
}

#[async_trait]
impl<S> StockoutEstimator for Arc<S>
where
    S: StockoutEstimator + ?Sized,
{
    async fn estimated_days_until_stockout(
        &self,
        company_id: CompanyId,
        product_id: ProductId,
    ) -> Result<Option<u32>, SourceError> {
        (**self).estimated_days_until_stockout(company_id, product_id).await
    }
}
