//! Sales-backed implementations of the evaluator's recency and estimate ports.

use async_trait::async_trait;
use chrono::Utc;

use stockwatch_alerts::{SalesRecency, SourceError, StockoutEstimator};
use stockwatch_core::{CompanyId, ProductId};
use stockwatch_sales::{days_until_stockout, SalesWindow};

use crate::store::SalesLedger;

/// Answers recency and velocity questions from a [`SalesLedger`].
///
/// The estimator uses its own window (the one it was built with); the
/// recency check uses whichever window the evaluator passes in.
pub struct SalesOracle<L> {
    ledger: L,
    window: SalesWindow,
}

impl<L> SalesOracle<L>
where
    L: SalesLedger,
{
    pub fn new(ledger: L, window: SalesWindow) -> Self {
        Self { ledger, window }
    }
}

#[async_trait]
impl<L> SalesRecency for SalesOracle<L>
where
    L: SalesLedger,
{
    async fn has_recent_sales(
        &self,
        company_id: CompanyId,
        product_id: ProductId,
        window: SalesWindow,
    ) -> Result<bool, SourceError> {
        let since = window.start(Utc::now());
        Ok(self.ledger.has_sales_since(company_id, product_id, since).await?)
    }
}

#[async_trait]
impl<L> StockoutEstimator for SalesOracle<L>
where
    L: SalesLedger,
{
    async fn estimated_days_until_stockout(
        &self,
        company_id: CompanyId,
        product_id: ProductId,
    ) -> Result<Option<u32>, SourceError> {
        let since = self.window.start(Utc::now());
        let sold = self.ledger.units_sold_since(company_id, product_id, since).await?;
        let on_hand = self.ledger.on_hand(company_id, product_id).await?;
        Ok(days_until_stockout(on_hand, sold, self.window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    use stockwatch_alerts::{CatalogReader, LowStockEvaluator};
    use stockwatch_core::{Price, SupplierId, WarehouseId};
    use stockwatch_inventory::{Inventory, Warehouse};
    use stockwatch_parties::{Company, Supplier};
    use stockwatch_products::Product;
    use stockwatch_sales::SalesRecord;

    use crate::store::{CatalogStore, InMemoryStore};

    async fn company_with_warehouse(store: &InMemoryStore, name: &str) -> (CompanyId, WarehouseId) {
        let company = CompanyId::new();
        let warehouse = WarehouseId::new();
        store.insert_company(Company::new(company, "Acme").unwrap()).await.unwrap();
        store
            .insert_warehouse(Warehouse::new(warehouse, company, name, None).unwrap())
            .await
            .unwrap();
        (company, warehouse)
    }

    async fn provision(store: &InMemoryStore, company: CompanyId, warehouse: WarehouseId, quantity: i64) -> ProductId {
        let product = Product {
            id: ProductId::new(),
            company_id: company,
            name: "Widget".into(),
            sku: "W-1".into(),
            price: "2.00".parse::<Price>().unwrap(),
            is_bundle: false,
            low_stock_threshold: 10,
            primary_supplier_id: None,
        };
        let id = product.id;
        store
            .save_product_and_inventory(product, Inventory::initial(id, warehouse, quantity, Utc::now()))
            .await
            .unwrap();
        id
    }

    async fn stocked(quantity: i64) -> (Arc<InMemoryStore>, CompanyId, ProductId) {
        let store = Arc::new(InMemoryStore::new());
        let (company, warehouse) = company_with_warehouse(&store, "Main").await;
        let id = provision(&store, company, warehouse, quantity).await;
        (store, company, id)
    }

    async fn sell(store: &InMemoryStore, company: CompanyId, product: ProductId, quantity: i64) {
        let sale = SalesRecord::new(company, product, None, quantity, Utc::now() - Duration::days(1)).unwrap();
        store.record_sale(sale).await.unwrap();
    }

    /// Serves another company's stock rows alongside the requested ones.
    struct LeakyCatalog {
        store: Arc<InMemoryStore>,
        neighbour: CompanyId,
    }

    #[async_trait]
    impl CatalogReader for LeakyCatalog {
        async fn find_inventory_by_company(
            &self,
            company_id: CompanyId,
        ) -> Result<Vec<Inventory>, SourceError> {
            let mut rows = self.store.find_inventory_by_company(self.neighbour).await?;
            rows.extend(self.store.find_inventory_by_company(company_id).await?);
            Ok(rows)
        }

        async fn find_product(&self, product_id: ProductId) -> Result<Option<Product>, SourceError> {
            self.store.find_product(product_id).await
        }

        async fn find_warehouse(
            &self,
            company_id: CompanyId,
            warehouse_id: WarehouseId,
        ) -> Result<Option<Warehouse>, SourceError> {
            self.store.find_warehouse(company_id, warehouse_id).await
        }

        async fn find_supplier(&self, supplier_id: SupplierId) -> Result<Option<Supplier>, SourceError> {
            self.store.find_supplier(supplier_id).await
        }
    }

    #[tokio::test]
    async fn store_backed_evaluation_alerts_only_the_low_warehouse() {
        let store = Arc::new(InMemoryStore::new());
        let (company, north) = company_with_warehouse(&store, "North").await;
        let south = WarehouseId::new();
        store
            .insert_warehouse(Warehouse::new(south, company, "South", None).unwrap())
            .await
            .unwrap();
        let product = provision(&store, company, north, 5).await;
        store
            .insert_inventory(Inventory::initial(product, south, 15, Utc::now()))
            .unwrap();
        sell(&store, company, product, 3).await;

        let oracle = Arc::new(SalesOracle::new(store.clone(), SalesWindow::default()));
        let report = LowStockEvaluator::new(store.clone(), oracle.clone(), oracle)
            .evaluate(company)
            .await
            .unwrap();

        assert_eq!(report.total_alerts(), 1);
        let alert = &report.alerts()[0];
        assert_eq!(alert.warehouse_id, north);
        assert_eq!(alert.warehouse_name, "North");
        assert_eq!(alert.current_stock, 5);
        // 3 sold over 30 days; 20 on hand across both warehouses lasts 200 days.
        assert_eq!(alert.days_until_stockout, Some(200));
    }

    #[tokio::test]
    async fn duplicate_stock_row_is_rejected() {
        let (store, company, product) = stocked(5).await;
        let rows = store.find_inventory_by_company(company).await.unwrap();
        let err = store
            .insert_inventory(Inventory::initial(product, rows[0].warehouse_id, 1, Utc::now()))
            .unwrap_err();
        assert!(matches!(err, crate::store::StoreError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn foreign_rows_from_the_catalog_are_skipped_not_fatal() {
        let store = Arc::new(InMemoryStore::new());
        let (ours, our_warehouse) = company_with_warehouse(&store, "Ours").await;
        let (theirs, their_warehouse) = company_with_warehouse(&store, "Theirs").await;
        let our_product = provision(&store, ours, our_warehouse, 2).await;
        let their_product = provision(&store, theirs, their_warehouse, 1).await;
        sell(&store, ours, our_product, 1).await;
        sell(&store, theirs, their_product, 1).await;

        let catalog = LeakyCatalog {
            store: store.clone(),
            neighbour: theirs,
        };
        let oracle = Arc::new(SalesOracle::new(store.clone(), SalesWindow::default()));
        let report = LowStockEvaluator::new(catalog, oracle.clone(), oracle)
            .evaluate(ours)
            .await
            .unwrap();

        assert_eq!(report.total_alerts(), 1);
        assert_eq!(report.alerts()[0].product_id, our_product);
    }

    #[tokio::test]
    async fn no_sales_means_not_recent_and_no_estimate() {
        let (store, company, product) = stocked(5).await;
        let oracle = SalesOracle::new(store, SalesWindow::default());

        assert!(!oracle.has_recent_sales(company, product, SalesWindow::default()).await.unwrap());
        assert_eq!(oracle.estimated_days_until_stockout(company, product).await.unwrap(), None);
    }

    #[tokio::test]
    async fn estimate_uses_window_velocity() {
        let (store, company, product) = stocked(6).await;
        let sale = SalesRecord::new(company, product, None, 30, Utc::now() - Duration::days(2)).unwrap();
        store.record_sale(sale).await.unwrap();
        let oracle = SalesOracle::new(store, SalesWindow::days(30).unwrap());

        // 30 units over 30 days = 1/day; 6 on hand lasts 6 days.
        assert!(oracle.has_recent_sales(company, product, SalesWindow::default()).await.unwrap());
        assert_eq!(oracle.estimated_days_until_stockout(company, product).await.unwrap(), Some(6));
    }

    #[tokio::test]
    async fn sales_outside_the_window_are_not_recent() {
        let (store, company, product) = stocked(6).await;
        let sale = SalesRecord::new(company, product, None, 4, Utc::now() - Duration::days(40)).unwrap();
        store.record_sale(sale).await.unwrap();
        let oracle = SalesOracle::new(store, SalesWindow::default());

        assert!(!oracle.has_recent_sales(company, product, SalesWindow::default()).await.unwrap());
        assert!(oracle.has_recent_sales(company, product, SalesWindow::days(60).unwrap()).await.unwrap());
    }
}
