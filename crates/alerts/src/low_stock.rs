use std::collections::HashMap;

use tracing::{debug, info, warn};

use stockwatch_core::{CompanyId, ProductId, TenantOwned};
use stockwatch_inventory::Inventory;
use stockwatch_products::Product;
use stockwatch_sales::SalesWindow;

use crate::result::{AlertError, LowStockAlert, LowStockReport};
use crate::source::{CatalogReader, SalesRecency, StockoutEstimator};

/// Low-stock alert evaluator.
///
/// For every stock row of a company:
/// 1. resolve the owning product (rows of other companies are dropped);
/// 2. skip products without sales in the trailing window;
/// 3. skip rows whose quantity is not strictly below the product threshold;
/// 4. enrich with warehouse, supplier and the stockout estimate.
///
/// One alert per qualifying (product, warehouse) pair, in scan order.
#[derive(Debug, Clone)]
pub struct LowStockEvaluator<C, R, E> {
    catalog: C,
    sales: R,
    estimator: E,
    window: SalesWindow,
}

impl<C, R, E> LowStockEvaluator<C, R, E>
where
    C: CatalogReader,
    R: SalesRecency,
    E: StockoutEstimator,
{
    pub fn new(catalog: C, sales: R, estimator: E) -> Self {
        Self {
            catalog,
            sales,
            estimator,
            window: SalesWindow::default(),
        }
    }

    pub fn with_window(mut self, window: SalesWindow) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> SalesWindow {
        self.window
    }

    pub async fn evaluate(&self, company_id: CompanyId) -> Result<LowStockReport, AlertError> {
        let rows = self
            .catalog
            .find_inventory_by_company(company_id)
            .await
            .map_err(AlertError::port("find_inventory_by_company"))?;

        let scanned = rows.len();
        let mut products: HashMap<ProductId, Product> = HashMap::new();
        let mut recent: HashMap<ProductId, bool> = HashMap::new();
        let mut alerts = Vec::new();

        for row in rows {
            let product = match products.get(&row.product_id) {
                Some(p) => p.clone(),
                None => {
                    let p = self
                        .catalog
                        .find_product(row.product_id)
                        .await
                        .map_err(AlertError::port("find_product"))?
                        .ok_or(AlertError::DanglingReference {
                            inventory_id: row.id,
                            entity: "product",
                        })?;
                    products.insert(row.product_id, p.clone());
                    p
                }
            };

            if !product.belongs_to(company_id) {
                warn!(
                    company_id = %company_id,
                    inventory_id = %row.id,
                    "dropping stock row owned by another company"
                );
                continue;
            }

            let has_sales = match recent.get(&product.id) {
                Some(v) => *v,
                None => {
                    let v = self
                        .sales
                        .has_recent_sales(company_id, product.id, self.window)
                        .await
                        .map_err(AlertError::port("has_recent_sales"))?;
                    recent.insert(product.id, v);
                    v
                }
            };
            if !has_sales {
                debug!(product_id = %product.id, "no recent sales; skipping");
                continue;
            }

            if !row.is_below(product.low_stock_threshold) {
                continue;
            }

            alerts.push(self.enrich(company_id, &row, &product).await?);
        }

        let report = LowStockReport::new(alerts);
        info!(
            company_id = %company_id,
            rows = scanned,
            alerts = report.total_alerts(),
            window_days = self.window.as_days(),
            "low-stock evaluation complete"
        );
        Ok(report)
    }

    async fn enrich(
        &self,
        company_id: CompanyId,
        row: &Inventory,
        product: &Product,
    ) -> Result<LowStockAlert, AlertError> {
        let warehouse = self
            .catalog
            .find_warehouse(company_id, row.warehouse_id)
            .await
            .map_err(AlertError::port("find_warehouse"))?
            .ok_or(AlertError::DanglingReference {
                inventory_id: row.id,
                entity: "warehouse",
            })?;

        let supplier = match product.primary_supplier_id {
            Some(supplier_id) => self
                .catalog
                .find_supplier(supplier_id)
                .await
                .map_err(AlertError::port("find_supplier"))?
                .map(|s| s.contact()),
            None => None,
        };

        let days_until_stockout = self
            .estimator
            .estimated_days_until_stockout(company_id, product.id)
            .await
            .map_err(AlertError::port("estimated_days_until_stockout"))?;

        Ok(LowStockAlert {
            product_id: product.id,
            product_name: product.name.clone(),
            sku: product.sku.clone(),
            warehouse_id: warehouse.id,
            warehouse_name: warehouse.name,
            current_stock: row.quantity,
            threshold: product.low_stock_threshold,
            days_until_stockout,
            supplier,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use stockwatch_core::{Price, SupplierId, WarehouseId};
    use stockwatch_inventory::Warehouse;
    use stockwatch_parties::Supplier;

    use super::*;
    use crate::source::SourceError;

    /// Hand-built catalog for evaluator tests.
    #[derive(Default)]
    struct Fixture {
        rows: Vec<Inventory>,
        products: HashMap<ProductId, Product>,
        warehouses: HashMap<WarehouseId, Warehouse>,
        suppliers: HashMap<SupplierId, Supplier>,
        selling: HashSet<ProductId>,
        estimate: Option<u32>,
        fail_inventory_scan: bool,
        fail_recency: bool,
        recency_calls: Mutex<usize>,
    }

    impl Fixture {
        fn warehouse(&mut self, company_id: CompanyId, name: &str) -> WarehouseId {
            let w = Warehouse::new(WarehouseId::new(), company_id, name, None).unwrap();
            let id = w.id;
            self.warehouses.insert(id, w);
            id
        }

        fn product(&mut self, company_id: CompanyId, sku: &str, threshold: i64, selling: bool) -> ProductId {
            let p = Product {
                id: ProductId::new(),
                company_id,
                name: format!("Product {sku}"),
                sku: sku.to_string(),
                price: "9.99".parse::<Price>().unwrap(),
                is_bundle: false,
                low_stock_threshold: threshold,
                primary_supplier_id: None,
            };
            let id = p.id;
            self.products.insert(id, p);
            if selling {
                self.selling.insert(id);
            }
            id
        }

        fn stock(&mut self, product_id: ProductId, warehouse_id: WarehouseId, quantity: i64) {
            self.rows
                .push(Inventory::initial(product_id, warehouse_id, quantity, Utc::now()));
        }

        fn supply(&mut self, product_id: ProductId, email: Option<&str>) -> SupplierId {
            let s = Supplier::new(SupplierId::new(), "Parts Co", email.map(str::to_string)).unwrap();
            let id = s.id;
            self.suppliers.insert(id, s);
            if let Some(p) = self.products.get_mut(&product_id) {
                p.primary_supplier_id = Some(id);
            }
            id
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("fixture failure")]
    struct FixtureFailure;

    #[async_trait]
    impl CatalogReader for Fixture {
        async fn find_inventory_by_company(&self, company_id: CompanyId) -> Result<Vec<Inventory>, SourceError> {
            if self.fail_inventory_scan {
                return Err(Box::new(FixtureFailure));
            }
            // Deliberately unscoped: the evaluator must still drop foreign rows.
            let _ = company_id;
            Ok(self.rows.clone())
        }

        async fn find_product(&self, product_id: ProductId) -> Result<Option<Product>, SourceError> {
            Ok(self.products.get(&product_id).cloned())
        }

        async fn find_warehouse(
            &self,
            company_id: CompanyId,
            warehouse_id: WarehouseId,
        ) -> Result<Option<Warehouse>, SourceError> {
            Ok(self
                .warehouses
                .get(&warehouse_id)
                .filter(|w| w.belongs_to(company_id))
                .cloned())
        }

        async fn find_supplier(&self, supplier_id: SupplierId) -> Result<Option<Supplier>, SourceError> {
            Ok(self.suppliers.get(&supplier_id).cloned())
        }
    }

    #[async_trait]
    impl SalesRecency for Fixture {
        async fn has_recent_sales(
            &self,
            _c: CompanyId,
            product_id: ProductId,
            _w: SalesWindow,
        ) -> Result<bool, SourceError> {
            *self.recency_calls.lock().unwrap() += 1;
            if self.fail_recency {
                return Err(Box::new(FixtureFailure));
            }
            Ok(self.selling.contains(&product_id))
        }
    }

    #[async_trait]
    impl StockoutEstimator for Fixture {
        async fn estimated_days_until_stockout(
            &self,
            _c: CompanyId,
            _p: ProductId,
        ) -> Result<Option<u32>, SourceError> {
            Ok(self.estimate)
        }
    }

    fn evaluator(f: &Fixture) -> LowStockEvaluator<&Fixture, &Fixture, &Fixture> {
        LowStockEvaluator::new(f, f, f)
    }

    #[async_trait]
    impl<T: CatalogReader + ?Sized> CatalogReader for &T {
        async fn find_inventory_by_company(&self, c: CompanyId) -> Result<Vec<Inventory>, SourceError> {
            (**self).find_inventory_by_company(c).await
        }
        async fn find_product(&self, p: ProductId) -> Result<Option<Product>, SourceError> {
            (**self).find_product(p).await
        }
        async fn find_warehouse(&self, c: CompanyId, w: WarehouseId) -> Result<Option<Warehouse>, SourceError> {
            (**self).find_warehouse(c, w).await
        }
        async fn find_supplier(&self, s: SupplierId) -> Result<Option<Supplier>, SourceError> {
            (**self).find_supplier(s).await
        }
    }

    #[async_trait]
    impl<T: SalesRecency + ?Sized> SalesRecency for &T {
        async fn has_recent_sales(&self, c: CompanyId, p: ProductId, w: SalesWindow) -> Result<bool, SourceError> {
            (**self).has_recent_sales(c, p, w).await
        }
    }

    #[async_trait]
    impl<T: StockoutEstimator + ?Sized> StockoutEstimator for &T {
        async fn estimated_days_until_stockout(&self, c: CompanyId, p: ProductId) -> Result<Option<u32>, SourceError> {
            (**self).estimated_days_until_stockout(c, p).await
        }
    }

    #[tokio::test]
    async fn company_without_stock_rows_gets_empty_report() {
        let f = Fixture::default();
        let report = evaluator(&f).evaluate(CompanyId::new()).await.unwrap();
        assert!(report.alerts().is_empty());
        assert_eq!(report.total_alerts(), 0);
    }

    #[tokio::test]
    async fn only_the_understocked_warehouse_alerts() {
        let company = CompanyId::new();
        let mut f = Fixture::default();
        let low = f.warehouse(company, "North");
        let high = f.warehouse(company, "South");
        let p = f.product(company, "WID-1", 10, true);
        f.stock(p, low, 5);
        f.stock(p, high, 15);

        let report = evaluator(&f).evaluate(company).await.unwrap();
        assert_eq!(report.total_alerts(), 1);
        let alert = &report.alerts()[0];
        assert_eq!(alert.warehouse_id, low);
        assert_eq!(alert.warehouse_name, "North");
        assert_eq!(alert.current_stock, 5);
        assert_eq!(alert.threshold, 10);
    }

    #[tokio::test]
    async fn threshold_is_strict() {
        let company = CompanyId::new();
        let mut f = Fixture::default();
        let w = f.warehouse(company, "Main");
        let at = f.product(company, "AT", 10, true);
        let below = f.product(company, "BELOW", 10, true);
        f.stock(at, w, 10);
        f.stock(below, w, 9);

        let report = evaluator(&f).evaluate(company).await.unwrap();
        let skus: Vec<_> = report.alerts().iter().map(|a| a.sku.as_str()).collect();
        assert_eq!(skus, vec!["BELOW"]);
    }

    #[tokio::test]
    async fn zero_and_negative_stock_alert_when_selling() {
        let company = CompanyId::new();
        let mut f = Fixture::default();
        let w = f.warehouse(company, "Main");
        let empty = f.product(company, "EMPTY", 1, true);
        let backordered = f.product(company, "BACK", 1, true);
        f.stock(empty, w, 0);
        f.stock(backordered, w, -7);

        let report = evaluator(&f).evaluate(company).await.unwrap();
        assert_eq!(report.total_alerts(), 2);
    }

    #[tokio::test]
    async fn products_without_recent_sales_never_alert() {
        let company = CompanyId::new();
        let mut f = Fixture::default();
        let w = f.warehouse(company, "Main");
        let p = f.product(company, "DEAD", 10, false);
        f.stock(p, w, -100);

        let report = evaluator(&f).evaluate(company).await.unwrap();
        assert_eq!(report.total_alerts(), 0);
    }

    #[tokio::test]
    async fn missing_supplier_yields_null_supplier_not_a_missing_alert() {
        let company = CompanyId::new();
        let mut f = Fixture::default();
        f.estimate = Some(4);
        let w = f.warehouse(company, "Main");
        let p = f.product(company, "LONELY", 10, true);
        f.stock(p, w, 3);

        let report = evaluator(&f).evaluate(company).await.unwrap();
        assert_eq!(report.total_alerts(), 1);
        let a = &report.alerts()[0];
        assert_eq!(a.supplier, None);
        assert_eq!(a.product_id, p);
        assert_eq!(a.product_name, "Product LONELY");
        assert_eq!(a.sku, "LONELY");
        assert_eq!(a.current_stock, 3);
        assert_eq!(a.threshold, 10);
        assert_eq!(a.days_until_stockout, Some(4));

        let json = serde_json::to_value(a).unwrap();
        assert!(json.get("supplier").unwrap().is_null());
    }

    #[tokio::test]
    async fn primary_supplier_is_attached() {
        let company = CompanyId::new();
        let mut f = Fixture::default();
        let w = f.warehouse(company, "Main");
        let p = f.product(company, "SUP", 10, true);
        f.stock(p, w, 1);
        let s = f.supply(p, Some("orders@parts.example"));

        let report = evaluator(&f).evaluate(company).await.unwrap();
        let supplier = report.alerts()[0].supplier.clone().unwrap();
        assert_eq!(supplier.id, s);
        assert_eq!(supplier.contact_email.as_deref(), Some("orders@parts.example"));
    }

    #[tokio::test]
    async fn supplier_reference_that_does_not_resolve_is_null() {
        let company = CompanyId::new();
        let mut f = Fixture::default();
        let w = f.warehouse(company, "Main");
        let p = f.product(company, "GONE", 10, true);
        f.stock(p, w, 1);
        f.products.get_mut(&p).unwrap().primary_supplier_id = Some(SupplierId::new());

        let report = evaluator(&f).evaluate(company).await.unwrap();
        assert_eq!(report.total_alerts(), 1);
        assert_eq!(report.alerts()[0].supplier, None);
    }

    #[tokio::test]
    async fn rows_of_other_companies_are_dropped() {
        let mine = CompanyId::new();
        let theirs = CompanyId::new();
        let mut f = Fixture::default();
        let w_mine = f.warehouse(mine, "Mine");
        let w_theirs = f.warehouse(theirs, "Theirs");
        let p_mine = f.product(mine, "MINE", 10, true);
        let p_theirs = f.product(theirs, "THEIRS", 10, true);
        f.stock(p_mine, w_mine, 1);
        f.stock(p_theirs, w_theirs, 1);

        let report = evaluator(&f).evaluate(mine).await.unwrap();
        assert_eq!(report.total_alerts(), 1);
        assert_eq!(report.alerts()[0].sku, "MINE");
    }

    #[tokio::test]
    async fn recency_is_asked_once_per_product() {
        let company = CompanyId::new();
        let mut f = Fixture::default();
        let p = f.product(company, "MULTI", 10, true);
        for name in ["A", "B", "C"] {
            let w = f.warehouse(company, name);
            f.stock(p, w, 1);
        }

        let report = evaluator(&f).evaluate(company).await.unwrap();
        assert_eq!(report.total_alerts(), 3);
        assert_eq!(*f.recency_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn alerts_are_not_aggregated_across_warehouses() {
        let company = CompanyId::new();
        let mut f = Fixture::default();
        let p = f.product(company, "SPLIT", 10, true);
        let a = f.warehouse(company, "A");
        let b = f.warehouse(company, "B");
        f.stock(p, a, 2);
        f.stock(p, b, 3);

        let report = evaluator(&f).evaluate(company).await.unwrap();
        // Order follows the scan; compare as a set.
        let mut got: Vec<_> = report.alerts().iter().map(|x| (x.warehouse_id, x.current_stock)).collect();
        got.sort();
        let mut want = vec![(a, 2), (b, 3)];
        want.sort();
        assert_eq!(got, want);
    }

    #[tokio::test]
    async fn scan_failure_aborts_evaluation() {
        let f = Fixture {
            fail_inventory_scan: true,
            ..Fixture::default()
        };
        let err = evaluator(&f).evaluate(CompanyId::new()).await.unwrap_err();
        assert!(matches!(err, AlertError::Source { operation: "find_inventory_by_company", .. }));
    }

    #[tokio::test]
    async fn recency_failure_aborts_rather_than_dropping_rows() {
        let company = CompanyId::new();
        let mut f = Fixture::default();
        let w = f.warehouse(company, "Main");
        let p = f.product(company, "X", 10, true);
        f.stock(p, w, 1);
        f.fail_recency = true;

        let err = evaluator(&f).evaluate(company).await.unwrap_err();
        assert!(matches!(err, AlertError::Source { operation: "has_recent_sales", .. }));
    }

    #[tokio::test]
    async fn row_with_unknown_product_is_an_error() {
        let company = CompanyId::new();
        let mut f = Fixture::default();
        let w = f.warehouse(company, "Main");
        f.stock(ProductId::new(), w, 1);

        let err = evaluator(&f).evaluate(company).await.unwrap_err();
        assert!(matches!(err, AlertError::DanglingReference { entity: "product", .. }));
    }

    #[test]
    fn default_window_is_thirty_days() {
        let f = Fixture::default();
        assert_eq!(evaluator(&f).window().as_days(), 30);
        let custom = evaluator(&f).with_window(SalesWindow::days(7).unwrap());
        assert_eq!(custom.window().as_days(), 7);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 64,
                ..ProptestConfig::default()
            })]

            /// Property: a selling product alerts iff quantity < threshold, and
            /// the count always equals the list length.
            #[test]
            fn alert_iff_strictly_below(quantity in -50i64..50, threshold in 0i64..50) {
                let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
                let company = CompanyId::new();
                let mut f = Fixture::default();
                let w = f.warehouse(company, "Main");
                let p = f.product(company, "P", threshold, true);
                f.stock(p, w, quantity);

                let report = rt.block_on(evaluator(&f).evaluate(company)).unwrap();
                prop_assert_eq!(report.total_alerts(), report.alerts().len());
                prop_assert_eq!(report.total_alerts() == 1, quantity < threshold);
            }
        }
    }
}
