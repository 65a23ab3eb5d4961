use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock};

use stockwatch_alerts::{CatalogReader, SourceError};
use stockwatch_core::{CompanyId, ProductId, SupplierId, WarehouseId};
use stockwatch_inventory::{Inventory, Warehouse};
use stockwatch_parties::{Company, Supplier};
use stockwatch_products::Product;
use stockwatch_sales::SalesRecord;

use super::r#trait::{CatalogStore, SalesLedger, StoreError};

/// Where an armed fault fires inside `save_product_and_inventory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    /// Before anything is written.
    BeforeProductWrite,
    /// After the product row is staged, before the stock row.
    AfterProductWrite,
}

#[derive(Debug, Default)]
struct State {
    companies: HashMap<CompanyId, Company>,
    warehouses: HashMap<WarehouseId, Warehouse>,
    suppliers: HashMap<SupplierId, Supplier>,
    products: HashMap<ProductId, Product>,
    skus: HashSet<(CompanyId, String)>,
    // Vec keeps insertion order, which is the scan order readers see.
    inventory: Vec<Inventory>,
    sales: Vec<SalesRecord>,
}

impl State {
    fn owned_product(&self, company_id: CompanyId, product_id: ProductId) -> Option<&Product> {
        self.products
            .get(&product_id)
            .filter(|p| p.company_id == company_id)
    }

    fn remove_product(&mut self, product: &Product) {
        self.products.remove(&product.id);
        self.skus.remove(&(product.company_id, product.sku.clone()));
    }
}

/// In-memory catalog, stock and sales store.
///
/// Intended for tests/dev. A single `RwLock` guards all tables, so the
/// product + stock write is atomic with respect to every reader.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
    fault: Mutex<Option<FaultPoint>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot fault for the next provisioning write.
    pub fn fail_next_save(&self, point: FaultPoint) {
        if let Ok(mut fault) = self.fault.lock() {
            *fault = Some(point);
        }
    }

    pub fn product_count(&self) -> usize {
        self.state.read().map(|s| s.products.len()).unwrap_or(0)
    }

    pub fn inventory_count(&self) -> usize {
        self.state.read().map(|s| s.inventory.len()).unwrap_or(0)
    }

    /// Add a stock row for an existing product in another warehouse.
    pub fn insert_inventory(&self, row: Inventory) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let product = state
            .products
            .get(&row.product_id)
            .ok_or_else(|| StoreError::ForeignKey(format!("product {} does not exist", row.product_id)))?;
        let warehouse_ok = state
            .warehouses
            .get(&row.warehouse_id)
            .is_some_and(|w| w.company_id == product.company_id);
        if !warehouse_ok {
            return Err(StoreError::ForeignKey(format!(
                "warehouse {} does not belong to the product's company",
                row.warehouse_id
            )));
        }
        if state
            .inventory
            .iter()
            .any(|r| r.product_id == row.product_id && r.warehouse_id == row.warehouse_id)
        {
            return Err(StoreError::UniqueViolation("inventory (product_id, warehouse_id)".into()));
        }
        state.inventory.push(row);
        Ok(())
    }

    fn take_fault(&self) -> Option<FaultPoint> {
        self.fault.lock().ok().and_then(|mut f| f.take())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

#[async_trait]
impl CatalogReader for InMemoryStore {
    async fn find_inventory_by_company(&self, company_id: CompanyId) -> Result<Vec<Inventory>, SourceError> {
        let state = self.read()?;
        Ok(state
            .inventory
            .iter()
            .filter(|row| state.owned_product(company_id, row.product_id).is_some())
            .cloned()
            .collect())
    }

    async fn find_product(&self, product_id: ProductId) -> Result<Option<Product>, SourceError> {
        Ok(self.read()?.products.get(&product_id).cloned())
    }

    async fn find_warehouse(
        &self,
        company_id: CompanyId,
        warehouse_id: WarehouseId,
    ) -> Result<Option<Warehouse>, SourceError> {
        Ok(self
            .read()?
            .warehouses
            .get(&warehouse_id)
            .filter(|w| w.company_id == company_id)
            .cloned())
    }

    async fn find_supplier(&self, supplier_id: SupplierId) -> Result<Option<Supplier>, SourceError> {
        Ok(self.read()?.suppliers.get(&supplier_id).cloned())
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn exists_by_sku(&self, company_id: CompanyId, sku: &str) -> Result<bool, StoreError> {
        Ok(self.read()?.skus.contains(&(company_id, sku.to_string())))
    }

    async fn exists_by_sku_globally(&self, sku: &str) -> Result<bool, StoreError> {
        Ok(self.read()?.skus.iter().any(|(_, s)| s == sku))
    }

    async fn save_product_and_inventory(
        &self,
        product: Product,
        inventory: Inventory,
    ) -> Result<ProductId, StoreError> {
        if inventory.product_id != product.id {
            return Err(StoreError::InvalidWrite(
                "stock row does not reference the product being saved".into(),
            ));
        }

        let fault = self.take_fault();
        let mut state = self.write()?;

        if fault == Some(FaultPoint::BeforeProductWrite) {
            return Err(StoreError::Injected("before product write"));
        }
        if !state.companies.contains_key(&product.company_id) {
            return Err(StoreError::ForeignKey(format!("company {} does not exist", product.company_id)));
        }
        let warehouse_ok = state
            .warehouses
            .get(&inventory.warehouse_id)
            .is_some_and(|w| w.company_id == product.company_id);
        if !warehouse_ok {
            return Err(StoreError::ForeignKey(format!(
                "warehouse {} does not belong to company {}",
                inventory.warehouse_id, product.company_id
            )));
        }
        if let Some(supplier_id) = product.primary_supplier_id {
            if !state.suppliers.contains_key(&supplier_id) {
                return Err(StoreError::ForeignKey(format!("supplier {supplier_id} does not exist")));
            }
        }

        let sku_key = (product.company_id, product.sku.clone());
        if !state.skus.insert(sku_key) {
            return Err(StoreError::UniqueViolation("products (company_id, sku)".into()));
        }
        let product_id = product.id;
        state.products.insert(product_id, product.clone());

        if fault == Some(FaultPoint::AfterProductWrite) {
            state.remove_product(&product);
            return Err(StoreError::Injected("after product write"));
        }

        state.inventory.push(inventory);
        Ok(product_id)
    }

    async fn insert_company(&self, company: Company) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.companies.contains_key(&company.id) {
            return Err(StoreError::UniqueViolation("companies (id)".into()));
        }
        state.companies.insert(company.id, company);
        Ok(())
    }

    async fn find_company(&self, company_id: CompanyId) -> Result<Option<Company>, StoreError> {
        Ok(self.read()?.companies.get(&company_id).cloned())
    }

    async fn insert_warehouse(&self, warehouse: Warehouse) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if !state.companies.contains_key(&warehouse.company_id) {
            return Err(StoreError::ForeignKey(format!("company {} does not exist", warehouse.company_id)));
        }
        if state.warehouses.contains_key(&warehouse.id) {
            return Err(StoreError::UniqueViolation("warehouses (id)".into()));
        }
        state.warehouses.insert(warehouse.id, warehouse);
        Ok(())
    }

    async fn insert_supplier(&self, supplier: Supplier) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.suppliers.contains_key(&supplier.id) {
            return Err(StoreError::UniqueViolation("suppliers (id)".into()));
        }
        state.suppliers.insert(supplier.id, supplier);
        Ok(())
    }
}

#[async_trait]
impl SalesLedger for InMemoryStore {
    async fn record_sale(&self, sale: SalesRecord) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.owned_product(sale.company_id, sale.product_id).is_none() {
            return Err(StoreError::ForeignKey(format!(
                "product {} does not belong to company {}",
                sale.product_id, sale.company_id
            )));
        }
        if let Some(warehouse_id) = sale.warehouse_id {
            let ok = state
                .warehouses
                .get(&warehouse_id)
                .is_some_and(|w| w.company_id == sale.company_id);
            if !ok {
                return Err(StoreError::ForeignKey(format!("warehouse {warehouse_id} does not belong to company")));
            }
        }
        state.sales.push(sale);
        Ok(())
    }

    async fn has_sales_since(
        &self,
        company_id: CompanyId,
        product_id: ProductId,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        Ok(self
            .read()?
            .sales
            .iter()
            .any(|s| s.company_id == company_id && s.product_id == product_id && s.sold_at >= since))
    }

    async fn units_sold_since(
        &self,
        company_id: CompanyId,
        product_id: ProductId,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        Ok(self
            .read()?
            .sales
            .iter()
            .filter(|s| s.company_id == company_id && s.product_id == product_id && s.sold_at >= since)
            .map(|s| s.quantity)
            .sum())
    }

    async fn on_hand(&self, company_id: CompanyId, product_id: ProductId) -> Result<i64, StoreError> {
        let state = self.read()?;
        if state.owned_product(company_id, product_id).is_none() {
            return Ok(0);
        }
        Ok(state
            .inventory
            .iter()
            .filter(|r| r.product_id == product_id)
            .map(|r| r.quantity.max(0))
            .sum())
    }
}
