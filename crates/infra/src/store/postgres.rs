//! Postgres-backed catalog, stock and sales store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `UniqueViolation` |
//! | Database (foreign key violation) | `23503` | `ForeignKey` |
//! | Database (check constraint violation) | `23514` | `InvalidWrite` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / Io / Tls / other | N/A | `Backend` |
//!
//! ## Tenant Isolation
//!
//! Every tenant-owned query filters on `company_id`, either on the table
//! itself or through a join to `products`. Stock rows carry no company column
//! of their own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use std::time::Duration;
use tracing::{instrument, Span};
use uuid::Uuid;

use stockwatch_alerts::{CatalogReader, SourceError};
use stockwatch_core::{CompanyId, Price, ProductId, SupplierId, WarehouseId};
use stockwatch_inventory::{Inventory, Warehouse};
use stockwatch_parties::{Company, Supplier};
use stockwatch_products::Product;
use stockwatch_sales::SalesRecord;

use super::r#trait::{CatalogStore, SalesLedger, StoreError};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the schema. Idempotent.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait]
impl CatalogReader for PostgresStore {
    #[instrument(skip(self), fields(company_id = %company_id, row_count = tracing::field::Empty), err)]
    async fn find_inventory_by_company(&self, company_id: CompanyId) -> Result<Vec<Inventory>, SourceError> {
        let rows = sqlx::query(
            r#"
            SELECT i.id, i.product_id, i.warehouse_id, i.quantity, i.updated_at
            FROM inventory i
            JOIN products p ON p.id = i.product_id
            WHERE p.company_id = $1
            ORDER BY i.scan_order ASC
            "#,
        )
        .bind(company_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_inventory_by_company", e))?;

        let inventory = rows
            .iter()
            .map(inventory_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Span::current().record("row_count", inventory.len());
        Ok(inventory)
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn find_product(&self, product_id: ProductId) -> Result<Option<Product>, SourceError> {
        let row = sqlx::query(
            r#"
            SELECT id, company_id, name, sku, price, is_bundle, low_stock_threshold, primary_supplier_id
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_product", e))?;

        Ok(row.as_ref().map(product_from_row).transpose()?)
    }

    #[instrument(skip(self), fields(company_id = %company_id, warehouse_id = %warehouse_id), err)]
    async fn find_warehouse(
        &self,
        company_id: CompanyId,
        warehouse_id: WarehouseId,
    ) -> Result<Option<Warehouse>, SourceError> {
        let row = sqlx::query(
            "SELECT id, company_id, name, location FROM warehouses WHERE company_id = $1 AND id = $2",
        )
        .bind(company_id.as_uuid())
        .bind(warehouse_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_warehouse", e))?;

        Ok(row.as_ref().map(warehouse_from_row).transpose()?)
    }

    #[instrument(skip(self), fields(supplier_id = %supplier_id), err)]
    async fn find_supplier(&self, supplier_id: SupplierId) -> Result<Option<Supplier>, SourceError> {
        let row = sqlx::query("SELECT id, name, contact_email FROM suppliers WHERE id = $1")
            .bind(supplier_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_supplier", e))?;

        Ok(row.as_ref().map(supplier_from_row).transpose()?)
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    #[instrument(skip(self), fields(company_id = %company_id), err)]
    async fn exists_by_sku(&self, company_id: CompanyId, sku: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM products WHERE company_id = $1 AND sku = $2)",
        )
        .bind(company_id.as_uuid())
        .bind(sku)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("exists_by_sku", e))
    }

    #[instrument(skip(self), err)]
    async fn exists_by_sku_globally(&self, sku: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM products WHERE sku = $1)")
            .bind(sku)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("exists_by_sku_globally", e))
    }

    /// Insert the product and its first stock row in one transaction.
    ///
    /// Dropping the transaction without commit rolls back, so every early
    /// return below leaves no rows behind.
    #[instrument(
        skip(self, product, inventory),
        fields(
            company_id = %product.company_id,
            product_id = %product.id,
            warehouse_id = %inventory.warehouse_id
        ),
        err
    )]
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

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        // Lock the warehouse row so it cannot change owner mid-write.
        let owner: Option<Uuid> =
            sqlx::query_scalar("SELECT company_id FROM warehouses WHERE id = $1 FOR SHARE")
                .bind(inventory.warehouse_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("lock_warehouse", e))?;
        if owner != Some(*product.company_id.as_uuid()) {
            return Err(StoreError::ForeignKey(format!(
                "warehouse {} does not belong to company {}",
                inventory.warehouse_id, product.company_id
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO products
                (id, company_id, name, sku, price, is_bundle, low_stock_threshold, primary_supplier_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(product.company_id.as_uuid())
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.price.amount())
        .bind(product.is_bundle)
        .bind(product.low_stock_threshold)
        .bind(product.primary_supplier_id.map(|s| *s.as_uuid()))
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;

        sqlx::query(
            r#"
            INSERT INTO inventory (id, product_id, warehouse_id, quantity, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(inventory.id.as_uuid())
        .bind(inventory.product_id.as_uuid())
        .bind(inventory.warehouse_id.as_uuid())
        .bind(inventory.quantity)
        .bind(inventory.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_inventory", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(product.id)
    }

    #[instrument(skip(self, company), fields(company_id = %company.id), err)]
    async fn insert_company(&self, company: Company) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO companies (id, name) VALUES ($1, $2)")
            .bind(company.id.as_uuid())
            .bind(&company.name)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_company", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(company_id = %company_id), err)]
    async fn find_company(&self, company_id: CompanyId) -> Result<Option<Company>, StoreError> {
        let row = sqlx::query("SELECT id, name FROM companies WHERE id = $1")
            .bind(company_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_company", e))?;

        row.map(|r| -> Result<Company, StoreError> {
            Ok(Company {
                id: get::<Uuid>(&r, "id")?.into(),
                name: get(&r, "name")?,
            })
        })
        .transpose()
    }

    #[instrument(skip(self, warehouse), fields(company_id = %warehouse.company_id, warehouse_id = %warehouse.id), err)]
    async fn insert_warehouse(&self, warehouse: Warehouse) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO warehouses (id, company_id, name, location) VALUES ($1, $2, $3, $4)")
            .bind(warehouse.id.as_uuid())
            .bind(warehouse.company_id.as_uuid())
            .bind(&warehouse.name)
            .bind(&warehouse.location)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_warehouse", e))?;
        Ok(())
    }

    #[instrument(skip(self, supplier), fields(supplier_id = %supplier.id), err)]
    async fn insert_supplier(&self, supplier: Supplier) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO suppliers (id, name, contact_email) VALUES ($1, $2, $3)")
            .bind(supplier.id.as_uuid())
            .bind(&supplier.name)
            .bind(&supplier.contact_email)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_supplier", e))?;
        Ok(())
    }
}

#[async_trait]
impl SalesLedger for PostgresStore {
    #[instrument(skip(self, sale), fields(company_id = %sale.company_id, product_id = %sale.product_id), err)]
    async fn record_sale(&self, sale: SalesRecord) -> Result<(), StoreError> {
        // The SELECT guards tenant ownership of the product; zero rows inserted means a foreign product.
        let inserted = sqlx::query(
            r#"
            INSERT INTO sales_records (id, company_id, product_id, warehouse_id, quantity, sold_at)
            SELECT $1, $2, $3, $4, $5, $6
            WHERE EXISTS (SELECT 1 FROM products WHERE id = $3 AND company_id = $2)
              AND ($4::uuid IS NULL OR EXISTS (SELECT 1 FROM warehouses WHERE id = $4 AND company_id = $2))
            "#,
        )
        .bind(sale.id.as_uuid())
        .bind(sale.company_id.as_uuid())
        .bind(sale.product_id.as_uuid())
        .bind(sale.warehouse_id.map(|w| *w.as_uuid()))
        .bind(sale.quantity)
        .bind(sale.sold_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("record_sale", e))?;

        if inserted.rows_affected() == 0 {
            return Err(StoreError::ForeignKey(format!(
                "product {} or warehouse does not belong to company {}",
                sale.product_id, sale.company_id
            )));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(company_id = %company_id, product_id = %product_id), err)]
    async fn has_sales_since(
        &self,
        company_id: CompanyId,
        product_id: ProductId,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM sales_records
                WHERE company_id = $1 AND product_id = $2 AND sold_at >= $3
            )
            "#,
        )
        .bind(company_id.as_uuid())
        .bind(product_id.as_uuid())
        .bind(since)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("has_sales_since", e))
    }

    #[instrument(skip(self), fields(company_id = %company_id, product_id = %product_id), err)]
    async fn units_sold_since(
        &self,
        company_id: CompanyId,
        product_id: ProductId,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM sales_records
            WHERE company_id = $1 AND product_id = $2 AND sold_at >= $3
            "#,
        )
        .bind(company_id.as_uuid())
        .bind(product_id.as_uuid())
        .bind(since)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("units_sold_since", e))
    }

    #[instrument(skip(self), fields(company_id = %company_id, product_id = %product_id), err)]
    async fn on_hand(&self, company_id: CompanyId, product_id: ProductId) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(GREATEST(i.quantity, 0)), 0)::BIGINT
            FROM inventory i
            JOIN products p ON p.id = i.product_id
            WHERE p.company_id = $1 AND i.product_id = $2
            "#,
        )
        .bind(company_id.as_uuid())
        .bind(product_id.as_uuid())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("on_hand", e))
    }
}

// Row decoding

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::Backend(format!("failed to decode column {column}: {e}")))
}

fn inventory_from_row(row: &PgRow) -> Result<Inventory, StoreError> {
    Ok(Inventory {
        id: get::<Uuid>(row, "id")?.into(),
        product_id: get::<Uuid>(row, "product_id")?.into(),
        warehouse_id: get::<Uuid>(row, "warehouse_id")?.into(),
        quantity: get(row, "quantity")?,
        updated_at: get(row, "updated_at")?,
    })
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let price = Price::new(get::<Decimal>(row, "price")?)
        .map_err(|e| StoreError::Backend(format!("stored price is invalid: {e}")))?;
    Ok(Product {
        id: get::<Uuid>(row, "id")?.into(),
        company_id: get::<Uuid>(row, "company_id")?.into(),
        name: get(row, "name")?,
        sku: get(row, "sku")?,
        price,
        is_bundle: get(row, "is_bundle")?,
        low_stock_threshold: get(row, "low_stock_threshold")?,
        primary_supplier_id: get::<Option<Uuid>>(row, "primary_supplier_id")?.map(SupplierId::from),
    })
}

fn warehouse_from_row(row: &PgRow) -> Result<Warehouse, StoreError> {
    Ok(Warehouse {
        id: get::<Uuid>(row, "id")?.into(),
        company_id: get::<Uuid>(row, "company_id")?.into(),
        name: get(row, "name")?,
        location: get(row, "location")?,
    })
}

fn supplier_from_row(row: &PgRow) -> Result<Supplier, StoreError> {
    Ok(Supplier {
        id: get::<Uuid>(row, "id")?.into(),
        name: get(row, "name")?,
        contact_email: get(row, "contact_email")?,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::UniqueViolation(msg),
                Some("23503") => StoreError::ForeignKey(msg),
                Some("23514") => StoreError::InvalidWrite(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {}", operation)),
        sqlx::Error::PoolTimedOut => StoreError::Backend(format!("connection pool timed out in {}", operation)),
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
