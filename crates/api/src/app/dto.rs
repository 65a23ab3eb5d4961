use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use stockwatch_core::{CompanyId, DomainError, ProductId, SaleId, SupplierId, WarehouseId};
use stockwatch_products::ProvisionProduct;

// -------------------------
// Request DTOs
// -------------------------

/// Every field is optional so that a missing field surfaces as a
/// `validation_error` naming the field rather than a generic JSON rejection.
#[derive(Debug, Default, Deserialize)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub sku: Option<String>,
    /// Accepts `"19.99"` or `19.99`; stored as a fixed-point decimal.
    pub price: Option<Value>,
    pub warehouse_id: Option<String>,
    pub initial_quantity: Option<i64>,
    pub is_bundle: Option<bool>,
    pub low_stock_threshold: Option<i64>,
    pub primary_supplier_id: Option<String>,
}

impl CreateProductRequest {
    pub fn into_command(self, company_id: CompanyId) -> Result<ProvisionProduct, DomainError> {
        Ok(ProvisionProduct {
            company_id,
            name: self.name,
            sku: self.sku,
            price: price_text(self.price)?,
            warehouse_id: parse_opt_id(self.warehouse_id.as_deref())?,
            initial_quantity: self.initial_quantity,
            is_bundle: self.is_bundle,
            low_stock_threshold: self.low_stock_threshold,
            primary_supplier_id: parse_opt_id::<SupplierId>(self.primary_supplier_id.as_deref())?,
            occurred_at: Utc::now(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateWarehouseRequest {
    pub name: String,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSupplierRequest {
    pub name: String,
    pub contact_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordSaleRequest {
    pub product_id: String,
    pub quantity: i64,
    pub warehouse_id: Option<String>,
    pub sold_at: Option<DateTime<Utc>>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ProductCreatedResponse {
    pub product_id: ProductId,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct CompanyCreatedResponse {
    pub company_id: CompanyId,
}

#[derive(Debug, Serialize)]
pub struct WarehouseCreatedResponse {
    pub warehouse_id: WarehouseId,
}

#[derive(Debug, Serialize)]
pub struct SupplierCreatedResponse {
    pub supplier_id: SupplierId,
}

#[derive(Debug, Serialize)]
pub struct SaleRecordedResponse {
    pub sale_id: SaleId,
}

// -------------------------
// Mapping helpers
// -------------------------

/// JSON numbers are converted through their literal text, never through a
/// float computation. Relies on serde_json's `arbitrary_precision`.
pub fn price_text(value: Option<Value>) -> Result<Option<String>, DomainError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(DomainError::validation("price must be a decimal string or number")),
    }
}

pub fn parse_opt_id<T>(raw: Option<&str>) -> Result<Option<T>, DomainError>
where
    T: std::str::FromStr<Err = DomainError>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}
