use serde::{Deserialize, Serialize};

use stockwatch_core::{CompanyId, DomainError, Entity, Price, ProductId, SupplierId, TenantOwned};

/// How far SKU uniqueness reaches.
///
/// SKUs are unique per company by default. `Global` makes the existence check
/// span every tenant; the storage constraint stays per company either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkuScope {
    #[default]
    Company,
    Global,
}

impl core::str::FromStr for SkuScope {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "company" | "tenant" => Ok(Self::Company),
            "global" => Ok(Self::Global),
            other => Err(DomainError::validation(format!(
                "unknown sku scope '{other}' (expected company or global)"
            ))),
        }
    }
}

/// A catalog product owned by one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub company_id: CompanyId,
    pub name: String,
    pub sku: String,
    pub price: Price,
    /// Stored only; bundle pricing has no defined semantics yet.
    pub is_bundle: bool,
    pub low_stock_threshold: i64,
    pub primary_supplier_id: Option<SupplierId>,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantOwned for Product {
    fn company_id(&self) -> CompanyId {
        self.company_id
    }
}
