use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use stockwatch_core::{CompanyId, DomainError, Entity, ProductId, SaleId, TenantOwned, WarehouseId};

/// One sale of a product (read-only input to alerting).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub id: SaleId,
    pub company_id: CompanyId,
    pub product_id: ProductId,
    pub warehouse_id: Option<WarehouseId>,
    pub quantity: i64,
    pub sold_at: DateTime<Utc>,
}

impl SalesRecord {
    pub fn new(
        company_id: CompanyId,
        product_id: ProductId,
        warehouse_id: Option<WarehouseId>,
        quantity: i64,
        sold_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if quantity <= 0 {
            return Err(DomainError::validation("sale quantity must be positive"));
        }
        Ok(Self {
            id: SaleId::new(),
            company_id,
            product_id,
            warehouse_id,
            quantity,
            sold_at,
        })
    }
}

impl Entity for SalesRecord {
    type Id = SaleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantOwned for SalesRecord {
    fn company_id(&self) -> CompanyId {
        self.company_id
    }
}

/// Trailing window of whole days, ending "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SalesWindow(u32);

impl SalesWindow {
    pub const DEFAULT_DAYS: u32 = 30;
    /// Ten years; keeps `start` inside chrono's representable range.
    pub const MAX_DAYS: u32 = 3650;

    pub fn days(days: u32) -> Result<Self, DomainError> {
        if days == 0 {
            return Err(DomainError::validation("sales window must be at least one day"));
        }
        if days > Self::MAX_DAYS {
            return Err(DomainError::validation(format!(
                "sales window must not exceed {} days",
                Self::MAX_DAYS
            )));
        }
        Ok(Self(days))
    }

    pub fn as_days(&self) -> u32 {
        self.0
    }

    /// Earliest instant still inside the window.
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.0))
    }

    /// Inclusive of the start instant and of `now`.
    pub fn contains(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        at >= self.start(now) && at <= now
    }
}

impl Default for SalesWindow {
    fn default() -> Self {
        Self(Self::DEFAULT_DAYS)
    }
}

impl TryFrom<u32> for SalesWindow {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::days(value)
    }
}

impl From<SalesWindow> for u32 {
    fn from(value: SalesWindow) -> Self {
        value.0
    }
}
