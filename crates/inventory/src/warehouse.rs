use serde::{Deserialize, Serialize};

use stockwatch_core::{CompanyId, DomainError, Entity, TenantOwned, WarehouseId};

/// A physical stocking location owned by one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub company_id: CompanyId,
    pub name: String,
    pub location: Option<String>,
}

impl Warehouse {
    pub fn new(
        id: WarehouseId,
        company_id: CompanyId,
        name: impl Into<String>,
        location: Option<String>,
    ) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("warehouse name cannot be empty"));
        }
        let location = location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());

        Ok(Self {
            id,
            company_id,
            name,
            location,
        })
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantOwned for Warehouse {
    fn company_id(&self) -> CompanyId {
        self.company_id
    }
}
