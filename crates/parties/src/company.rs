use serde::{Deserialize, Serialize};

use stockwatch_core::{CompanyId, DomainError, Entity};

/// A company: the tenant and root of data isolation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
}

impl Company {
    pub fn new(id: CompanyId, name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("company name cannot be empty"));
        }
        Ok(Self { id, name })
    }
}

impl Entity for Company {
    type Id = CompanyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
