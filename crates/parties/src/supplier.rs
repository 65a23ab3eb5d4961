use serde::{Deserialize, Serialize};

use stockwatch_core::{DomainError, Entity, SupplierId};

/// A supplier that can be referenced as a product's primary supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub contact_email: Option<String>,
}

impl Supplier {
    pub fn new(
        id: SupplierId,
        name: impl Into<String>,
        contact_email: Option<String>,
    ) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("supplier name cannot be empty"));
        }

        let contact_email = match contact_email.map(|e| e.trim().to_string()) {
            Some(e) if e.is_empty() => None,
            Some(e) if !looks_like_email(&e) => {
                return Err(DomainError::validation("contact_email is not a valid email address"));
            }
            other => other,
        };

        Ok(Self {
            id,
            name,
            contact_email,
        })
    }

    /// The contact sub-record surfaced in low-stock alerts.
    pub fn contact(&self) -> SupplierContact {
        SupplierContact {
            id: self.id,
            name: self.name.clone(),
            contact_email: self.contact_email.clone(),
        }
    }
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Supplier details embedded in an alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierContact {
    pub id: SupplierId,
    pub name: String,
    pub contact_email: Option<String>,
}

// Shape check only; deliverability is not our concern.
fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}
