//! Entity trait: identity + continuity across state changes.

use crate::id::CompanyId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// An entity owned by exactly one company.
pub trait TenantOwned: Entity {
    fn company_id(&self) -> CompanyId;

    /// `true` when this entity is visible to `company_id`.
    fn belongs_to(&self, company_id: CompanyId) -> bool {
        self.company_id() == company_id
    }
}
