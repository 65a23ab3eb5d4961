use stockwatch_core::CompanyId;

/// Tenant context for a request.
///
/// Derived from the `/companies/:company_id` path by [`crate::middleware`];
/// immutable and present on every tenant-scoped route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TenantContext {
    company_id: CompanyId,
}

impl TenantContext {
    pub fn new(company_id: CompanyId) -> Self {
        Self { company_id }
    }

    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }
}
