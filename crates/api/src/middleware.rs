use std::collections::HashMap;

use axum::{
    extract::Path,
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use stockwatch_core::CompanyId;

use crate::app::errors;
use crate::context::TenantContext;

/// Resolve the tenant from the `company_id` path segment.
///
/// Must be installed with `route_layer` so path parameters are already
/// matched. Existence of the company is checked by the routes that need it.
pub async fn tenant_middleware(
    Path(params): Path<HashMap<String, String>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(raw) = params.get("company_id") else {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "company_id is required");
    };

    let company_id = match raw.parse::<CompanyId>() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    req.extensions_mut().insert(TenantContext::new(company_id));
    next.run(req).await
}
