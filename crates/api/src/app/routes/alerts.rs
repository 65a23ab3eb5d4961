use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::TenantContext;

pub fn router() -> Router {
    Router::new().route("/low-stock", get(low_stock))
}

pub async fn low_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
) -> axum::response::Response {
    match services.evaluator.evaluate(tenant.company_id()).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => errors::alert_error_to_response(e),
    }
}
