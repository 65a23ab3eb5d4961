use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::TenantContext;

pub fn router() -> Router {
    Router::new().route("/", post(create_product))
}

/// Create a product and its first stock row in one atomic write.
pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    body: Result<Json<dto::CreateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let cmd = match body.into_command(tenant.company_id()) {
        Ok(cmd) => cmd,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.provisioner.provision(cmd).await {
        Ok(created) => (
            StatusCode::CREATED,
            Json(dto::ProductCreatedResponse {
                product_id: created.product_id,
                success: true,
            }),
        )
            .into_response(),
        Err(e) => errors::provision_error_to_response(e),
    }
}
