use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use stockwatch_core::SupplierId;
use stockwatch_parties::Supplier;
use stockwatch_infra::CatalogStore;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", post(create_supplier))
}

/// Suppliers are shared across companies.
pub async fn create_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateSupplierRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let supplier = match Supplier::new(SupplierId::new(), body.name, body.contact_email) {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let supplier_id = supplier.id;

    if let Err(e) = services.catalog.insert_supplier(supplier).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(dto::SupplierCreatedResponse { supplier_id })).into_response()
}
