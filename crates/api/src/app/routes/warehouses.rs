use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use stockwatch_core::WarehouseId;
use stockwatch_inventory::Warehouse;
use stockwatch_infra::CatalogStore;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::TenantContext;

pub fn router() -> Router {
    Router::new().route("/", post(create_warehouse))
}

pub async fn create_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    body: Result<Json<dto::CreateWarehouseRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.catalog.find_company(tenant.company_id()).await {
        Ok(Some(_)) => {}
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "company not found"),
        Err(e) => return errors::store_error_to_response(e),
    }

    let warehouse = match Warehouse::new(WarehouseId::new(), tenant.company_id(), body.name, body.location) {
        Ok(w) => w,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let warehouse_id = warehouse.id;

    if let Err(e) = services.catalog.insert_warehouse(warehouse).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(dto::WarehouseCreatedResponse { warehouse_id })).into_response()
}
