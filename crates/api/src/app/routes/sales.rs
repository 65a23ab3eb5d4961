use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use stockwatch_core::{ProductId, WarehouseId};
use stockwatch_infra::SalesLedger;
use stockwatch_sales::SalesRecord;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::TenantContext;

pub fn router() -> Router {
    Router::new().route("/", post(record_sale))
}

pub async fn record_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    body: Result<Json<dto::RecordSaleRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let product_id: ProductId = match body.product_id.trim().parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let warehouse_id = match dto::parse_opt_id::<WarehouseId>(body.warehouse_id.as_deref()) {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let sale = match SalesRecord::new(
        tenant.company_id(),
        product_id,
        warehouse_id,
        body.quantity,
        body.sold_at.unwrap_or_else(Utc::now),
    ) {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let sale_id = sale.id;

    if let Err(e) = services.ledger.record_sale(sale).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(dto::SaleRecordedResponse { sale_id })).into_response()
}
