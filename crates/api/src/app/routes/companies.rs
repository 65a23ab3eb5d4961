use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use stockwatch_core::CompanyId;
use stockwatch_parties::Company;
use stockwatch_infra::CatalogStore;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", post(create_company))
}

pub async fn create_company(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateCompanyRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let company = match Company::new(CompanyId::new(), body.name) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let company_id = company.id;

    if let Err(e) = services.catalog.insert_company(company).await {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(dto::CompanyCreatedResponse { company_id })).into_response()
}
