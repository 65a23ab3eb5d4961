use axum::{middleware, Router};

use crate::middleware::tenant_middleware;

pub mod alerts;
pub mod companies;
pub mod products;
pub mod sales;
pub mod suppliers;
pub mod system;
pub mod warehouses;

/// Router for every data endpoint.
pub fn router() -> Router {
    let tenant_scoped = Router::new()
        .nest("/products", products::router())
        .nest("/alerts", alerts::router())
        .nest("/warehouses", warehouses::router())
        .nest("/sales", sales::router())
        .route_layer(middleware::from_fn(tenant_middleware));

    Router::new()
        .nest("/companies", companies::router())
        .nest("/companies/:company_id", tenant_scoped)
        .nest("/suppliers", suppliers::router())
}
