use axum::{routing::get, Router};
use crate::handlers::purchase::{create_purchase, list_purchases};
use crate::middleware::auth::{require_auth, require_owner};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/purchases", get(list_purchases).post(create_purchase))
        .route_layer(axum::middleware::from_fn(require_owner))
        .route_layer(axum::middleware::from_fn(require_auth))
}
