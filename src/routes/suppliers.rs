use axum::{
    routing::{get, post},
    Router,
};
use crate::handlers::supplier::{create_supplier, list_suppliers};
use crate::middleware::auth::{require_auth, require_owner};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let reads = Router::new()
        .route("/suppliers", get(list_suppliers))
        .route_layer(axum::middleware::from_fn(require_auth));

    let writes = Router::new()
        .route("/suppliers", post(create_supplier))
        .route_layer(axum::middleware::from_fn(require_owner))
        .route_layer(axum::middleware::from_fn(require_auth));

    reads.merge(writes)
}
