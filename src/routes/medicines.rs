use axum::{
    routing::{get, post, put},
    Router,
};
use crate::handlers::medicine::{
    create_medicine, delete_medicine, expiry_alerts, get_medicine, list_medicines, low_stock,
    update_medicine,
};
use crate::middleware::auth::{require_auth, require_owner};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    // Reads are open to all authenticated users (staff need stock levels at
    // the counter); writes are owner-only inventory management.
    let reads = Router::new()
        .route("/medicines", get(list_medicines))
        .route("/medicines/low-stock", get(low_stock))
        .route("/medicines/expiry-alerts", get(expiry_alerts))
        .route("/medicines/{id}", get(get_medicine))
        .route_layer(axum::middleware::from_fn(require_auth));

    let writes = Router::new()
        .route("/medicines", post(create_medicine))
        .route("/medicines/{id}", put(update_medicine).delete(delete_medicine))
        .route_layer(axum::middleware::from_fn(require_owner))
        .route_layer(axum::middleware::from_fn(require_auth));

    reads.merge(writes)
}
