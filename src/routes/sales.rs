use axum::{routing::get, Router};
use crate::handlers::sale;
use crate::middleware::auth::{require_auth, require_owner};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    // Any authenticated actor may record and list sales; the rollups are
    // owner-only.
    let counter = Router::new()
        .route("/sales", get(sale::list_sales).post(sale::create_sale))
        .route_layer(axum::middleware::from_fn(require_auth));

    let rollups = Router::new()
        .route("/sales/daily", get(sale::daily_summary))
        .route("/sales/monthly", get(sale::monthly_summary))
        .route_layer(axum::middleware::from_fn(require_owner))
        .route_layer(axum::middleware::from_fn(require_auth));

    counter.merge(rollups)
}
