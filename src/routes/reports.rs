use axum::{routing::get, Router};
use crate::handlers::report::{monthly_summary, profit_report, top_selling};
use crate::middleware::auth::{require_auth, require_owner};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/profit", get(profit_report))
        .route("/reports/top-selling", get(top_selling))
        .route("/reports/monthly-summary", get(monthly_summary))
        .route_layer(axum::middleware::from_fn(require_owner))
        .route_layer(axum::middleware::from_fn(require_auth))
}
