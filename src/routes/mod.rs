pub mod auth;
pub mod contact;
pub mod medicines;
pub mod purchases;
pub mod reports;
pub mod sales;
pub mod suppliers;

use axum::Router;
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(medicines::routes())
        .merge(suppliers::routes())
        .merge(sales::routes())
        .merge(purchases::routes())
        .merge(reports::routes())
        .merge(contact::routes())
}
