use axum::{
    routing::{get, post},
    Router,
};
use crate::handlers::user;
use crate::middleware::auth::{require_auth, require_owner};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let public = Router::new().route("/auth/login", post(user::login_user));

    let authed = Router::new()
        .route("/auth/me", get(user::get_me))
        .route_layer(axum::middleware::from_fn(require_auth));

    // Staff accounts are provisioned by the owner
    let owner = Router::new()
        .route("/auth/register", post(user::register_user))
        .route_layer(axum::middleware::from_fn(require_owner))
        .route_layer(axum::middleware::from_fn(require_auth));

    public.merge(authed).merge(owner)
}
