use axum::{
    routing::{get, patch, post},
    Router,
};
use crate::handlers::contact::{create_contact, list_contacts, update_contact_status};
use crate::middleware::auth::{require_auth, require_owner};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    // The enquiry form is public; reading and triaging the inbox is not.
    let public = Router::new().route("/contact", post(create_contact));

    let owner = Router::new()
        .route("/contact", get(list_contacts))
        .route("/contact/{id}/status", patch(update_contact_status))
        .route_layer(axum::middleware::from_fn(require_owner))
        .route_layer(axum::middleware::from_fn(require_auth));

    public.merge(owner)
}
