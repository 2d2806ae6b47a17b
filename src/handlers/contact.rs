use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;

use crate::dtos::contact::{ContactResponse, CreateContactRequest, UpdateContactStatusRequest};
use crate::error::AppError;
use crate::models::contact::Contact;
use crate::state::AppState;

const CONTACT_STATUSES: [&str; 3] = ["new", "read", "resolved"];

// POST /contact - public enquiry form
#[instrument(skip(db_pool, payload))]
pub async fn create_contact(
    State(AppState { db_pool }): State<AppState>,
    Json(payload): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    if payload.phone.trim().is_empty() {
        return Err(AppError::validation("Phone is required"));
    }
    if payload.message.trim().is_empty() {
        return Err(AppError::validation("Message is required"));
    }

    let contact = sqlx::query_as::<_, Contact>(
        "INSERT INTO contacts (name, phone, message)
         VALUES ($1, $2, $3)
         RETURNING id, name, phone, message, status, created_at",
    )
    .bind(payload.name.trim())
    .bind(payload.phone.trim())
    .bind(payload.message.trim())
    .fetch_one(&db_pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Your message has been sent successfully. We will contact you soon.",
            "contact": ContactResponse::from(contact),
        })),
    ))
}

// GET /contact - owner-only inbox
#[instrument(skip(db_pool))]
pub async fn list_contacts(
    State(AppState { db_pool }): State<AppState>,
) -> Result<Json<Vec<ContactResponse>>, AppError> {
    let contacts = sqlx::query_as::<_, Contact>(
        "SELECT id, name, phone, message, status, created_at
         FROM contacts
         ORDER BY created_at DESC",
    )
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(contacts.into_iter().map(ContactResponse::from).collect()))
}

// PATCH /contact/{id}/status - owner-only
#[instrument(skip(db_pool, payload))]
pub async fn update_contact_status(
    State(AppState { db_pool }): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateContactStatusRequest>,
) -> Result<Json<ContactResponse>, AppError> {
    if !CONTACT_STATUSES.contains(&payload.status.as_str()) {
        return Err(AppError::validation("status must be one of: new, read, resolved"));
    }

    let contact = sqlx::query_as::<_, Contact>(
        "UPDATE contacts SET status = $2
         WHERE id = $1
         RETURNING id, name, phone, message, status, created_at",
    )
    .bind(id)
    .bind(&payload.status)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Contact not found"))?;

    Ok(Json(ContactResponse::from(contact)))
}
