use axum::{extract::State, http::StatusCode, Json};
use tracing::instrument;

use crate::dtos::supplier::{CreateSupplierRequest, SupplierResponse};
use crate::error::AppError;
use crate::models::supplier::Supplier;
use crate::state::AppState;

// GET /suppliers
#[instrument(skip(db_pool))]
pub async fn list_suppliers(
    State(AppState { db_pool }): State<AppState>,
) -> Result<Json<Vec<SupplierResponse>>, AppError> {
    let suppliers = sqlx::query_as::<_, Supplier>(
        "SELECT id, name, phone, address, gst_number, created_at
         FROM suppliers
         ORDER BY created_at DESC",
    )
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(suppliers.into_iter().map(SupplierResponse::from).collect()))
}

// POST /suppliers - owner-only
#[instrument(skip(db_pool, payload))]
pub async fn create_supplier(
    State(AppState { db_pool }): State<AppState>,
    Json(payload): Json<CreateSupplierRequest>,
) -> Result<(StatusCode, Json<SupplierResponse>), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Supplier name is required"));
    }
    if payload.phone.trim().is_empty() {
        return Err(AppError::validation("Phone is required"));
    }
    if payload.address.trim().is_empty() {
        return Err(AppError::validation("Address is required"));
    }

    let supplier = sqlx::query_as::<_, Supplier>(
        "INSERT INTO suppliers (name, phone, address, gst_number)
         VALUES ($1, $2, $3, $4)
         RETURNING id, name, phone, address, gst_number, created_at",
    )
    .bind(payload.name.trim())
    .bind(payload.phone.trim())
    .bind(payload.address.trim())
    .bind(payload.gst_number)
    .fetch_one(&db_pool)
    .await?;

    Ok((StatusCode::CREATED, Json(SupplierResponse::from(supplier))))
}
