use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use sqlx::{Error as SqlxError, PgPool};
use tracing::instrument;

use crate::dtos::medicine::{
    CreateMedicineRequest, MedicineListQuery, MedicineResponse, UpdateMedicineRequest,
};
use crate::error::AppError;
use crate::models::medicine::MedicineWithSupplier;
use crate::state::AppState;

const MEDICINE_SELECT: &str =
    "SELECT m.id, m.name, m.category, m.batch_number, m.expiry_date, m.quantity,
            m.purchase_price, m.selling_price, m.low_stock_threshold, m.supplier_id,
            s.name AS supplier_name, s.phone AS supplier_phone,
            m.created_at, m.updated_at
     FROM medicines m
     LEFT JOIN suppliers s ON m.supplier_id = s.id";

fn map_supplier_fk(err: SqlxError) -> AppError {
    match err {
        SqlxError::Database(db_err) if db_err.code().as_deref() == Some("23503") => {
            AppError::validation("supplierId does not reference an existing supplier")
        }
        other => other.into(),
    }
}

async fn fetch_medicine(db_pool: &PgPool, id: i64) -> Result<MedicineResponse, AppError> {
    let medicine = sqlx::query_as::<_, MedicineWithSupplier>(&format!(
        "{MEDICINE_SELECT} WHERE m.id = $1"
    ))
    .bind(id)
    .fetch_optional(db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Medicine not found"))?;

    Ok(MedicineResponse::from(medicine))
}

// GET /medicines - list with optional name/batch search and category filter
#[instrument(skip(db_pool))]
pub async fn list_medicines(
    State(AppState { db_pool }): State<AppState>,
    Query(params): Query<MedicineListQuery>,
) -> Result<Json<Vec<MedicineResponse>>, AppError> {
    let medicines = sqlx::query_as::<_, MedicineWithSupplier>(&format!(
        "{MEDICINE_SELECT}
         WHERE ($1::TEXT IS NULL OR m.name ILIKE '%' || $1 || '%'
                               OR m.batch_number ILIKE '%' || $1 || '%')
           AND ($2::TEXT IS NULL OR m.category = $2)
         ORDER BY m.created_at DESC"
    ))
    .bind(params.search)
    .bind(params.category)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(medicines.into_iter().map(MedicineResponse::from).collect()))
}

// GET /medicines/{id}
#[instrument(skip(db_pool))]
pub async fn get_medicine(
    State(AppState { db_pool }): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MedicineResponse>, AppError> {
    fetch_medicine(&db_pool, id).await.map(Json)
}

// GET /medicines/low-stock - stock at or below the per-medicine threshold
#[instrument(skip(db_pool))]
pub async fn low_stock(
    State(AppState { db_pool }): State<AppState>,
) -> Result<Json<Vec<MedicineResponse>>, AppError> {
    let medicines = sqlx::query_as::<_, MedicineWithSupplier>(&format!(
        "{MEDICINE_SELECT} WHERE m.quantity <= m.low_stock_threshold ORDER BY m.quantity ASC"
    ))
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(medicines.into_iter().map(MedicineResponse::from).collect()))
}

// GET /medicines/expiry-alerts - expiring within the next 30 days
#[instrument(skip(db_pool))]
pub async fn expiry_alerts(
    State(AppState { db_pool }): State<AppState>,
) -> Result<Json<Vec<MedicineResponse>>, AppError> {
    let today = Utc::now().date_naive();
    let cutoff = today + Duration::days(30);

    let medicines = sqlx::query_as::<_, MedicineWithSupplier>(&format!(
        "{MEDICINE_SELECT}
         WHERE m.expiry_date >= $1 AND m.expiry_date <= $2
         ORDER BY m.expiry_date ASC"
    ))
    .bind(today)
    .bind(cutoff)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(medicines.into_iter().map(MedicineResponse::from).collect()))
}

// POST /medicines - owner-only
#[instrument(skip(db_pool, payload))]
pub async fn create_medicine(
    State(AppState { db_pool }): State<AppState>,
    Json(payload): Json<CreateMedicineRequest>,
) -> Result<(StatusCode, Json<MedicineResponse>), AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Medicine name is required"));
    }
    if payload.quantity < 0 {
        return Err(AppError::validation("quantity must not be negative"));
    }
    if payload.purchase_price < 0.0 || payload.selling_price < 0.0 {
        return Err(AppError::validation("prices must not be negative"));
    }

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO medicines
             (name, category, batch_number, expiry_date, quantity,
              purchase_price, selling_price, low_stock_threshold, supplier_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING id",
    )
    .bind(payload.name.trim())
    .bind(&payload.category)
    .bind(&payload.batch_number)
    .bind(payload.expiry_date)
    .bind(payload.quantity)
    .bind(payload.purchase_price)
    .bind(payload.selling_price)
    .bind(payload.low_stock_threshold.unwrap_or(10))
    .bind(payload.supplier_id)
    .fetch_one(&db_pool)
    .await
    .map_err(map_supplier_fk)?;

    let medicine = fetch_medicine(&db_pool, id).await?;
    Ok((StatusCode::CREATED, Json(medicine)))
}

// PUT /medicines/{id} - owner-only
#[instrument(skip(db_pool, payload))]
pub async fn update_medicine(
    State(AppState { db_pool }): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateMedicineRequest>,
) -> Result<Json<MedicineResponse>, AppError> {
    if matches!(payload.quantity, Some(q) if q < 0) {
        return Err(AppError::validation("quantity must not be negative"));
    }
    if matches!(payload.purchase_price, Some(p) if p < 0.0)
        || matches!(payload.selling_price, Some(p) if p < 0.0)
    {
        return Err(AppError::validation("prices must not be negative"));
    }

    let updated = sqlx::query(
        "UPDATE medicines SET
             name = COALESCE($1, name),
             category = COALESCE($2, category),
             batch_number = COALESCE($3, batch_number),
             expiry_date = COALESCE($4, expiry_date),
             quantity = COALESCE($5, quantity),
             purchase_price = COALESCE($6, purchase_price),
             selling_price = COALESCE($7, selling_price),
             low_stock_threshold = COALESCE($8, low_stock_threshold),
             supplier_id = COALESCE($9, supplier_id),
             updated_at = NOW()
         WHERE id = $10",
    )
    .bind(payload.name)
    .bind(payload.category)
    .bind(payload.batch_number)
    .bind(payload.expiry_date)
    .bind(payload.quantity)
    .bind(payload.purchase_price)
    .bind(payload.selling_price)
    .bind(payload.low_stock_threshold)
    .bind(payload.supplier_id)
    .bind(id)
    .execute(&db_pool)
    .await
    .map_err(map_supplier_fk)?;

    if updated.rows_affected() == 0 {
        return Err(AppError::not_found("Medicine not found"));
    }

    fetch_medicine(&db_pool, id).await.map(Json)
}

// DELETE /medicines/{id} - owner-only
#[instrument(skip(db_pool))]
pub async fn delete_medicine(
    State(AppState { db_pool }): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = sqlx::query("DELETE FROM medicines WHERE id = $1")
        .bind(id)
        .execute(&db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Medicine not found"));
    }

    Ok(Json(serde_json::json!({ "message": "Medicine deleted successfully" })))
}
