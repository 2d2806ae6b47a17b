use axum::{extract::State, http::StatusCode, Json};
use std::collections::HashMap;
use tracing::instrument;

use crate::dtos::purchase::{
    CreatePurchaseRequest, PurchaseLineResponse, PurchaseResponse, PurchaseSupplierRef,
};
use crate::error::AppError;
use crate::models::purchase::{PurchaseItemRow, PurchaseRow};
use crate::state::AppState;

// POST /purchases - owner-only. Records an incoming stock purchase from a
// supplier as an append-only document; inventory adjustments go through the
// medicine endpoints.
#[instrument(skip(db_pool, payload))]
pub async fn create_purchase(
    State(AppState { db_pool }): State<AppState>,
    Json(payload): Json<CreatePurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseResponse>), AppError> {
    if payload.medicines.is_empty() {
        return Err(AppError::validation("At least one medicine is required"));
    }
    if payload.total_cost < 0.0 {
        return Err(AppError::validation("totalCost must not be negative"));
    }
    for line in &payload.medicines {
        if line.quantity < 1 {
            return Err(AppError::validation("quantity must be at least 1"));
        }
        if line.purchase_price < 0.0 {
            return Err(AppError::validation("purchasePrice must not be negative"));
        }
    }

    let mut tx = db_pool.begin().await?;

    let supplier: (i64, String, String) =
        sqlx::query_as("SELECT id, name, phone FROM suppliers WHERE id = $1")
            .bind(payload.supplier_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found("Supplier not found"))?;

    let (purchase_id, purchase_date): (i64, chrono::DateTime<chrono::Utc>) = sqlx::query_as(
        "INSERT INTO purchases (supplier_id, total_cost)
         VALUES ($1, $2)
         RETURNING id, purchase_date",
    )
    .bind(payload.supplier_id)
    .bind(payload.total_cost)
    .fetch_one(&mut *tx)
    .await?;

    for line in &payload.medicines {
        sqlx::query(
            "INSERT INTO purchase_items
                 (purchase_id, name, batch_number, quantity, purchase_price, expiry_date)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(purchase_id)
        .bind(&line.name)
        .bind(&line.batch_number)
        .bind(line.quantity)
        .bind(line.purchase_price)
        .bind(line.expiry_date)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(PurchaseResponse {
            id: purchase_id,
            supplier: PurchaseSupplierRef { id: supplier.0, name: supplier.1, phone: supplier.2 },
            medicines: payload
                .medicines
                .into_iter()
                .map(|line| PurchaseLineResponse {
                    name: line.name,
                    batch_number: line.batch_number,
                    quantity: line.quantity,
                    purchase_price: line.purchase_price,
                    expiry_date: line.expiry_date,
                })
                .collect(),
            total_cost: payload.total_cost,
            date: purchase_date,
        }),
    ))
}

// GET /purchases - owner-only, latest 100
#[instrument(skip(db_pool))]
pub async fn list_purchases(
    State(AppState { db_pool }): State<AppState>,
) -> Result<Json<Vec<PurchaseResponse>>, AppError> {
    let headers = sqlx::query_as::<_, PurchaseRow>(
        "SELECT p.id, p.supplier_id, s.name AS supplier_name, s.phone AS supplier_phone,
                p.total_cost, p.purchase_date
         FROM purchases p
         JOIN suppliers s ON p.supplier_id = s.id
         ORDER BY p.purchase_date DESC, p.id DESC
         LIMIT 100",
    )
    .fetch_all(&db_pool)
    .await?;

    if headers.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let purchase_ids: Vec<i64> = headers.iter().map(|h| h.id).collect();
    let items = sqlx::query_as::<_, PurchaseItemRow>(
        "SELECT purchase_id, name, batch_number, quantity, purchase_price, expiry_date
         FROM purchase_items
         WHERE purchase_id = ANY($1)
         ORDER BY id",
    )
    .bind(&purchase_ids)
    .fetch_all(&db_pool)
    .await?;

    let mut items_by_purchase: HashMap<i64, Vec<PurchaseItemRow>> = HashMap::new();
    for item in items {
        items_by_purchase.entry(item.purchase_id).or_default().push(item);
    }

    Ok(Json(
        headers
            .into_iter()
            .map(|header| PurchaseResponse {
                id: header.id,
                supplier: PurchaseSupplierRef {
                    id: header.supplier_id,
                    name: header.supplier_name,
                    phone: header.supplier_phone,
                },
                medicines: items_by_purchase
                    .remove(&header.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|item| PurchaseLineResponse {
                        name: item.name,
                        batch_number: item.batch_number,
                        quantity: item.quantity,
                        purchase_price: item.purchase_price,
                        expiry_date: item.expiry_date,
                    })
                    .collect(),
                total_cost: header.total_cost,
                date: header.purchase_date,
            })
            .collect(),
    ))
}
