use axum::{extract::{Query, State}, http::StatusCode, Extension, Json};
use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use tracing::instrument;

use crate::dtos::report::{DateRangeQuery, PeriodSummary};
use crate::dtos::sale::{CreateSaleRequest, SaleResponse};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::sale::{SaleHeaderRow, SaleItemRow};
use crate::services;
use crate::state::AppState;
use crate::stores::pg::{PgMedicineStore, PgSaleLedger};

// POST /sales - record a checkout. Open to any authenticated actor; staff
// record sales at the counter.
#[instrument(skip(db_pool, auth, req), fields(user_id = auth.user_id))]
pub async fn create_sale(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<SaleResponse>), AppError> {
    let store = PgMedicineStore::new(db_pool.clone());
    let ledger = PgSaleLedger::new(db_pool);

    let sale = services::sales::create_sale(&store, &ledger, req, &auth).await?;

    Ok((StatusCode::CREATED, Json(SaleResponse::from_sale(sale, auth.name))))
}

// GET /sales - list recent sales, newest first, capped at 100. Staff only
// see their own sales from today; owners see everything.
#[instrument(skip(db_pool, auth))]
pub async fn list_sales(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<Vec<SaleResponse>>, AppError> {
    let mut start = range.start_date.map(start_of_day);
    let end = range.end_date.map(end_of_day);
    let mut created_by_filter: Option<i64> = None;

    if !auth.is_owner() {
        created_by_filter = Some(auth.user_id);
        if start.is_none() {
            start = Some(start_of_day(Utc::now().date_naive()));
        }
    }

    let headers = sqlx::query_as::<_, SaleHeaderRow>(
        "SELECT s.id, s.total_amount, s.discount, s.payment_mode, s.buyer_name,
                s.buyer_phone, s.profit_amount, s.created_by,
                u.name AS created_by_name, s.sale_date
         FROM sales s
         JOIN users u ON s.created_by = u.id
         WHERE ($1::TIMESTAMPTZ IS NULL OR s.sale_date >= $1)
           AND ($2::TIMESTAMPTZ IS NULL OR s.sale_date <= $2)
           AND ($3::BIGINT IS NULL OR s.created_by = $3)
         ORDER BY s.sale_date DESC, s.id DESC
         LIMIT 100",
    )
    .bind(start)
    .bind(end)
    .bind(created_by_filter)
    .fetch_all(&db_pool)
    .await?;

    if headers.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let sale_ids: Vec<i64> = headers.iter().map(|h| h.id).collect();
    let items = sqlx::query_as::<_, SaleItemRow>(
        "SELECT sale_id, medicine_id, name, quantity, price_at_sale, purchase_price
         FROM sale_items
         WHERE sale_id = ANY($1)
         ORDER BY id",
    )
    .bind(&sale_ids)
    .fetch_all(&db_pool)
    .await?;

    let mut items_by_sale: HashMap<i64, Vec<SaleItemRow>> = HashMap::new();
    for item in items {
        items_by_sale.entry(item.sale_id).or_default().push(item);
    }

    Ok(Json(
        headers
            .into_iter()
            .map(|header| {
                let items = items_by_sale.remove(&header.id).unwrap_or_default();
                SaleResponse::from_rows(header, items)
            })
            .collect(),
    ))
}

// GET /sales/daily - today's rollup. Owner-only (gated at the route).
#[instrument(skip(db_pool))]
pub async fn daily_summary(
    State(AppState { db_pool }): State<AppState>,
) -> Result<Json<PeriodSummary>, AppError> {
    let since = start_of_day(Utc::now().date_naive());
    summarize_since(&db_pool, since).await.map(Json)
}

// GET /sales/monthly - current month's rollup. Owner-only.
#[instrument(skip(db_pool))]
pub async fn monthly_summary(
    State(AppState { db_pool }): State<AppState>,
) -> Result<Json<PeriodSummary>, AppError> {
    let today = Utc::now().date_naive();
    let first = today.with_day(1).unwrap_or(today);
    summarize_since(&db_pool, start_of_day(first)).await.map(Json)
}

async fn summarize_since(
    db_pool: &sqlx::PgPool,
    since: chrono::DateTime<Utc>,
) -> Result<PeriodSummary, AppError> {
    let summary = sqlx::query_as::<_, PeriodSummary>(
        "SELECT COALESCE(SUM(total_amount), 0)::FLOAT8  AS total_revenue,
                COALESCE(SUM(profit_amount), 0)::FLOAT8 AS total_profit,
                COUNT(*)                                AS sales_count
         FROM sales
         WHERE sale_date >= $1",
    )
    .bind(since)
    .fetch_one(db_pool)
    .await?;

    Ok(summary)
}

fn start_of_day(date: NaiveDate) -> chrono::DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

fn end_of_day(date: NaiveDate) -> chrono::DateTime<Utc> {
    start_of_day(date) + chrono::Duration::seconds(86_399)
}
