// src/handlers/report.rs
//
// Read-only rollups over the sale ledger. These trust the totalAmount and
// profitAmount stored on each sale and only aggregate; the figures are
// computed once, at sale time, by the transaction processor.
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Months, NaiveDate, TimeZone, Utc};
use tracing::instrument;

use crate::dtos::report::{DateRangeQuery, MonthlySummary, PeriodSummary, TopSellingMedicine};
use crate::error::AppError;
use crate::state::AppState;

// GET /reports/profit?startDate&endDate - owner-only
#[instrument(skip(db_pool))]
pub async fn profit_report(
    State(AppState { db_pool }): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<PeriodSummary>, AppError> {
    let start = range.start_date.map(start_of_day);
    let end = range.end_date.map(end_of_day);

    let summary = sqlx::query_as::<_, PeriodSummary>(
        "SELECT COALESCE(SUM(total_amount), 0)::FLOAT8  AS total_revenue,
                COALESCE(SUM(profit_amount), 0)::FLOAT8 AS total_profit,
                COUNT(*)                                AS sales_count
         FROM sales
         WHERE ($1::TIMESTAMPTZ IS NULL OR sale_date >= $1)
           AND ($2::TIMESTAMPTZ IS NULL OR sale_date <= $2)",
    )
    .bind(start)
    .bind(end)
    .fetch_one(&db_pool)
    .await?;

    Ok(Json(summary))
}

// GET /reports/top-selling - top 5 medicines by quantity sold, owner-only
#[instrument(skip(db_pool))]
pub async fn top_selling(
    State(AppState { db_pool }): State<AppState>,
) -> Result<Json<Vec<TopSellingMedicine>>, AppError> {
    let top = sqlx::query_as::<_, TopSellingMedicine>(
        "SELECT si.medicine_id,
                MAX(si.name)                                   AS name,
                SUM(si.quantity)::BIGINT                       AS total_quantity,
                SUM(si.quantity * si.price_at_sale)::FLOAT8    AS total_revenue
         FROM sale_items si
         GROUP BY si.medicine_id
         ORDER BY total_quantity DESC
         LIMIT 5",
    )
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(top))
}

// GET /reports/monthly-summary - last six months grouped by month, owner-only
#[instrument(skip(db_pool))]
pub async fn monthly_summary(
    State(AppState { db_pool }): State<AppState>,
) -> Result<Json<Vec<MonthlySummary>>, AppError> {
    let now = Utc::now();
    let since = now.checked_sub_months(Months::new(6)).unwrap_or(now);

    let summaries = sqlx::query_as::<_, MonthlySummary>(
        "SELECT EXTRACT(YEAR FROM sale_date)::INT4  AS year,
                EXTRACT(MONTH FROM sale_date)::INT4 AS month,
                SUM(total_amount)::FLOAT8           AS total_revenue,
                SUM(profit_amount)::FLOAT8          AS total_profit,
                COUNT(*)                            AS sales_count
         FROM sales
         WHERE sale_date >= $1
         GROUP BY 1, 2
         ORDER BY 1, 2",
    )
    .bind(since)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(summaries))
}

fn start_of_day(date: NaiveDate) -> chrono::DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

fn end_of_day(date: NaiveDate) -> chrono::DateTime<Utc> {
    start_of_day(date) + chrono::Duration::seconds(86_399)
}
