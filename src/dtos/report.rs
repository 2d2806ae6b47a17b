// src/dtos/report.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}

/// Revenue/profit rollup over a period. Sums the already-computed amounts
/// stored on each sale; nothing is rederived from line items.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub total_revenue: f64,
    pub total_profit: f64,
    pub sales_count: i64,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopSellingMedicine {
    pub medicine_id: i64,
    pub name: String,
    pub total_quantity: i64,
    pub total_revenue: f64,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub year: i32,
    pub month: i32,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub sales_count: i64,
}
