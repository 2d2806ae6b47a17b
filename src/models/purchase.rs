use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Purchase header joined with its supplier's display fields.
#[derive(Debug, FromRow)]
pub struct PurchaseRow {
    pub id: i64,
    pub supplier_id: i64,
    pub supplier_name: String,
    pub supplier_phone: String,
    pub total_cost: f64,
    pub purchase_date: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct PurchaseItemRow {
    pub purchase_id: i64,
    pub name: String,
    pub batch_number: String,
    pub quantity: i32,
    pub purchase_price: f64,
    pub expiry_date: NaiveDate,
}
