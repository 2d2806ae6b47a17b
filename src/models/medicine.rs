use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Medicine {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    pub quantity: i32,
    pub purchase_price: f64,
    pub selling_price: f64,
    pub low_stock_threshold: i32,
    pub supplier_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Medicine joined with its supplier's display fields.
#[derive(Debug, FromRow)]
pub struct MedicineWithSupplier {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    pub quantity: i32,
    pub purchase_price: f64,
    pub selling_price: f64,
    pub low_stock_threshold: i32,
    pub supplier_id: Option<i64>,
    pub supplier_name: Option<String>,
    pub supplier_phone: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
