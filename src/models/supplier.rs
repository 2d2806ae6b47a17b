use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub gst_number: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
