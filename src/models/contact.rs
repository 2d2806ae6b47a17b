use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub message: String,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
}
