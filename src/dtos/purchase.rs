// src/dtos/purchase.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLineRequest {
    pub name: String,
    pub batch_number: String,
    pub quantity: i32,
    pub purchase_price: f64,
    pub expiry_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseRequest {
    pub supplier_id: i64,
    pub medicines: Vec<PurchaseLineRequest>,
    pub total_cost: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLineResponse {
    pub name: String,
    pub batch_number: String,
    pub quantity: i32,
    pub purchase_price: f64,
    pub expiry_date: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSupplierRef {
    pub id: i64,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub id: i64,
    pub supplier: PurchaseSupplierRef,
    pub medicines: Vec<PurchaseLineResponse>,
    pub total_cost: f64,
    pub date: DateTime<Utc>,
}
