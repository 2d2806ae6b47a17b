// src/dtos/medicine.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::medicine::MedicineWithSupplier;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMedicineRequest {
    pub name: String,
    pub category: String,
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    pub quantity: i32,
    pub purchase_price: f64,
    pub selling_price: f64,
    pub low_stock_threshold: Option<i32>,
    pub supplier_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMedicineRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub quantity: Option<i32>,
    pub purchase_price: Option<f64>,
    pub selling_price: Option<f64>,
    pub low_stock_threshold: Option<i32>,
    pub supplier_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRef {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineResponse {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub batch_number: String,
    pub expiry_date: NaiveDate,
    pub quantity: i32,
    pub purchase_price: f64,
    pub selling_price: f64,
    pub low_stock_threshold: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<SupplierRef>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<MedicineWithSupplier> for MedicineResponse {
    fn from(m: MedicineWithSupplier) -> Self {
        let supplier = match (m.supplier_id, m.supplier_name) {
            (Some(id), Some(name)) => Some(SupplierRef { id, name, phone: m.supplier_phone }),
            _ => None,
        };
        Self {
            id: m.id,
            name: m.name,
            category: m.category,
            batch_number: m.batch_number,
            expiry_date: m.expiry_date,
            quantity: m.quantity,
            purchase_price: m.purchase_price,
            selling_price: m.selling_price,
            low_stock_threshold: m.low_stock_threshold,
            supplier,
            created_at: m.created_at.map(|dt| dt.to_rfc3339()),
            updated_at: m.updated_at.map(|dt| dt.to_rfc3339()),
        }
    }
}
