// src/dtos/supplier.rs
use serde::{Deserialize, Serialize};

use crate::models::supplier::Supplier;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierRequest {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub gst_number: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierResponse {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_number: Option<String>,
    pub created_at: Option<String>,
}

impl From<Supplier> for SupplierResponse {
    fn from(s: Supplier) -> Self {
        Self {
            id: s.id,
            name: s.name,
            phone: s.phone,
            address: s.address,
            gst_number: s.gst_number,
            created_at: s.created_at.map(|dt| dt.to_rfc3339()),
        }
    }
}
