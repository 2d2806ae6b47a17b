// src/dtos/sale.rs
//
// Wire format is camelCase, matching the original pharmacy API clients.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::sale::{Sale, SaleHeaderRow, SaleItemRow, SaleLine};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineRequest {
    pub medicine_id: i64,
    pub quantity: i32,
    pub price_at_sale: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub medicines: Vec<SaleLineRequest>,
    pub total_amount: f64,
    pub discount: Option<f64>,
    /// Parsed into `PaymentMode` by the processor so a bad value is a
    /// field-level validation error, not a body-decode failure.
    pub payment_mode: String,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineResponse {
    pub medicine_id: i64,
    pub name: String,
    pub quantity: i32,
    pub price_at_sale: f64,
    pub purchase_price: f64,
}

impl From<SaleLine> for SaleLineResponse {
    fn from(line: SaleLine) -> Self {
        Self {
            medicine_id: line.medicine_id,
            name: line.name,
            quantity: line.quantity,
            price_at_sale: line.price_at_sale,
            purchase_price: line.purchase_price,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedByResponse {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    pub id: i64,
    pub medicines: Vec<SaleLineResponse>,
    pub total_amount: f64,
    pub discount: f64,
    pub payment_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_phone: Option<String>,
    pub profit_amount: f64,
    pub created_by: CreatedByResponse,
    pub date: DateTime<Utc>,
}

impl SaleResponse {
    pub fn from_sale(sale: Sale, created_by_name: String) -> Self {
        Self {
            id: sale.id,
            medicines: sale.lines.into_iter().map(SaleLineResponse::from).collect(),
            total_amount: sale.total_amount,
            discount: sale.discount,
            payment_mode: sale.payment_mode.as_str().to_string(),
            buyer_name: sale.buyer_name,
            buyer_phone: sale.buyer_phone,
            profit_amount: sale.profit_amount,
            created_by: CreatedByResponse { id: sale.created_by, name: created_by_name },
            date: sale.date,
        }
    }

    pub fn from_rows(header: SaleHeaderRow, items: Vec<SaleItemRow>) -> Self {
        Self {
            id: header.id,
            medicines: items
                .into_iter()
                .map(|item| SaleLineResponse {
                    medicine_id: item.medicine_id,
                    name: item.name,
                    quantity: item.quantity,
                    price_at_sale: item.price_at_sale,
                    purchase_price: item.purchase_price,
                })
                .collect(),
            total_amount: header.total_amount,
            discount: header.discount,
            payment_mode: header.payment_mode,
            buyer_name: header.buyer_name,
            buyer_phone: header.buyer_phone,
            profit_amount: header.profit_amount,
            created_by: CreatedByResponse { id: header.created_by, name: header.created_by_name },
            date: header.sale_date,
        }
    }
}
