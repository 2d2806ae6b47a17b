use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Accepted payment modes. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    Cash,
    Upi,
    Card,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "cash",
            PaymentMode::Upi => "upi",
            PaymentMode::Card => "card",
        }
    }
}

impl FromStr for PaymentMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMode::Cash),
            "upi" => Ok(PaymentMode::Upi),
            "card" => Ok(PaymentMode::Card),
            _ => Err(()),
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a sale, with the medicine's name and cost price frozen at
/// sale time. Later edits to the medicine do not touch persisted lines.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleLine {
    pub medicine_id: i64,
    pub name: String,
    pub quantity: i32,
    pub price_at_sale: f64,
    pub purchase_price: f64,
}

/// A sale ready to be appended to the ledger. `profit_amount` is computed by
/// the transaction processor, never accepted from the caller.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub lines: Vec<SaleLine>,
    pub total_amount: f64,
    pub discount: f64,
    pub payment_mode: PaymentMode,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
    pub profit_amount: f64,
    pub created_by: i64,
    pub date: DateTime<Utc>,
}

/// A persisted sale. Immutable: the ledger exposes no update or delete.
#[derive(Debug, Clone)]
pub struct Sale {
    pub id: i64,
    pub lines: Vec<SaleLine>,
    pub total_amount: f64,
    pub discount: f64,
    pub payment_mode: PaymentMode,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
    pub profit_amount: f64,
    pub created_by: i64,
    pub date: DateTime<Utc>,
}

/// Sale header row joined with the creating user, for listings.
#[derive(Debug, FromRow)]
pub struct SaleHeaderRow {
    pub id: i64,
    pub total_amount: f64,
    pub discount: f64,
    pub payment_mode: String,
    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,
    pub profit_amount: f64,
    pub created_by: i64,
    pub created_by_name: String,
    pub sale_date: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct SaleItemRow {
    pub sale_id: i64,
    pub medicine_id: i64,
    pub name: String,
    pub quantity: i32,
    pub price_at_sale: f64,
    pub purchase_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_mode_parses_known_values() {
        assert_eq!("cash".parse::<PaymentMode>(), Ok(PaymentMode::Cash));
        assert_eq!("upi".parse::<PaymentMode>(), Ok(PaymentMode::Upi));
        assert_eq!("card".parse::<PaymentMode>(), Ok(PaymentMode::Card));
        assert!("cheque".parse::<PaymentMode>().is_err());
        assert!("CASH".parse::<PaymentMode>().is_err());
    }

    #[test]
    fn payment_mode_round_trips_through_str() {
        for mode in [PaymentMode::Cash, PaymentMode::Upi, PaymentMode::Card] {
            assert_eq!(mode.as_str().parse::<PaymentMode>(), Ok(mode));
        }
    }
}
