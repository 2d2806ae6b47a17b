pub mod pg;

use crate::error::AppError;
use crate::models::medicine::Medicine;
use crate::models::sale::{NewSale, Sale};

/// Inventory collaborator consumed by the sale transaction processor.
///
/// `decrement_if_available` is the serialization point for concurrent sales
/// against the same medicine: the check and the decrement must be one atomic
/// step so stock can never be driven negative.
#[allow(async_fn_in_trait)]
pub trait MedicineStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Medicine>, AppError>;

    /// Decrements stock by `qty` only if at least `qty` remains. Returns
    /// `false` (without mutating anything) when stock is insufficient or the
    /// medicine does not exist.
    async fn decrement_if_available(&self, id: i64, qty: i32) -> Result<bool, AppError>;

    /// Adds `qty` back. Only used to compensate decrements of a sale that
    /// failed on a later step.
    async fn restock(&self, id: i64, qty: i32) -> Result<(), AppError>;
}

/// Append-only sale ledger; persisted sales are never updated or deleted.
#[allow(async_fn_in_trait)]
pub trait SaleLedger {
    async fn append(&self, sale: NewSale) -> Result<Sale, AppError>;
}
