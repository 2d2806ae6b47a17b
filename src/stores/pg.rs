use sqlx::PgPool;

use crate::error::AppError;
use crate::models::medicine::Medicine;
use crate::models::sale::{NewSale, Sale};
use super::{MedicineStore, SaleLedger};

const MEDICINE_COLUMNS: &str =
    "id, name, category, batch_number, expiry_date, quantity, purchase_price, \
     selling_price, low_stock_threshold, supplier_id, created_at, updated_at";

#[derive(Clone)]
pub struct PgMedicineStore {
    pool: PgPool,
}

impl PgMedicineStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl MedicineStore for PgMedicineStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Medicine>, AppError> {
        let medicine = sqlx::query_as::<_, Medicine>(&format!(
            "SELECT {MEDICINE_COLUMNS} FROM medicines WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(medicine)
    }

    async fn decrement_if_available(&self, id: i64, qty: i32) -> Result<bool, AppError> {
        // Conditional update: the WHERE clause makes check-and-decrement a
        // single atomic statement, so two concurrent sales of the same
        // medicine serialize at the row and the loser sees zero rows affected.
        let result = sqlx::query(
            "UPDATE medicines
             SET quantity = quantity - $2, updated_at = NOW()
             WHERE id = $1 AND quantity >= $2",
        )
        .bind(id)
        .bind(qty)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn restock(&self, id: i64, qty: i32) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE medicines SET quantity = quantity + $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(qty)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct PgSaleLedger {
    pool: PgPool,
}

impl PgSaleLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SaleLedger for PgSaleLedger {
    async fn append(&self, sale: NewSale) -> Result<Sale, AppError> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO sales
                 (total_amount, discount, payment_mode, buyer_name, buyer_phone,
                  profit_amount, created_by, sale_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id",
        )
        .bind(sale.total_amount)
        .bind(sale.discount)
        .bind(sale.payment_mode.as_str())
        .bind(&sale.buyer_name)
        .bind(&sale.buyer_phone)
        .bind(sale.profit_amount)
        .bind(sale.created_by)
        .bind(sale.date)
        .fetch_one(&mut *tx)
        .await?;

        for line in &sale.lines {
            sqlx::query(
                "INSERT INTO sale_items
                     (sale_id, medicine_id, name, quantity, price_at_sale, purchase_price)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(id)
            .bind(line.medicine_id)
            .bind(&line.name)
            .bind(line.quantity)
            .bind(line.price_at_sale)
            .bind(line.purchase_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Sale {
            id,
            lines: sale.lines,
            total_amount: sale.total_amount,
            discount: sale.discount,
            payment_mode: sale.payment_mode,
            buyer_name: sale.buyer_name,
            buyer_phone: sale.buyer_phone,
            profit_amount: sale.profit_amount,
            created_by: sale.created_by,
            date: sale.date,
        })
    }
}
