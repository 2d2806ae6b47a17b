// src/services/sales.rs
//
// Sale transaction processor: validates a checkout request, decrements stock,
// computes per-line profit, and appends an immutable sale to the ledger.
//
// The whole operation is all-or-nothing. Nothing is written until every line
// has been resolved and validated, stock is taken with atomic conditional
// decrements, and any failure after the first decrement restores every
// decrement already applied before the error is returned.
use chrono::Utc;
use tracing::{info, warn};

use crate::dtos::sale::CreateSaleRequest;
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::sale::{NewSale, PaymentMode, Sale, SaleLine};
use crate::stores::{MedicineStore, SaleLedger};

pub async fn create_sale<M, L>(
    medicines: &M,
    ledger: &L,
    req: CreateSaleRequest,
    actor: &AuthContext,
) -> Result<Sale, AppError>
where
    M: MedicineStore,
    L: SaleLedger,
{
    // Shape validation, before any store access.
    if req.medicines.is_empty() {
        return Err(AppError::validation("At least one medicine is required"));
    }
    let payment_mode: PaymentMode = req
        .payment_mode
        .parse()
        .map_err(|_| AppError::validation("paymentMode must be one of: cash, upi, card"))?;
    if req.total_amount < 0.0 {
        return Err(AppError::validation("totalAmount must not be negative"));
    }
    let discount = req.discount.unwrap_or(0.0);
    if discount < 0.0 {
        return Err(AppError::validation("discount must not be negative"));
    }
    for item in &req.medicines {
        if item.quantity < 1 {
            return Err(AppError::validation("quantity must be at least 1"));
        }
        if item.price_at_sale < 0.0 {
            return Err(AppError::validation("priceAtSale must not be negative"));
        }
    }
    let gross: f64 = req
        .medicines
        .iter()
        .map(|item| item.price_at_sale * f64::from(item.quantity))
        .sum();
    if gross - discount < 0.0 {
        return Err(AppError::validation("discount cannot exceed the sale total"));
    }

    // Phase 1: resolve every line and freeze its name and cost price. A
    // missing medicine or an obviously short stock fails here, before any
    // write has happened.
    let mut lines: Vec<SaleLine> = Vec::with_capacity(req.medicines.len());
    for item in &req.medicines {
        let medicine = medicines
            .find_by_id(item.medicine_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Medicine not found: {}", item.medicine_id)))?;

        if medicine.quantity < item.quantity {
            return Err(AppError::insufficient_stock(medicine.name, medicine.quantity));
        }

        lines.push(SaleLine {
            medicine_id: medicine.id,
            name: medicine.name,
            quantity: item.quantity,
            price_at_sale: item.price_at_sale,
            purchase_price: medicine.purchase_price,
        });
    }

    // Phase 2: take stock. Each decrement is atomic against concurrent
    // sales; a line that loses the race triggers a rollback of every
    // decrement this call already applied.
    let mut applied: Vec<(i64, i32)> = Vec::with_capacity(lines.len());
    for line in &lines {
        let taken = match medicines.decrement_if_available(line.medicine_id, line.quantity).await {
            Ok(taken) => taken,
            Err(e) => {
                undo_decrements(medicines, &applied).await;
                return Err(e);
            }
        };
        if !taken {
            let available = match medicines.find_by_id(line.medicine_id).await {
                Ok(Some(m)) => m.quantity,
                _ => 0,
            };
            warn!(
                medicine_id = line.medicine_id,
                requested = line.quantity,
                available,
                "Sale lost stock race, rolling back"
            );
            undo_decrements(medicines, &applied).await;
            return Err(AppError::insufficient_stock(line.name.clone(), available));
        }
        applied.push((line.medicine_id, line.quantity));
    }

    let profit_amount: f64 = lines
        .iter()
        .map(|line| (line.price_at_sale - line.purchase_price) * f64::from(line.quantity))
        .sum();

    let sale = NewSale {
        lines,
        total_amount: req.total_amount,
        discount,
        payment_mode,
        buyer_name: req.buyer_name,
        buyer_phone: req.buyer_phone,
        profit_amount,
        created_by: actor.user_id,
        date: Utc::now(),
    };

    match ledger.append(sale).await {
        Ok(sale) => {
            info!(
                sale_id = sale.id,
                total_amount = sale.total_amount,
                profit_amount = sale.profit_amount,
                created_by = sale.created_by,
                "Sale recorded"
            );
            Ok(sale)
        }
        Err(e) => {
            undo_decrements(medicines, &applied).await;
            Err(e)
        }
    }
}

/// Restores every decrement applied by a sale that failed partway through.
async fn undo_decrements<M: MedicineStore>(medicines: &M, applied: &[(i64, i32)]) {
    for &(id, qty) in applied {
        if let Err(e) = medicines.restock(id, qty).await {
            // Nothing more we can do here than make the operator aware.
            tracing::error!(
                medicine_id = id,
                quantity = qty,
                error = ?e,
                "Failed to restore stock while aborting sale"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::sale::SaleLineRequest;
    use crate::models::medicine::Medicine;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::{Arc, Mutex};

    struct MemMedicineStore {
        medicines: Mutex<HashMap<i64, Medicine>>,
    }

    impl MemMedicineStore {
        fn with(medicines: Vec<Medicine>) -> Self {
            Self {
                medicines: Mutex::new(medicines.into_iter().map(|m| (m.id, m)).collect()),
            }
        }

        fn quantity_of(&self, id: i64) -> i32 {
            self.medicines.lock().unwrap()[&id].quantity
        }
    }

    impl MedicineStore for MemMedicineStore {
        async fn find_by_id(&self, id: i64) -> Result<Option<Medicine>, AppError> {
            Ok(self.medicines.lock().unwrap().get(&id).cloned())
        }

        async fn decrement_if_available(&self, id: i64, qty: i32) -> Result<bool, AppError> {
            let mut medicines = self.medicines.lock().unwrap();
            match medicines.get_mut(&id) {
                Some(m) if m.quantity >= qty => {
                    m.quantity -= qty;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn restock(&self, id: i64, qty: i32) -> Result<(), AppError> {
            let mut medicines = self.medicines.lock().unwrap();
            if let Some(m) = medicines.get_mut(&id) {
                m.quantity += qty;
            }
            Ok(())
        }
    }

    struct MemSaleLedger {
        sales: Mutex<Vec<Sale>>,
        next_id: AtomicI64,
    }

    impl MemSaleLedger {
        fn new() -> Self {
            Self { sales: Mutex::new(Vec::new()), next_id: AtomicI64::new(1) }
        }

        fn len(&self) -> usize {
            self.sales.lock().unwrap().len()
        }
    }

    impl SaleLedger for MemSaleLedger {
        async fn append(&self, sale: NewSale) -> Result<Sale, AppError> {
            let sale = Sale {
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
                lines: sale.lines,
                total_amount: sale.total_amount,
                discount: sale.discount,
                payment_mode: sale.payment_mode,
                buyer_name: sale.buyer_name,
                buyer_phone: sale.buyer_phone,
                profit_amount: sale.profit_amount,
                created_by: sale.created_by,
                date: sale.date,
            };
            self.sales.lock().unwrap().push(sale.clone());
            Ok(sale)
        }
    }

    /// Ledger whose storage is down. Used to check that decrements are
    /// rolled back when the final append fails.
    struct FailingLedger;

    impl SaleLedger for FailingLedger {
        async fn append(&self, _sale: NewSale) -> Result<Sale, AppError> {
            Err(AppError::internal("ledger unavailable"))
        }
    }

    fn medicine(id: i64, quantity: i32, purchase_price: f64, selling_price: f64) -> Medicine {
        Medicine {
            id,
            name: format!("Medicine {id}"),
            category: "tablet".to_string(),
            batch_number: format!("B{id:04}"),
            expiry_date: chrono::NaiveDate::from_ymd_opt(2027, 6, 30).unwrap(),
            quantity,
            purchase_price,
            selling_price,
            low_stock_threshold: 10,
            supplier_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn actor() -> AuthContext {
        AuthContext { user_id: 7, role: "staff".to_string(), name: "Asha".to_string() }
    }

    fn request(lines: Vec<(i64, i32, f64)>, total: f64) -> CreateSaleRequest {
        CreateSaleRequest {
            medicines: lines
                .into_iter()
                .map(|(medicine_id, quantity, price_at_sale)| SaleLineRequest {
                    medicine_id,
                    quantity,
                    price_at_sale,
                })
                .collect(),
            total_amount: total,
            discount: None,
            payment_mode: "cash".to_string(),
            buyer_name: None,
            buyer_phone: None,
        }
    }

    #[tokio::test]
    async fn successful_sale_decrements_stock_and_computes_profit() {
        let store = MemMedicineStore::with(vec![medicine(1, 10, 5.0, 8.0)]);
        let ledger = MemSaleLedger::new();

        let sale = create_sale(&store, &ledger, request(vec![(1, 3, 8.0)], 24.0), &actor())
            .await
            .unwrap();

        assert_eq!(store.quantity_of(1), 7);
        assert_eq!(sale.profit_amount, 9.0);
        assert_eq!(sale.total_amount, 24.0);
        assert_eq!(sale.created_by, 7);
        assert_eq!(sale.lines.len(), 1);
        assert_eq!(sale.lines[0].name, "Medicine 1");
        assert_eq!(sale.lines[0].purchase_price, 5.0);
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn profit_sums_across_lines() {
        let store = MemMedicineStore::with(vec![
            medicine(1, 10, 5.0, 8.0),
            medicine(2, 20, 2.5, 4.0),
        ]);
        let ledger = MemSaleLedger::new();

        let sale = create_sale(
            &store,
            &ledger,
            request(vec![(1, 2, 8.0), (2, 4, 4.0)], 32.0),
            &actor(),
        )
        .await
        .unwrap();

        // (8-5)*2 + (4-2.5)*4
        assert_eq!(sale.profit_amount, 12.0);
        assert_eq!(store.quantity_of(1), 8);
        assert_eq!(store.quantity_of(2), 16);
    }

    #[tokio::test]
    async fn insufficient_stock_reports_available_and_leaves_stock_unchanged() {
        let store = MemMedicineStore::with(vec![medicine(1, 2, 5.0, 8.0)]);
        let ledger = MemSaleLedger::new();

        let err = create_sale(&store, &ledger, request(vec![(1, 5, 8.0)], 40.0), &actor())
            .await
            .unwrap_err();

        match err {
            AppError::InsufficientStock { name, available } => {
                assert_eq!(name, "Medicine 1");
                assert_eq!(available, 2);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(store.quantity_of(1), 2);
        assert_eq!(ledger.len(), 0);
    }

    #[tokio::test]
    async fn missing_medicine_on_second_line_leaves_first_line_untouched() {
        let store = MemMedicineStore::with(vec![medicine(1, 10, 5.0, 8.0)]);
        let ledger = MemSaleLedger::new();

        let err = create_sale(
            &store,
            &ledger,
            request(vec![(1, 3, 8.0), (999, 1, 4.0)], 28.0),
            &actor(),
        )
        .await
        .unwrap_err();

        match err {
            AppError::NotFound(msg) => assert!(msg.contains("999"), "message was {msg}"),
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert_eq!(store.quantity_of(1), 10);
        assert_eq!(ledger.len(), 0);
    }

    #[tokio::test]
    async fn short_stock_on_second_line_rolls_back_first_line() {
        // Phase 1 passes both lines, then the second decrement loses because
        // another writer cannot be told apart from a stale read. Simulate by
        // letting phase 1 see stock that phase 2 cannot take.
        struct RacingStore {
            inner: MemMedicineStore,
            raced: std::sync::atomic::AtomicBool,
        }

        impl MedicineStore for RacingStore {
            async fn find_by_id(&self, id: i64) -> Result<Option<Medicine>, AppError> {
                let mut m = self.inner.find_by_id(id).await?;
                // Medicine 2 looks in stock until the decrement happens.
                if id == 2 && !self.raced.load(Ordering::SeqCst) {
                    if let Some(ref mut m) = m {
                        m.quantity = 5;
                    }
                }
                Ok(m)
            }

            async fn decrement_if_available(&self, id: i64, qty: i32) -> Result<bool, AppError> {
                if id == 2 {
                    self.raced.store(true, Ordering::SeqCst);
                }
                self.inner.decrement_if_available(id, qty).await
            }

            async fn restock(&self, id: i64, qty: i32) -> Result<(), AppError> {
                self.inner.restock(id, qty).await
            }
        }

        let store = RacingStore {
            inner: MemMedicineStore::with(vec![medicine(1, 10, 5.0, 8.0), medicine(2, 1, 2.0, 3.0)]),
            raced: std::sync::atomic::AtomicBool::new(false),
        };
        let ledger = MemSaleLedger::new();

        let err = create_sale(
            &store,
            &ledger,
            request(vec![(1, 4, 8.0), (2, 3, 3.0)], 41.0),
            &actor(),
        )
        .await
        .unwrap_err();

        match err {
            AppError::InsufficientStock { name, available } => {
                assert_eq!(name, "Medicine 2");
                assert_eq!(available, 1);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        // The first line's decrement was rolled back.
        assert_eq!(store.inner.quantity_of(1), 10);
        assert_eq!(store.inner.quantity_of(2), 1);
        assert_eq!(ledger.len(), 0);
    }

    #[tokio::test]
    async fn ledger_failure_restores_all_decrements() {
        let store = MemMedicineStore::with(vec![medicine(1, 10, 5.0, 8.0), medicine(2, 6, 2.0, 3.0)]);

        let err = create_sale(
            &store,
            &FailingLedger,
            request(vec![(1, 2, 8.0), (2, 2, 3.0)], 22.0),
            &actor(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(store.quantity_of(1), 10);
        assert_eq!(store.quantity_of(2), 6);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_sales_of_same_medicine_never_oversell() {
        let store = Arc::new(MemMedicineStore::with(vec![medicine(1, 10, 5.0, 8.0)]));
        let ledger = Arc::new(MemSaleLedger::new());

        let mut handles = Vec::new();
        for _ in 0..2 {
            let store = Arc::clone(&store);
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                create_sale(&*store, &*ledger, request(vec![(1, 6, 8.0)], 48.0), &actor()).await
            }));
        }

        let mut successes = 0;
        let mut stock_failures = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(AppError::InsufficientStock { .. }) => stock_failures += 1,
                Err(other) => panic!("unexpected error {other:?}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(stock_failures, 1);
        assert_eq!(store.quantity_of(1), 4);
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn identical_sales_are_not_deduplicated() {
        let store = MemMedicineStore::with(vec![medicine(1, 10, 5.0, 8.0)]);
        let ledger = MemSaleLedger::new();

        let first = create_sale(&store, &ledger, request(vec![(1, 2, 8.0)], 16.0), &actor())
            .await
            .unwrap();
        let second = create_sale(&store, &ledger, request(vec![(1, 2, 8.0)], 16.0), &actor())
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(ledger.len(), 2);
        assert_eq!(store.quantity_of(1), 6);
    }

    #[tokio::test]
    async fn rejects_malformed_requests_before_any_mutation() {
        let store = MemMedicineStore::with(vec![medicine(1, 10, 5.0, 8.0)]);
        let ledger = MemSaleLedger::new();

        let empty = request(vec![], 0.0);
        assert!(matches!(
            create_sale(&store, &ledger, empty, &actor()).await,
            Err(AppError::Validation(_))
        ));

        let zero_qty = request(vec![(1, 0, 8.0)], 0.0);
        assert!(matches!(
            create_sale(&store, &ledger, zero_qty, &actor()).await,
            Err(AppError::Validation(_))
        ));

        let mut bad_mode = request(vec![(1, 1, 8.0)], 8.0);
        bad_mode.payment_mode = "cheque".to_string();
        assert!(matches!(
            create_sale(&store, &ledger, bad_mode, &actor()).await,
            Err(AppError::Validation(_))
        ));

        let mut negative_discount = request(vec![(1, 1, 8.0)], 8.0);
        negative_discount.discount = Some(-1.0);
        assert!(matches!(
            create_sale(&store, &ledger, negative_discount, &actor()).await,
            Err(AppError::Validation(_))
        ));

        let mut oversized_discount = request(vec![(1, 1, 8.0)], 0.0);
        oversized_discount.discount = Some(20.0);
        assert!(matches!(
            create_sale(&store, &ledger, oversized_discount, &actor()).await,
            Err(AppError::Validation(_))
        ));

        assert_eq!(store.quantity_of(1), 10);
        assert_eq!(ledger.len(), 0);
    }

    #[tokio::test]
    async fn snapshot_is_decoupled_from_later_medicine_edits() {
        let store = MemMedicineStore::with(vec![medicine(1, 10, 5.0, 8.0)]);
        let ledger = MemSaleLedger::new();

        let sale = create_sale(&store, &ledger, request(vec![(1, 1, 8.0)], 8.0), &actor())
            .await
            .unwrap();

        // Edit the medicine after the sale; the persisted line keeps the
        // point-in-time name and cost.
        {
            let mut medicines = store.medicines.lock().unwrap();
            let m = medicines.get_mut(&1).unwrap();
            m.name = "Renamed".to_string();
            m.purchase_price = 99.0;
        }

        assert_eq!(sale.lines[0].name, "Medicine 1");
        assert_eq!(sale.lines[0].purchase_price, 5.0);
    }
}
