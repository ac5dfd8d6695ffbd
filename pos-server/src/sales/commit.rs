//! Sale commit engine - the authoritative finalize path
//!
//! A finalize attempt moves through `Validating → Committing →
//! {Committed | Aborted}`:
//!
//! ```text
//! finalize(order, split)
//!     ├─ 1. Boundary validation (EmptySale / InvalidLineItem /
//!     │     InvalidPayment / PaymentMismatch) on the caller's snapshot
//!     ├─ 2. Begin write transaction
//!     ├─ 3. Re-read the table's pending order; this authoritative copy
//!     │     is what gets sold — re-validate it (a concurrent edit that
//!     │     changed the total surfaces as PaymentMismatch, never as a
//!     │     silently dropped line)
//!     ├─ 4. Read every referenced product, summing duplicate lines per product
//!     ├─ 5. Authoritative stock re-check (supersedes any advisory answer)
//!     ├─ 6. Write immutable Sale, decrement stock, delete pending order
//!     ├─ 7. Commit transaction
//!     └─ 8. On retryable storage failure: backoff and restart from 2,
//!           bounded; budget exhaustion surfaces CommitConflict
//! ```
//!
//! Steps 3-7 run inside one redb write transaction, so either every
//! write applies or none does. Validation failures abort the
//! transaction by dropping it; no side effect survives an abort.

use crate::db::{PosStorage, StorageError};
use crate::sales::SaleError;
use rand::Rng;
use shared::models::{PaymentSplit, PendingOrder, Sale, SaleStatus};
use shared::util;
use std::time::Duration;

/// Default bound on conflict retries before surfacing `CommitConflict`
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default first backoff step; doubles per attempt, plus jitter
pub const DEFAULT_BASE_BACKOFF: Duration = Duration::from_millis(50);

/// How a single commit attempt failed
enum AttemptError {
    /// Validation failed; retrying cannot help
    Terminal(SaleError),
    /// The storage layer failed mid-transaction; worth retrying
    Retryable(StorageError),
}

impl From<StorageError> for AttemptError {
    fn from(err: StorageError) -> Self {
        if err.is_retryable() {
            AttemptError::Retryable(err)
        } else {
            AttemptError::Terminal(SaleError::StorageUnavailable(err))
        }
    }
}

/// Atomic order-finalize engine
#[derive(Clone)]
pub struct SaleCommitEngine {
    storage: PosStorage,
    max_retries: u32,
    base_backoff: Duration,
}

impl SaleCommitEngine {
    pub fn new(storage: PosStorage) -> Self {
        Self {
            storage,
            max_retries: DEFAULT_MAX_RETRIES,
            base_backoff: DEFAULT_BASE_BACKOFF,
        }
    }

    /// Override the retry budget (from config)
    pub fn with_retry(mut self, max_retries: u32, base_backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_backoff = base_backoff;
        self
    }

    /// Convert a pending order into an immutable sale, all-or-nothing.
    ///
    /// On success the sale is durable, every involved product's stock
    /// is decremented and the table's pending order is gone. On any
    /// error nothing has changed and the pending order is left
    /// untouched for the operator to correct and retry.
    pub async fn finalize(
        &self,
        order: &PendingOrder,
        split: PaymentSplit,
    ) -> Result<Sale, SaleError> {
        // Boundary validation, before any transaction starts
        validate_input(order, split)?;

        self.run_with_retry(|| self.try_commit(order, split), &order.table_id)
            .await
    }

    /// Drive commit attempts through the bounded retry loop
    async fn run_with_retry<F>(&self, mut attempt_fn: F, table_id: &str) -> Result<Sale, SaleError>
    where
        F: FnMut() -> Result<Sale, AttemptError>,
    {
        let mut attempt: u32 = 0;
        loop {
            match attempt_fn() {
                Ok(sale) => {
                    tracing::info!(
                        sale_id = %sale.id,
                        receipt = sale.receipt_number,
                        table_id = %table_id,
                        total = sale.total,
                        "Sale committed"
                    );
                    return Ok(sale);
                }
                Err(AttemptError::Terminal(err)) => {
                    tracing::warn!(table_id = %table_id, error = %err, "Finalize aborted");
                    return Err(err);
                }
                Err(AttemptError::Retryable(err)) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        tracing::error!(
                            table_id = %table_id,
                            attempts = attempt,
                            error = %err,
                            "Commit retry budget exhausted"
                        );
                        return Err(SaleError::CommitConflict { attempts: attempt });
                    }
                    let backoff = self.backoff_for(attempt);
                    tracing::warn!(
                        table_id = %table_id,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "Commit attempt failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    /// Exponential backoff with jitter: base * 2^(attempt-1) + rand(0..base/2)
    fn backoff_for(&self, attempt: u32) -> Duration {
        let base = self.base_backoff.as_millis() as u64;
        let exp = base.saturating_mul(1u64 << (attempt - 1).min(10));
        let jitter = if base < 2 {
            0
        } else {
            rand::thread_rng().gen_range(0..base / 2)
        };
        Duration::from_millis(exp + jitter)
    }

    /// One isolated validate-and-commit attempt
    fn try_commit(&self, snapshot: &PendingOrder, split: PaymentSplit) -> Result<Sale, AttemptError> {
        let txn = self.storage.begin_write()?;

        // The caller's snapshot may be stale: line-item edits are
        // accepted and persisted concurrently. Only the copy read
        // inside this transaction may be sold and deleted; selling the
        // snapshot would silently destroy an edit that landed in
        // between.
        let order = self
            .storage
            .get_pending_order_txn(&txn, &snapshot.table_id)?
            .ok_or(AttemptError::Terminal(SaleError::EmptySale))?;
        validate_input(&order, split).map_err(AttemptError::Terminal)?;

        // A single sale may hold the same product on several lines
        // (added, then added again); under-summing would oversell.
        // Saturation is safe here: a saturated request can only fail
        // the stock check harder.
        let mut totals: Vec<(String, u32)> = Vec::new();
        for item in &order.line_items {
            match totals.iter_mut().find(|(id, _)| id == &item.product_id) {
                Some((_, qty)) => *qty = qty.saturating_add(item.quantity),
                None => totals.push((item.product_id.clone(), item.quantity)),
            }
        }

        // Authoritative read + re-check of every referenced product.
        // The advisory answer the operator saw earlier is void here:
        // other tables may have committed since.
        let mut decremented = Vec::with_capacity(totals.len());
        for (product_id, requested) in &totals {
            let mut product = self
                .storage
                .get_product_txn(&txn, product_id)
                .map_err(AttemptError::from)?
                .ok_or_else(|| {
                    AttemptError::Terminal(SaleError::ProductVanished(product_id.clone()))
                })?;

            if *requested > product.stock_quantity {
                return Err(AttemptError::Terminal(SaleError::InsufficientStock {
                    product_id: product_id.clone(),
                    available: product.stock_quantity,
                    requested: *requested,
                }));
            }

            product.stock_quantity = product.stock_quantity.saturating_sub(*requested);
            decremented.push(product);
        }

        // All checks passed: write everything in the same transaction
        let receipt_number = self.storage.next_receipt_number_txn(&txn)?;
        let sale = Sale {
            id: util::new_id(),
            receipt_number,
            table_label: order.table_name.clone(),
            line_items: order.line_items.clone(),
            total: order.total(),
            payment_split: split,
            status: SaleStatus::Paid,
            timestamp: util::now_millis(),
        };

        self.storage.store_sale_txn(&txn, &sale)?;
        for product in &decremented {
            self.storage.put_product_txn(&txn, product)?;
        }
        self.storage.delete_pending_order_txn(&txn, &order.table_id)?;

        txn.commit().map_err(StorageError::from)?;
        Ok(sale)
    }
}

/// Reject bad input before any transaction starts
fn validate_input(order: &PendingOrder, split: PaymentSplit) -> Result<(), SaleError> {
    if order.line_items.is_empty() {
        return Err(SaleError::EmptySale);
    }
    for item in &order.line_items {
        if item.quantity == 0 {
            return Err(SaleError::InvalidLineItem(format!(
                "zero quantity for {}",
                item.product_id
            )));
        }
        if item.unit_price < 0 {
            return Err(SaleError::InvalidLineItem(format!(
                "negative unit price for {}",
                item.product_id
            )));
        }
    }

    // Every component non-negative, validated once at the boundary
    if split.cash < 0 || split.transfer_app < 0 || split.card < 0 {
        return Err(SaleError::InvalidPayment(format!(
            "negative component: cash {}, transfer_app {}, card {}",
            split.cash, split.transfer_app, split.card
        )));
    }

    // Exact equality in cents, no tolerance
    let total = order.total();
    let paid = split.total();
    if paid != total {
        return Err(SaleError::PaymentMismatch { paid, total });
    }
    Ok(())
}
