//! The pending-transaction pool.
//!
//! A FIFO queue of unconfirmed transactions. Mining takes a snapshot rather
//! than draining, so submissions racing an in-flight mine simply land after
//! the snapshot boundary and stay pending for the next one.

use certchain_core::transaction::TIMESTAMP_FIELD;
use certchain_core::{current_timestamp, Transaction};
use serde_json::Value;

/// Ordered queue of transactions awaiting inclusion in a block.
///
/// No deduplication: logically duplicate submissions are a domain-level
/// concern, not a pool-level one.
#[derive(Debug, Default)]
pub struct TransactionPool {
    pending: Vec<Transaction>,
}

impl TransactionPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction, stamping a `timestamp` field if it has none.
    /// Returns the position assigned in the queue.
    pub fn submit(&mut self, mut tx: Transaction) -> usize {
        if !tx.contains(TIMESTAMP_FIELD) {
            tx.set(TIMESTAMP_FIELD, Value::from(current_timestamp()));
        }
        self.pending.push(tx);
        self.pending.len() - 1
    }

    /// Copy of the current pending sequence, without mutating it.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.pending.clone()
    }

    /// Remove exactly the transactions confirmed in a just-sealed block.
    ///
    /// One occurrence is removed per confirmed transaction, so submissions
    /// that arrived after the mining snapshot remain pending.
    pub fn clear_confirmed(&mut self, confirmed: &[Transaction]) {
        for tx in confirmed {
            if let Some(pos) = self.pending.iter().position(|pending| pending == tx) {
                self.pending.remove(pos);
            }
        }
    }

    /// Number of pending transactions.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
