//! Ledger orchestration for certchain.
//!
//! This crate brings the core pieces together:
//! - **Pool**: the FIFO queue of unconfirmed transactions
//! - **Ledger**: the chain itself — genesis, mining, validation,
//!   import/export, and query surface
//! - **SharedChain**: a cloneable handle serializing all chain access behind
//!   one mutex, so a mining sequence (snapshot, seal, verify, append, clear)
//!   is atomic with respect to other miners and registry changes
//!
//! # Example
//!
//! ```rust
//! use certchain_chain::Chain;
//! use certchain_consensus::Consensus;
//! use certchain_core::{Keypair, Transaction};
//! use serde_json::json;
//!
//! let kp = Keypair::generate();
//! let mut chain = Chain::new(Consensus::poa());
//! chain.add_validator(kp.public_key()).unwrap();
//!
//! chain.submit_transaction(Transaction::new().with("title", json!("A")));
//! let mined = chain.mine(Some(&kp)).unwrap();
//! assert_eq!(mined, Some(1));
//! ```

pub mod ledger;
pub mod pool;

use std::sync::{Arc, Mutex, MutexGuard};

// Re-export commonly used types
pub use ledger::{Chain, ChainError, ChainStats, ConfirmedTransaction};
pub use pool::TransactionPool;

/// A cloneable, thread-safe handle to one [`Chain`].
///
/// One coarse lock guards the whole chain rather than per-field locks:
/// cross-field consistency (pool snapshot, block content, append) is the
/// actual requirement, and two concurrent mines must never both append on the
/// same predecessor hash.
#[derive(Clone)]
pub struct SharedChain {
    inner: Arc<Mutex<Chain>>,
}

impl SharedChain {
    /// Wrap a chain in a shared handle.
    pub fn new(chain: Chain) -> Self {
        Self {
            inner: Arc::new(Mutex::new(chain)),
        }
    }

    /// Lock the chain for the duration of the guard.
    ///
    /// A poisoned lock is recovered: chain mutations are applied only after
    /// all fallible work has succeeded, so the state behind a poisoned mutex
    /// is still consistent.
    pub fn lock(&self) -> MutexGuard<'_, Chain> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certchain_consensus::Consensus;
    use certchain_core::{Keypair, Transaction};
    use serde_json::json;

    #[test]
    fn test_shared_handle_clones_see_same_chain() {
        let kp = Keypair::generate();
        let shared = SharedChain::new(Chain::new(Consensus::poa()));
        shared.lock().add_validator(kp.public_key()).unwrap();

        let other = shared.clone();
        other
            .lock()
            .submit_transaction(Transaction::new().with("title", json!("A")));

        assert_eq!(shared.lock().pending_count(), 1);
        shared.lock().mine(Some(&kp)).unwrap();
        assert_eq!(other.lock().len(), 2);
    }
}
