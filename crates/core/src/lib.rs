//! Core ledger primitives for certchain.
//!
//! This crate provides the fundamental types used throughout the ledger:
//! - SHA-256 hashing and the digest type
//! - Ed25519 signing primitives (keypairs, public keys, signatures)
//! - Opaque certification transactions
//! - Blocks and their sealing/integrity rules

pub mod block;
pub mod crypto;
pub mod hash;
pub mod transaction;

// Re-export commonly used types at the crate root
pub use block::{current_timestamp, Block, BlockError};
pub use crypto::{CryptoError, Keypair, PublicKey, Signature};
pub use hash::{sha256, Hash, H256};
pub use transaction::Transaction;
