//! Ledger blocks and their sealing rules.
//!
//! A block starts life as an unsealed candidate (`hash` is `None`), gets its
//! proof fields filled in by a consensus strategy, and is sealed exactly once.
//! The hashed content covers `{index, transactions, timestamp, previous_hash,
//! nonce, validator}` rendered as canonical JSON with sorted keys; the
//! signature is excluded so it can be verified against the hash it signs.

use crate::crypto::{PublicKey, Signature};
use crate::hash::{sha256, Hash};
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors from block sealing and integrity checks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockError {
    #[error("block is already sealed")]
    AlreadySealed,

    #[error("block is not sealed")]
    NotSealed,

    #[error("stored hash does not match recomputed block content")]
    HashMismatch,
}

/// Get the current Unix timestamp in seconds.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_secs()
}

/// A ledger entry: an ordered batch of transactions linked to its predecessor.
///
/// Proof fields: `nonce` is the proof-of-work counter (0 under proof of
/// authority); `validator` and `signature` are the proof-of-authority seal
/// (absent under proof of work). All fields serialize explicitly, with `null`
/// for the inapplicable proof fields, so an exported record is self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain; 0 is reserved for genesis.
    pub index: u64,
    /// Ordered transaction batch; order is part of the hashed content.
    pub transactions: Vec<Transaction>,
    /// Unix timestamp in seconds at creation.
    pub timestamp: u64,
    /// Hash of the predecessor; `Hash::ZERO` for genesis.
    pub previous_hash: Hash,
    /// Proof-of-work search counter.
    pub nonce: u64,
    /// Sealing authority's public key (proof of authority only).
    pub validator: Option<PublicKey>,
    /// Authority signature over the sealed hash (proof of authority only).
    pub signature: Option<Signature>,
    /// Sealed hash; `None` while the block is still a candidate.
    pub hash: Option<Hash>,
}

/// The exact field set covered by the block hash.
#[derive(Serialize)]
struct HashedContent<'a> {
    index: u64,
    transactions: &'a [Transaction],
    timestamp: u64,
    previous_hash: &'a Hash,
    nonce: u64,
    validator: Option<&'a PublicKey>,
}

impl Block {
    /// Create a new unsealed candidate block.
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        timestamp: u64,
        previous_hash: Hash,
    ) -> Self {
        Self {
            index,
            transactions,
            timestamp,
            previous_hash,
            nonce: 0,
            validator: None,
            signature: None,
            hash: None,
        }
    }

    /// Create the genesis block, sealed immediately at construction.
    pub fn genesis() -> Self {
        let mut block = Self::new(0, Vec::new(), current_timestamp(), Hash::ZERO);
        block.hash = Some(block.compute_hash());
        block
    }

    /// Compute the SHA-256 hash of the block's content.
    ///
    /// Pure function of `{index, transactions, timestamp, previous_hash,
    /// nonce, validator}`; the signature and the stored hash are excluded.
    /// Mapping keys serialize in sorted order, so two blocks with
    /// semantically-identical content always hash identically.
    pub fn compute_hash(&self) -> Hash {
        let content = HashedContent {
            index: self.index,
            transactions: &self.transactions,
            timestamp: self.timestamp,
            previous_hash: &self.previous_hash,
            nonce: self.nonce,
            validator: self.validator.as_ref(),
        };
        let canonical =
            serde_json::to_value(&content).expect("canonical serialization should not fail");
        sha256(canonical.to_string().as_bytes())
    }

    /// Seal the block with the given hash.
    ///
    /// One-time transition: sealing an already-sealed block fails, so sealed
    /// content is never silently rehashed under different fields.
    pub fn seal(&mut self, hash: Hash) -> Result<(), BlockError> {
        if self.hash.is_some() {
            return Err(BlockError::AlreadySealed);
        }
        self.hash = Some(hash);
        Ok(())
    }

    /// Whether the block has been sealed.
    pub fn is_sealed(&self) -> bool {
        self.hash.is_some()
    }

    /// Get the sealed hash, failing if the block is still a candidate.
    pub fn sealed_hash(&self) -> Result<Hash, BlockError> {
        self.hash.ok_or(BlockError::NotSealed)
    }

    /// Check that the stored hash matches the recomputed content.
    ///
    /// A mismatch on a deserialized record is a data-integrity error and must
    /// reject the block, never be auto-corrected.
    pub fn verify_integrity(&self) -> Result<(), BlockError> {
        if self.sealed_hash()? != self.compute_hash() {
            return Err(BlockError::HashMismatch);
        }
        Ok(())
    }

    /// Check if this is the genesis block.
    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_hash == Hash::ZERO
    }

    /// Number of transactions in the block.
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }
}
