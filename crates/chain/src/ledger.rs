//! The chain itself: genesis, mining, validation, import/export, queries.

use crate::pool::TransactionPool;
use certchain_consensus::{Consensus, ConsensusError, ConsensusKind, RegistryError};
use certchain_core::{current_timestamp, Block, BlockError, Hash, Keypair, PublicKey, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("consensus error: {0}")]
    Consensus(#[from] ConsensusError),

    #[error("block error: {0}")]
    Block(#[from] BlockError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("validators are only supported under proof of authority")]
    ValidatorsUnsupported,

    /// The candidate no longer links to the tip. Always an internal invariant
    /// violation (concurrent mutation of the tip), never a user error.
    #[error("candidate block no longer links to the chain tip")]
    LinkageMismatch,

    #[error("invalid chain: {0}")]
    InvalidChain(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChainError>;

/// A confirmed transaction together with the block that holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedTransaction {
    pub transaction: Transaction,
    pub block_index: u64,
    pub block_timestamp: u64,
    pub block_hash: Hash,
}

/// Point-in-time chain statistics.
#[derive(Debug, Clone)]
pub struct ChainStats {
    pub total_blocks: usize,
    pub total_transactions: usize,
    pub certified_transactions: usize,
    pub pending_transactions: usize,
    pub consensus: ConsensusKind,
    pub difficulty: Option<usize>,
    pub last_block_hash: Option<Hash>,
    pub validator_count: usize,
}

/// The append-only ledger of certification transactions.
///
/// Owns the sealed block sequence, the pending pool, and the active consensus
/// strategy. Constructed with a genesis block already in place; afterwards the
/// sequence only grows, except for [`Chain::import_blocks`], which replaces it
/// wholesale after full re-validation.
pub struct Chain {
    blocks: Vec<Block>,
    pool: TransactionPool,
    consensus: Consensus,
}

impl Chain {
    /// Create a chain with a freshly sealed genesis block.
    pub fn new(consensus: Consensus) -> Self {
        Self {
            blocks: vec![Block::genesis()],
            pool: TransactionPool::new(),
            consensus,
        }
    }

    /// The sealed block sequence.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of sealed blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// A chain is never empty; genesis is created at construction.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The latest sealed block.
    pub fn last_block(&self) -> &Block {
        self.blocks
            .last()
            .expect("chain always holds at least genesis")
    }

    /// The active consensus strategy.
    pub fn consensus(&self) -> &Consensus {
        &self.consensus
    }

    // ---- pool ----------------------------------------------------------

    /// Queue a transaction for the next block. Returns its pool position.
    pub fn submit_transaction(&mut self, tx: Transaction) -> usize {
        let position = self.pool.submit(tx);
        debug!(position, "transaction queued");
        position
    }

    /// Copy of the pending transactions.
    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.pool.snapshot()
    }

    /// Number of pending transactions.
    pub fn pending_count(&self) -> usize {
        self.pool.len()
    }

    // ---- validators ----------------------------------------------------

    /// Authorize a validator. Fails under proof of work.
    pub fn add_validator(&mut self, identity: PublicKey) -> Result<bool> {
        let registry = self
            .consensus
            .registry_mut()
            .ok_or(ChainError::ValidatorsUnsupported)?;
        Ok(registry.add(identity))
    }

    /// Revoke a validator. Fails under proof of work.
    pub fn remove_validator(&mut self, identity: &PublicKey) -> Result<bool> {
        let registry = self
            .consensus
            .registry_mut()
            .ok_or(ChainError::ValidatorsUnsupported)?;
        Ok(registry.remove(identity))
    }

    /// Snapshot of the authorized validators; empty under proof of work.
    pub fn validators(&self) -> HashSet<PublicKey> {
        self.consensus
            .registry()
            .map(|registry| registry.snapshot())
            .unwrap_or_default()
    }

    /// Whether an identity may currently seal blocks; false under proof of work.
    pub fn is_validator_authorized(&self, identity: &PublicKey) -> bool {
        self.consensus
            .registry()
            .map(|registry| registry.is_authorized(identity))
            .unwrap_or(false)
    }

    // ---- mining --------------------------------------------------------

    /// Assemble, seal, verify, and append a block from the pending pool.
    ///
    /// Returns `Ok(None)` when the pool is empty (nothing to mine, benign)
    /// and `Ok(Some(index))` on append. Every failure path leaves the chain
    /// and the pool untouched, so a fixable failure (wrong signer, say) can
    /// be retried without resubmitting transactions.
    pub fn mine(&mut self, signer: Option<&Keypair>) -> Result<Option<u64>> {
        if self.pool.is_empty() {
            debug!("mine requested with an empty pool");
            return Ok(None);
        }

        let snapshot = self.pool.snapshot();
        let tip_hash = self.last_block().sealed_hash()?;
        let mut candidate = Block::new(
            self.last_block().index + 1,
            snapshot.clone(),
            current_timestamp(),
            tip_hash,
        );

        if let Err(err) = self.consensus.seal(&mut candidate, signer) {
            warn!(%err, "sealing failed; chain and pool unchanged");
            return Err(err.into());
        }

        // Holds by construction; re-checked to catch concurrent tip movement
        // before commit.
        if candidate.previous_hash != self.last_block().sealed_hash()? {
            return Err(ChainError::LinkageMismatch);
        }

        // A strategy that seals a block it would reject on verify is an
        // internal bug; fail loudly rather than corrupt the chain.
        self.consensus.verify(&candidate)?;

        let index = candidate.index;
        info!(index, transactions = candidate.tx_count(), "block appended");
        self.blocks.push(candidate);
        self.pool.clear_confirmed(&snapshot);
        Ok(Some(index))
    }

    // ---- validation ----------------------------------------------------

    /// Structural validation of a block sequence.
    ///
    /// Checks: non-empty, genesis shape (index 0, zero predecessor),
    /// contiguous indices, every stored hash equal to its recomputation, and
    /// predecessor linkage between adjacent blocks. Consensus proofs are not
    /// re-checked here; see [`Chain::validate_with_consensus`].
    pub fn validate_blocks(blocks: &[Block]) -> Result<()> {
        let genesis = blocks
            .first()
            .ok_or_else(|| ChainError::InvalidChain("chain is empty".into()))?;
        if genesis.index != 0 || genesis.previous_hash != Hash::ZERO {
            return Err(ChainError::InvalidChain("malformed genesis block".into()));
        }

        let mut prev_hash: Option<Hash> = None;
        for (i, block) in blocks.iter().enumerate() {
            if block.index != i as u64 {
                return Err(ChainError::InvalidChain(format!(
                    "non-contiguous index at position {i}"
                )));
            }
            block
                .verify_integrity()
                .map_err(|err| ChainError::InvalidChain(format!("block {i}: {err}")))?;
            if let Some(prev) = prev_hash {
                if block.previous_hash != prev {
                    return Err(ChainError::InvalidChain(format!(
                        "broken linkage at block {i}"
                    )));
                }
            }
            prev_hash = block.hash;
        }
        Ok(())
    }

    /// Structural validation of the live chain.
    pub fn validate(&self) -> Result<()> {
        Self::validate_blocks(&self.blocks)
    }

    /// Structural validation plus a consensus-proof check of every
    /// non-genesis block under the active strategy.
    pub fn validate_with_consensus(&self) -> Result<()> {
        self.validate()?;
        for block in &self.blocks[1..] {
            self.consensus.verify(block)?;
        }
        Ok(())
    }

    // ---- import / export -----------------------------------------------

    /// Copy of the full block sequence, for export.
    pub fn export_blocks(&self) -> Vec<Block> {
        self.blocks.clone()
    }

    /// Serialize the full chain to JSON.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.blocks)?)
    }

    /// Replace the live chain with an imported sequence.
    ///
    /// The replacement happens only after full structural validation; on
    /// failure the current chain remains authoritative and the pool is left
    /// alone. Returns the new length.
    pub fn import_blocks(&mut self, blocks: Vec<Block>) -> Result<usize> {
        Self::validate_blocks(&blocks)?;
        info!(blocks = blocks.len(), "chain replaced by import");
        self.blocks = blocks;
        Ok(self.blocks.len())
    }

    /// Parse and import a chain from JSON.
    pub fn import_json(&mut self, json: &str) -> Result<usize> {
        let blocks: Vec<Block> = serde_json::from_str(json)?;
        self.import_blocks(blocks)
    }

    // ---- queries -------------------------------------------------------

    /// All confirmed transactions whose `status` marks them certified,
    /// paired with their block metadata. Genesis is skipped.
    pub fn certified_transactions(&self) -> Vec<ConfirmedTransaction> {
        self.confirmed(|tx| tx.is_certified())
    }

    /// All confirmed transactions whose `from` or `to` field matches the
    /// given address.
    pub fn transactions_for(&self, address: &str) -> Vec<ConfirmedTransaction> {
        self.confirmed(|tx| tx.involves(address))
    }

    fn confirmed(&self, keep: impl Fn(&Transaction) -> bool) -> Vec<ConfirmedTransaction> {
        let mut out = Vec::new();
        for block in &self.blocks[1..] {
            for tx in &block.transactions {
                if keep(tx) {
                    out.push(ConfirmedTransaction {
                        transaction: tx.clone(),
                        block_index: block.index,
                        block_timestamp: block.timestamp,
                        block_hash: block.hash.unwrap_or(Hash::ZERO),
                    });
                }
            }
        }
        out
    }

    /// Point-in-time statistics.
    pub fn stats(&self) -> ChainStats {
        let total_transactions = self.blocks[1..].iter().map(Block::tx_count).sum();
        ChainStats {
            total_blocks: self.blocks.len(),
            total_transactions,
            certified_transactions: self.certified_transactions().len(),
            pending_transactions: self.pool.len(),
            consensus: self.consensus.kind(),
            difficulty: self.consensus.difficulty(),
            last_block_hash: self.last_block().hash,
            validator_count: self.consensus.registry().map_or(0, |r| r.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tx(title: &str) -> Transaction {
        Transaction::new().with("title", json!(title))
    }

    fn poa_chain() -> (Chain, Keypair) {
        let kp = Keypair::generate();
        let mut chain = Chain::new(Consensus::poa());
        chain.add_validator(kp.public_key()).unwrap();
        (chain, kp)
    }

    #[test]
    fn test_new_chain_has_valid_genesis() {
        let chain = Chain::new(Consensus::poa());
        assert_eq!(chain.len(), 1);
        assert!(chain.last_block().is_genesis());
        chain.validate().unwrap();
    }

    #[test]
    fn test_mine_empty_pool_is_benign() {
        let (mut chain, kp) = poa_chain();
        assert_eq!(chain.mine(Some(&kp)).unwrap(), None);
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_mine_appends_and_clears_pool() {
        let (mut chain, kp) = poa_chain();
        chain.submit_transaction(tx("A"));

        let index = chain.mine(Some(&kp)).unwrap();
        assert_eq!(index, Some(1));
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.pending_count(), 0);
        assert_eq!(
            chain.blocks()[1].previous_hash,
            chain.blocks()[0].sealed_hash().unwrap()
        );
        chain.validate_with_consensus().unwrap();
    }

    #[test]
    fn test_failed_mine_leaves_state_untouched() {
        let (mut chain, _kp) = poa_chain();
        chain.submit_transaction(tx("B"));

        let outsider = Keypair::generate();
        let err = chain.mine(Some(&outsider)).unwrap_err();
        assert!(matches!(
            err,
            ChainError::Consensus(ConsensusError::UnauthorizedSigner)
        ));
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.pending_count(), 1);
    }

    #[test]
    fn test_mine_without_key_under_poa_fails() {
        let (mut chain, _kp) = poa_chain();
        chain.submit_transaction(tx("A"));

        let err = chain.mine(None).unwrap_err();
        assert!(matches!(
            err,
            ChainError::Consensus(ConsensusError::MissingSigningKey)
        ));
        assert_eq!(chain.pending_count(), 1);
    }

    #[test]
    fn test_mine_includes_all_pending_in_order() {
        let (mut chain, kp) = poa_chain();
        chain.submit_transaction(tx("A"));
        chain.submit_transaction(tx("B"));
        chain.mine(Some(&kp)).unwrap();

        let block = &chain.blocks()[1];
        assert_eq!(block.tx_count(), 2);
        assert_eq!(block.transactions[0].get("title"), Some(&json!("A")));
        assert_eq!(block.transactions[1].get("title"), Some(&json!("B")));
    }

    #[test]
    fn test_pow_mining() {
        let mut chain = Chain::new(Consensus::pow(2));
        chain.submit_transaction(tx("A"));

        let index = chain.mine(None).unwrap();
        assert_eq!(index, Some(1));
        let mined = &chain.blocks()[1];
        assert!(mined.sealed_hash().unwrap().meets_difficulty(2));
        assert!(mined.validator.is_none());
        chain.validate_with_consensus().unwrap();
    }

    #[test]
    fn test_validator_admin_rejected_under_pow() {
        let mut chain = Chain::new(Consensus::pow(1));
        let key = Keypair::generate().public_key();

        assert!(matches!(
            chain.add_validator(key),
            Err(ChainError::ValidatorsUnsupported)
        ));
        assert!(matches!(
            chain.remove_validator(&key),
            Err(ChainError::ValidatorsUnsupported)
        ));
        assert!(chain.validators().is_empty());
        assert!(!chain.is_validator_authorized(&key));
    }

    #[test]
    fn test_validate_detects_tampered_transaction() {
        let (mut chain, kp) = poa_chain();
        chain.submit_transaction(tx("A"));
        chain.mine(Some(&kp)).unwrap();

        let mut blocks = chain.export_blocks();
        blocks[1].transactions[0].set("title", json!("tampered"));
        assert!(matches!(
            Chain::validate_blocks(&blocks),
            Err(ChainError::InvalidChain(_))
        ));
    }

    #[test]
    fn test_validate_detects_broken_linkage() {
        let (mut chain, kp) = poa_chain();
        chain.submit_transaction(tx("A"));
        chain.mine(Some(&kp)).unwrap();
        chain.submit_transaction(tx("B"));
        chain.mine(Some(&kp)).unwrap();

        let mut blocks = chain.export_blocks();
        // Re-link block 2 to a bogus predecessor, keeping its own hash
        // consistent with its (tampered) content.
        blocks[2].previous_hash = certchain_core::sha256(b"elsewhere");
        blocks[2].hash = Some(blocks[2].compute_hash());
        assert!(matches!(
            Chain::validate_blocks(&blocks),
            Err(ChainError::InvalidChain(_))
        ));
    }

    #[test]
    fn test_import_rejects_invalid_and_preserves_current() {
        let (mut chain, kp) = poa_chain();
        chain.submit_transaction(tx("A"));
        chain.mine(Some(&kp)).unwrap();
        let hashes_before: Vec<_> = chain.blocks().iter().map(|b| b.hash).collect();

        let mut forged = chain.export_blocks();
        forged[1].timestamp += 1;
        assert!(chain.import_blocks(forged).is_err());

        let hashes_after: Vec<_> = chain.blocks().iter().map(|b| b.hash).collect();
        assert_eq!(hashes_before, hashes_after);
    }

    #[test]
    fn test_export_import_json_roundtrip() {
        let (mut chain, kp) = poa_chain();
        chain.submit_transaction(tx("A"));
        chain.mine(Some(&kp)).unwrap();

        let json = chain.export_json().unwrap();
        let mut other = Chain::new(Consensus::poa());
        let len = other.import_json(&json).unwrap();

        assert_eq!(len, 2);
        assert_eq!(chain.blocks(), other.blocks());
    }

    #[test]
    fn test_certified_and_address_queries() {
        let (mut chain, kp) = poa_chain();
        chain.submit_transaction(
            tx("A")
                .with("status", json!("validated"))
                .with("from", json!("alice")),
        );
        chain.submit_transaction(tx("B").with("status", json!("pending")).with("to", json!("bob")));
        chain.mine(Some(&kp)).unwrap();

        let certified = chain.certified_transactions();
        assert_eq!(certified.len(), 1);
        assert_eq!(certified[0].block_index, 1);
        assert_eq!(certified[0].transaction.get("title"), Some(&json!("A")));

        assert_eq!(chain.transactions_for("alice").len(), 1);
        assert_eq!(chain.transactions_for("bob").len(), 1);
        assert!(chain.transactions_for("carol").is_empty());
    }

    #[test]
    fn test_stats() {
        let (mut chain, kp) = poa_chain();
        chain.submit_transaction(tx("A").with("status", json!("validated")));
        chain.mine(Some(&kp)).unwrap();
        chain.submit_transaction(tx("B"));

        let stats = chain.stats();
        assert_eq!(stats.total_blocks, 2);
        assert_eq!(stats.total_transactions, 1);
        assert_eq!(stats.certified_transactions, 1);
        assert_eq!(stats.pending_transactions, 1);
        assert_eq!(stats.consensus, ConsensusKind::ProofOfAuthority);
        assert_eq!(stats.difficulty, None);
        assert_eq!(stats.validator_count, 1);
        assert_eq!(stats.last_block_hash, chain.last_block().hash);
    }

    #[test]
    fn test_retroactive_revocation_fails_strict_validation() {
        let (mut chain, kp) = poa_chain();
        chain.submit_transaction(tx("A"));
        chain.mine(Some(&kp)).unwrap();
        chain.validate_with_consensus().unwrap();

        chain.remove_validator(&kp.public_key()).unwrap();

        // Structural validation still passes; the stricter variant does not.
        chain.validate().unwrap();
        assert!(chain.validate_with_consensus().is_err());
    }
}
