//! Proof of Work sealing and verification.
//!
//! The fallback strategy: brute-force the nonce until the block hash starts
//! with `difficulty` zero hex characters. The search is unbounded; callers
//! that need bounded latency use [`seal_block_until`], which checks a
//! cancellation flag between nonce increments.

use crate::{ConsensusError, Result};
use certchain_core::{Block, Hash};
use std::sync::atomic::{AtomicBool, Ordering};

/// Seal a candidate block by nonce search. Returns the winning hash.
///
/// Unbounded worst case at high difficulty.
pub fn seal_block(block: &mut Block, difficulty: usize) -> Result<Hash> {
    let never = AtomicBool::new(false);
    seal_block_until(block, difficulty, &never)
}

/// Seal a candidate block by nonce search, aborting with
/// [`ConsensusError::Cancelled`] once `cancel` becomes true.
pub fn seal_block_until(block: &mut Block, difficulty: usize, cancel: &AtomicBool) -> Result<Hash> {
    if block.is_sealed() {
        return Err(certchain_core::BlockError::AlreadySealed.into());
    }

    block.nonce = 0;
    let mut hash = block.compute_hash();
    while !hash.meets_difficulty(difficulty) {
        if cancel.load(Ordering::Relaxed) {
            return Err(ConsensusError::Cancelled);
        }
        block.nonce += 1;
        hash = block.compute_hash();
    }

    block.seal(hash)?;
    Ok(hash)
}

/// Verify a sealed block's work proof.
///
/// The recorded hash must meet the difficulty target and equal the recomputed
/// content hash; a hash that recomputes correctly but misses the target is
/// rejected.
pub fn verify_block(block: &Block, difficulty: usize) -> Result<()> {
    let hash = block
        .sealed_hash()
        .map_err(|_| ConsensusError::MissingProof)?;

    if !hash.meets_difficulty(difficulty) {
        return Err(ConsensusError::DifficultyNotMet { difficulty });
    }

    block.verify_integrity()?;
    Ok(())
}
