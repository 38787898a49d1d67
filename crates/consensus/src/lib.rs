//! Consensus strategies for certchain.
//!
//! Two strategies share one contract: `seal` produces the proof that
//! legitimizes a candidate block, `verify` checks the proof on a sealed one.
//!
//! - **Proof of Authority**: a registered validator signs the block hash with
//!   its private key; verification re-checks registry membership and the
//!   signature.
//! - **Proof of Work** (fallback): a nonce search until the block hash meets a
//!   leading-zero difficulty target.
//!
//! # Example
//!
//! ```rust
//! use certchain_consensus::Consensus;
//! use certchain_core::{Block, Hash, Keypair, Transaction};
//!
//! let kp = Keypair::generate();
//! let mut consensus = Consensus::poa();
//! consensus
//!     .registry_mut()
//!     .unwrap()
//!     .add(kp.public_key());
//!
//! let mut block = Block::new(1, vec![Transaction::new()], 0, Hash::ZERO);
//! consensus.seal(&mut block, Some(&kp)).unwrap();
//! consensus.verify(&block).unwrap();
//! ```

pub mod poa;
pub mod pow;
pub mod registry;

use certchain_core::{Block, BlockError, Keypair};
use std::fmt;
use thiserror::Error;

// Re-export commonly used types
pub use poa::ProofOfAuthority;
pub use registry::{RegistryError, ValidatorRegistry};

/// Errors that can occur while sealing or verifying a block.
#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("proof of authority requires a signing key")]
    MissingSigningKey,

    #[error("signer is not an authorized validator")]
    UnauthorizedSigner,

    #[error("block is missing its validator identity or signature")]
    MissingProof,

    #[error("block signature does not match its hash")]
    InvalidSignature,

    #[error("block hash does not meet difficulty {difficulty}")]
    DifficultyNotMet { difficulty: usize },

    #[error("proof-of-work search was cancelled")]
    Cancelled,

    #[error(transparent)]
    Block(#[from] BlockError),
}

pub type Result<T> = std::result::Result<T, ConsensusError>;

/// Which consensus strategy a chain runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsensusKind {
    ProofOfAuthority,
    ProofOfWork,
}

impl fmt::Display for ConsensusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsensusKind::ProofOfAuthority => write!(f, "poa"),
            ConsensusKind::ProofOfWork => write!(f, "pow"),
        }
    }
}

/// The active consensus strategy, dispatched exhaustively at every seal and
/// verification site.
pub enum Consensus {
    ProofOfAuthority(ProofOfAuthority),
    ProofOfWork { difficulty: usize },
}

impl Consensus {
    /// Proof of authority with an empty validator registry.
    pub fn poa() -> Self {
        Self::ProofOfAuthority(ProofOfAuthority::new())
    }

    /// Proof of work at the given difficulty (leading zero hex characters).
    pub fn pow(difficulty: usize) -> Self {
        Self::ProofOfWork { difficulty }
    }

    /// The strategy tag.
    pub fn kind(&self) -> ConsensusKind {
        match self {
            Self::ProofOfAuthority(_) => ConsensusKind::ProofOfAuthority,
            Self::ProofOfWork { .. } => ConsensusKind::ProofOfWork,
        }
    }

    /// The proof-of-work difficulty, if applicable.
    pub fn difficulty(&self) -> Option<usize> {
        match self {
            Self::ProofOfAuthority(_) => None,
            Self::ProofOfWork { difficulty } => Some(*difficulty),
        }
    }

    /// The validator registry, present only under proof of authority.
    pub fn registry(&self) -> Option<&ValidatorRegistry> {
        match self {
            Self::ProofOfAuthority(poa) => Some(poa.registry()),
            Self::ProofOfWork { .. } => None,
        }
    }

    /// Mutable access to the validator registry under proof of authority.
    pub fn registry_mut(&mut self) -> Option<&mut ValidatorRegistry> {
        match self {
            Self::ProofOfAuthority(poa) => Some(poa.registry_mut()),
            Self::ProofOfWork { .. } => None,
        }
    }

    /// Produce the proof for a candidate block and seal it.
    ///
    /// Proof of authority requires `signer`; proof of work ignores it. On any
    /// failure the candidate is left unsealed apart from scratch proof fields,
    /// and callers discard it.
    pub fn seal(&self, block: &mut Block, signer: Option<&Keypair>) -> Result<()> {
        match self {
            Self::ProofOfAuthority(poa) => {
                let signer = signer.ok_or(ConsensusError::MissingSigningKey)?;
                poa.seal_block(block, signer)
            }
            Self::ProofOfWork { difficulty } => {
                pow::seal_block(block, *difficulty)?;
                Ok(())
            }
        }
    }

    /// Check the proof on a sealed block.
    pub fn verify(&self, block: &Block) -> Result<()> {
        match self {
            Self::ProofOfAuthority(poa) => poa.verify_block(block),
            Self::ProofOfWork { difficulty } => pow::verify_block(block, *difficulty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certchain_core::{Hash, Transaction};
    use serde_json::json;

    fn candidate() -> Block {
        let tx = Transaction::new().with("title", json!("A"));
        Block::new(1, vec![tx], 1_700_000_000, Hash::ZERO)
    }

    #[test]
    fn test_poa_requires_signing_key() {
        let consensus = Consensus::poa();
        let mut block = candidate();
        assert!(matches!(
            consensus.seal(&mut block, None),
            Err(ConsensusError::MissingSigningKey)
        ));
        assert!(!block.is_sealed());
    }

    #[test]
    fn test_pow_ignores_signer() {
        let kp = Keypair::generate();
        let consensus = Consensus::pow(1);
        let mut block = candidate();
        consensus.seal(&mut block, Some(&kp)).unwrap();
        assert!(block.validator.is_none());
        assert!(block.signature.is_none());
        consensus.verify(&block).unwrap();
    }

    #[test]
    fn test_seal_verify_roundtrip_poa() {
        let kp = Keypair::generate();
        let mut consensus = Consensus::poa();
        consensus.registry_mut().unwrap().add(kp.public_key());

        let mut block = candidate();
        consensus.seal(&mut block, Some(&kp)).unwrap();
        consensus.verify(&block).unwrap();
    }

    #[test]
    fn test_kind_and_difficulty_accessors() {
        assert_eq!(Consensus::poa().kind(), ConsensusKind::ProofOfAuthority);
        assert_eq!(Consensus::pow(3).kind(), ConsensusKind::ProofOfWork);
        assert_eq!(Consensus::pow(3).difficulty(), Some(3));
        assert_eq!(Consensus::poa().difficulty(), None);
        assert!(Consensus::pow(3).registry().is_none());
        assert_eq!(ConsensusKind::ProofOfAuthority.to_string(), "poa");
        assert_eq!(ConsensusKind::ProofOfWork.to_string(), "pow");
    }
}
