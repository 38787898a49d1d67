//! Proof of Authority sealing and verification.
//!
//! A candidate block is sealed by a registered validator: the validator
//! identity goes into the hashed content, the hash is computed and fixed, and
//! the signature is produced over the hash bytes. Because the signature is not
//! part of the hashed content, verification can check it against the very hash
//! it signs.

use crate::registry::ValidatorRegistry;
use crate::{ConsensusError, Result};
use certchain_core::{Block, Keypair};

/// Proof-of-authority strategy: owns the validator registry and implements
/// the seal/verify contract against it.
#[derive(Debug, Default)]
pub struct ProofOfAuthority {
    registry: ValidatorRegistry,
}

impl ProofOfAuthority {
    /// Create a strategy with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a strategy around an existing registry.
    pub fn with_registry(registry: ValidatorRegistry) -> Self {
        Self { registry }
    }

    /// The validator registry.
    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Mutable access to the validator registry.
    pub fn registry_mut(&mut self) -> &mut ValidatorRegistry {
        &mut self.registry
    }

    /// Seal a candidate block with the signer's authority.
    ///
    /// Derives the signer's public identity, checks it against the registry,
    /// records it as the block's validator, seals the hash, and attaches the
    /// signature over the hash bytes.
    pub fn seal_block(&self, block: &mut Block, signer: &Keypair) -> Result<()> {
        let identity = signer.public_key();
        if !self.registry.is_authorized(&identity) {
            return Err(ConsensusError::UnauthorizedSigner);
        }

        block.validator = Some(identity);
        let hash = block.compute_hash();
        block.seal(hash)?;
        block.signature = Some(signer.sign(hash.as_bytes()));
        Ok(())
    }

    /// Verify a sealed block's authority proof.
    ///
    /// Registry membership is checked at verification time, not sealing time:
    /// revoking a validator retroactively invalidates acceptance of its
    /// blocks. That is deliberate policy.
    pub fn verify_block(&self, block: &Block) -> Result<()> {
        let (validator, signature) = match (&block.validator, &block.signature) {
            (Some(validator), Some(signature)) => (validator, signature),
            _ => return Err(ConsensusError::MissingProof),
        };

        if !self.registry.is_authorized(validator) {
            return Err(ConsensusError::UnauthorizedSigner);
        }

        let hash = block
            .sealed_hash()
            .map_err(|_| ConsensusError::MissingProof)?;
        if !validator.verify(hash.as_bytes(), signature) {
            return Err(ConsensusError::InvalidSignature);
        }

        Ok(())
    }
}
