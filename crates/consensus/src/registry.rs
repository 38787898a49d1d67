//! The set of validator identities authorized to seal blocks.

use certchain_core::{CryptoError, PublicKey};
use std::collections::HashSet;
use thiserror::Error;

/// Errors from registry administration.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("malformed validator key material: {0}")]
    MalformedKey(#[from] CryptoError),
}

/// Authorized validator identities, unique by key value.
///
/// Membership is consulted both when sealing (may this key sign?) and when
/// verifying (is the stated signer still authorized?). Lives only in process
/// memory.
#[derive(Debug, Default, Clone)]
pub struct ValidatorRegistry {
    validators: HashSet<PublicKey>,
}

impl ValidatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Authorize a validator. Idempotent; returns `true` if newly inserted.
    pub fn add(&mut self, identity: PublicKey) -> bool {
        self.validators.insert(identity)
    }

    /// Authorize a validator from hex-encoded key material.
    ///
    /// Fails on empty or otherwise malformed material; this is the validation
    /// boundary for identities arriving as text.
    pub fn add_hex(&mut self, hex_key: &str) -> Result<PublicKey, RegistryError> {
        let identity = PublicKey::from_hex(hex_key)?;
        self.add(identity);
        Ok(identity)
    }

    /// Revoke a validator. Removing a non-member is a no-op.
    pub fn remove(&mut self, identity: &PublicKey) -> bool {
        self.validators.remove(identity)
    }

    /// Whether an identity is currently authorized.
    pub fn is_authorized(&self, identity: &PublicKey) -> bool {
        self.validators.contains(identity)
    }

    /// Defensive copy of the current validator set.
    pub fn snapshot(&self) -> HashSet<PublicKey> {
        self.validators.clone()
    }

    /// Number of authorized validators.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Whether no validators are authorized.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certchain_core::Keypair;

    #[test]
    fn test_add_is_idempotent() {
        let mut registry = ValidatorRegistry::new();
        let key = Keypair::generate().public_key();

        assert!(registry.add(key));
        assert!(!registry.add(key));
        assert_eq!(registry.len(), 1);
        assert!(registry.is_authorized(&key));
    }

    #[test]
    fn test_remove_nonmember_is_noop() {
        let mut registry = ValidatorRegistry::new();
        let key = Keypair::generate().public_key();

        assert!(!registry.remove(&key));

        registry.add(key);
        assert!(registry.remove(&key));
        assert!(!registry.is_authorized(&key));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_hex_rejects_malformed_material() {
        let mut registry = ValidatorRegistry::new();

        assert!(matches!(
            registry.add_hex(""),
            Err(RegistryError::MalformedKey(_))
        ));
        assert!(registry.add_hex("not hex").is_err());
        assert!(registry.add_hex("abcd").is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_hex_roundtrip() {
        let mut registry = ValidatorRegistry::new();
        let key = Keypair::generate().public_key();

        let added = registry.add_hex(&key.to_hex()).unwrap();
        assert_eq!(added, key);
        assert!(registry.is_authorized(&key));
    }

    #[test]
    fn test_snapshot_is_defensive() {
        let mut registry = ValidatorRegistry::new();
        let key = Keypair::generate().public_key();
        registry.add(key);

        let mut snapshot = registry.snapshot();
        snapshot.clear();

        assert!(registry.is_authorized(&key));
        assert_eq!(registry.len(), 1);
    }
}
