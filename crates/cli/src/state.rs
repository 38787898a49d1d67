//! On-disk CLI state.
//!
//! One JSON file wraps the core export format (the block sequence) together
//! with the knobs the ledger cannot reconstruct from blocks alone: consensus
//! choice, difficulty, registry snapshot, and the pending pool. The core
//! stays storage-free; all file IO lives here.

use anyhow::{Context, Result};
use certchain_chain::Chain;
use certchain_consensus::Consensus;
use certchain_core::{Block, Transaction};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Which consensus strategy the chain file was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusChoice {
    /// Proof of authority (signed blocks)
    Poa,
    /// Proof of work (nonce search)
    Pow,
}

/// Serialized chain state, round-tripped by every CLI invocation.
#[derive(Serialize, Deserialize)]
pub struct ChainFile {
    pub consensus: ConsensusChoice,
    pub difficulty: usize,
    /// Hex-encoded validator public keys.
    pub validators: Vec<String>,
    pub pending: Vec<Transaction>,
    pub blocks: Vec<Block>,
}

impl ChainFile {
    /// Read and parse a chain file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read chain file {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("failed to parse chain file {}", path.display()))
    }

    /// Write the chain file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)
            .with_context(|| format!("failed to write chain file {}", path.display()))
    }

    /// Capture a live chain into file form.
    pub fn from_chain(chain: &Chain) -> Self {
        let mut validators: Vec<String> = chain
            .validators()
            .iter()
            .map(|key| key.to_hex())
            .collect();
        validators.sort();

        Self {
            consensus: match chain.consensus().kind() {
                certchain_consensus::ConsensusKind::ProofOfAuthority => ConsensusChoice::Poa,
                certchain_consensus::ConsensusKind::ProofOfWork => ConsensusChoice::Pow,
            },
            difficulty: chain.consensus().difficulty().unwrap_or(0),
            validators,
            pending: chain.pending_transactions(),
            blocks: chain.export_blocks(),
        }
    }

    /// Rebuild the live chain: consensus, registry, block sequence (fully
    /// re-validated on import), then the pending pool.
    pub fn into_chain(self) -> Result<Chain> {
        let consensus = match self.consensus {
            ConsensusChoice::Poa => {
                let mut consensus = Consensus::poa();
                if let Some(registry) = consensus.registry_mut() {
                    for key in &self.validators {
                        registry
                            .add_hex(key)
                            .with_context(|| format!("invalid validator key {key}"))?;
                    }
                }
                consensus
            }
            ConsensusChoice::Pow => Consensus::pow(self.difficulty),
        };

        let mut chain = Chain::new(consensus);
        chain
            .import_blocks(self.blocks)
            .context("chain file failed validation")?;
        for tx in self.pending {
            chain.submit_transaction(tx);
        }
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certchain_core::Keypair;
    use serde_json::json;

    #[test]
    fn test_chain_file_roundtrip() {
        let kp = Keypair::generate();
        let mut chain = Chain::new(Consensus::poa());
        chain.add_validator(kp.public_key()).unwrap();
        chain.submit_transaction(Transaction::new().with("title", json!("A")));
        chain.mine(Some(&kp)).unwrap();
        chain.submit_transaction(Transaction::new().with("title", json!("B")));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json");

        ChainFile::from_chain(&chain).save(&path).unwrap();
        let restored = ChainFile::load(&path).unwrap().into_chain().unwrap();

        assert_eq!(restored.blocks(), chain.blocks());
        assert_eq!(restored.pending_count(), 1);
        assert!(restored.is_validator_authorized(&kp.public_key()));
    }

    #[test]
    fn test_tampered_chain_file_rejected() {
        let mut chain = Chain::new(Consensus::pow(1));
        chain.submit_transaction(Transaction::new().with("title", json!("A")));
        chain.mine(None).unwrap();

        let mut file = ChainFile::from_chain(&chain);
        file.blocks[1].timestamp += 1;
        assert!(file.into_chain().is_err());
    }
}
