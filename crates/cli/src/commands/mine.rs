//! Mine the pending transactions into a block.

use crate::state::ChainFile;
use anyhow::{Context, Result};
use certchain_core::Keypair;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct MineArgs {
    /// Chain file to operate on
    #[arg(short, long, default_value = "certchain.json")]
    file: PathBuf,

    /// Hex-encoded private key of an authorized validator (proof of authority)
    #[arg(short, long)]
    key: Option<String>,
}

pub fn run(args: MineArgs) -> Result<()> {
    let signer = args
        .key
        .as_deref()
        .map(Keypair::from_hex)
        .transpose()
        .context("invalid signing key")?;

    let mut chain = ChainFile::load(&args.file)?.into_chain()?;

    match chain.mine(signer.as_ref())? {
        Some(index) => {
            ChainFile::from_chain(&chain).save(&args.file)?;
            let block = &chain.blocks()[index as usize];
            println!("{}  Block {} sealed", "✓".green().bold(), index.to_string().bright_cyan());
            println!(
                "    Hash: {}",
                block.sealed_hash()?.to_hex().bright_yellow()
            );
            println!(
                "    Transactions: {}",
                block.tx_count().to_string().bright_cyan()
            );
        }
        None => {
            println!("Nothing to mine: the pending pool is empty.");
        }
    }

    Ok(())
}
