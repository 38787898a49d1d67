//! Queue a certification transaction.

use crate::state::ChainFile;
use anyhow::{Context, Result};
use certchain_core::Transaction;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct SubmitArgs {
    /// Chain file to operate on
    #[arg(short, long, default_value = "certchain.json")]
    file: PathBuf,

    /// Transaction payload as a JSON object
    #[arg(short, long)]
    data: String,
}

pub fn run(args: SubmitArgs) -> Result<()> {
    let tx: Transaction =
        serde_json::from_str(&args.data).context("transaction data must be a JSON object")?;

    let mut chain = ChainFile::load(&args.file)?.into_chain()?;
    let position = chain.submit_transaction(tx);
    ChainFile::from_chain(&chain).save(&args.file)?;

    println!(
        "{}  Transaction queued at position {}",
        "✓".green().bold(),
        position.to_string().bright_cyan()
    );
    println!(
        "    {} pending transaction(s)",
        chain.pending_count().to_string().bright_cyan()
    );

    Ok(())
}
