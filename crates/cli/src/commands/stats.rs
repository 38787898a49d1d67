//! Show chain statistics.

use crate::state::ChainFile;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct StatsArgs {
    /// Chain file to operate on
    #[arg(short, long, default_value = "certchain.json")]
    file: PathBuf,
}

pub fn run(args: StatsArgs) -> Result<()> {
    let chain = ChainFile::load(&args.file)?.into_chain()?;
    let stats = chain.stats();

    println!("{}", "Chain statistics".bold().cyan());
    println!("  Blocks:                  {}", stats.total_blocks);
    println!("  Confirmed transactions:  {}", stats.total_transactions);
    println!("  Certified transactions:  {}", stats.certified_transactions);
    println!("  Pending transactions:    {}", stats.pending_transactions);
    println!("  Consensus:               {}", stats.consensus);
    if let Some(difficulty) = stats.difficulty {
        println!("  Difficulty:              {}", difficulty);
    } else {
        println!("  Validators:              {}", stats.validator_count);
    }
    if let Some(hash) = stats.last_block_hash {
        println!("  Last block hash:         {}", hash.to_hex().bright_yellow());
    }

    Ok(())
}
