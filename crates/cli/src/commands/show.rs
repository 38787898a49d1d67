//! List blocks.

use crate::state::ChainFile;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct ShowArgs {
    /// Chain file to operate on
    #[arg(short, long, default_value = "certchain.json")]
    file: PathBuf,

    /// Number of most recent blocks to show
    #[arg(short, long, default_value = "10")]
    count: usize,
}

pub fn run(args: ShowArgs) -> Result<()> {
    let chain = ChainFile::load(&args.file)?.into_chain()?;
    let blocks = chain.blocks();
    let start = blocks.len().saturating_sub(args.count);

    for block in &blocks[start..] {
        let hash = block.sealed_hash()?;
        println!(
            "{} {}",
            format!("#{}", block.index).bright_cyan().bold(),
            hash.to_hex().bright_yellow()
        );
        println!("    transactions: {}", block.tx_count());
        println!("    timestamp:    {}", block.timestamp);
        match &block.validator {
            Some(validator) => println!("    validator:    {}", validator.to_hex().bright_black()),
            None => println!("    nonce:        {}", block.nonce),
        }
    }

    Ok(())
}
