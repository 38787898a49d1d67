//! Initialize chain command.

use crate::state::{ChainFile, ConsensusChoice};
use anyhow::{bail, Result};
use certchain_chain::Chain;
use certchain_consensus::Consensus;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct InitArgs {
    /// Chain file to create
    #[arg(short, long, default_value = "certchain.json")]
    file: PathBuf,

    /// Consensus strategy
    #[arg(short, long, value_enum, default_value_t = ConsensusChoice::Poa)]
    consensus: ConsensusChoice,

    /// Proof-of-work difficulty (leading zero hex characters)
    #[arg(short, long, default_value = "2")]
    difficulty: usize,

    /// Overwrite an existing chain file
    #[arg(long)]
    force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    if args.file.exists() && !args.force {
        bail!(
            "chain file {} already exists (use --force to overwrite)",
            args.file.display()
        );
    }

    let consensus = match args.consensus {
        ConsensusChoice::Poa => Consensus::poa(),
        ConsensusChoice::Pow => Consensus::pow(args.difficulty),
    };
    let chain = Chain::new(consensus);
    let genesis_hash = chain.last_block().sealed_hash()?;

    ChainFile::from_chain(&chain).save(&args.file)?;

    println!("{}  Created chain file", "✓".green().bold());
    println!("    File: {}", args.file.display().to_string().bright_black());
    println!("    Consensus: {}", chain.consensus().kind().to_string().bright_cyan());
    println!("    Genesis: {}", genesis_hash.to_hex().bright_yellow());

    if matches!(args.consensus, ConsensusChoice::Poa) {
        println!();
        println!("Next steps:");
        println!(
            "  • Use {} to create a validator keypair",
            "certchain keygen".bright_cyan()
        );
        println!(
            "  • Use {} to authorize it",
            "certchain validator add".bright_cyan()
        );
    }

    Ok(())
}
