//! Verify chain integrity.

use crate::state::ChainFile;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct VerifyArgs {
    /// Chain file to operate on
    #[arg(short, long, default_value = "certchain.json")]
    file: PathBuf,

    /// Additionally re-check every block's consensus proof
    #[arg(long)]
    strict: bool,
}

pub fn run(args: VerifyArgs) -> Result<()> {
    let chain = ChainFile::load(&args.file)?.into_chain()?;

    let result = if args.strict {
        chain.validate_with_consensus()
    } else {
        chain.validate()
    };

    match result {
        Ok(()) => {
            println!(
                "{}  Chain is valid ({} blocks)",
                "✓".green().bold(),
                chain.len().to_string().bright_cyan()
            );
            Ok(())
        }
        Err(err) => {
            println!("{}  Chain is invalid: {}", "✗".red().bold(), err);
            std::process::exit(1);
        }
    }
}
