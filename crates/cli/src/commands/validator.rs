//! Validator registry administration.

use crate::state::ChainFile;
use anyhow::{Context, Result};
use certchain_core::PublicKey;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct ValidatorArgs {
    /// Chain file to operate on
    #[arg(short, long, default_value = "certchain.json")]
    file: PathBuf,

    #[command(subcommand)]
    command: ValidatorCommand,
}

#[derive(Subcommand)]
enum ValidatorCommand {
    /// Authorize a validator public key (hex)
    Add { key: String },
    /// Revoke a validator public key (hex)
    Remove { key: String },
    /// List authorized validators
    List,
}

pub fn run(args: ValidatorArgs) -> Result<()> {
    let mut chain = ChainFile::load(&args.file)?.into_chain()?;

    match args.command {
        ValidatorCommand::Add { key } => {
            let identity = PublicKey::from_hex(&key).context("invalid validator key")?;
            let inserted = chain.add_validator(identity)?;
            ChainFile::from_chain(&chain).save(&args.file)?;
            if inserted {
                println!("{}  Validator authorized: {}", "✓".green().bold(), key.bright_yellow());
            } else {
                println!("Validator already authorized: {}", key.bright_yellow());
            }
        }
        ValidatorCommand::Remove { key } => {
            let identity = PublicKey::from_hex(&key).context("invalid validator key")?;
            let removed = chain.remove_validator(&identity)?;
            ChainFile::from_chain(&chain).save(&args.file)?;
            if removed {
                println!("{}  Validator revoked: {}", "✓".green().bold(), key.bright_yellow());
            } else {
                println!("Validator was not authorized: {}", key.bright_yellow());
            }
        }
        ValidatorCommand::List => {
            let mut validators: Vec<String> =
                chain.validators().iter().map(|v| v.to_hex()).collect();
            validators.sort();
            if validators.is_empty() {
                println!("No validators authorized.");
            }
            for key in validators {
                println!("  {}", key.bright_yellow());
            }
        }
    }

    Ok(())
}
