//! Generate a validator keypair.

use anyhow::Result;
use certchain_core::Keypair;
use clap::Args;
use colored::Colorize;

#[derive(Args)]
pub struct KeygenArgs {}

pub fn run(_args: KeygenArgs) -> Result<()> {
    let keypair = Keypair::generate();

    println!("{}  Generated keypair", "✓".green().bold());
    println!(
        "    Public key:  {}",
        keypair.public_key().to_hex().bright_yellow()
    );
    println!(
        "    Private key: {}",
        hex::encode(keypair.private_key()).bright_red()
    );
    println!();
    println!(
        "Keep the private key secret; pass it to {} when sealing blocks.",
        "certchain mine --key".bright_cyan()
    );

    Ok(())
}
