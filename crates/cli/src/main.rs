//! certchain CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod state;

#[derive(Parser)]
#[command(name = "certchain")]
#[command(about = "A housing-certification ledger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<commands::Commands>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(cmd) => {
            if let Err(e) = commands::run(cmd) {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("certchain - a housing-certification ledger");
            println!("Run 'certchain --help' for usage information.");
        }
    }
}
