//! CLI commands module.

use anyhow::Result;
use clap::Subcommand;

mod init;
mod keygen;
mod mine;
mod show;
mod stats;
mod submit;
mod validator;
mod verify;

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new chain file
    Init(init::InitArgs),
    /// Generate a validator keypair
    Keygen(keygen::KeygenArgs),
    /// Manage the validator registry
    Validator(validator::ValidatorArgs),
    /// Queue a certification transaction
    Submit(submit::SubmitArgs),
    /// Mine the pending transactions into a block
    Mine(mine::MineArgs),
    /// List blocks
    Show(show::ShowArgs),
    /// Show chain statistics
    Stats(stats::StatsArgs),
    /// Verify chain integrity
    Verify(verify::VerifyArgs),
}

pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init(args) => init::run(args),
        Commands::Keygen(args) => keygen::run(args),
        Commands::Validator(args) => validator::run(args),
        Commands::Submit(args) => submit::run(args),
        Commands::Mine(args) => mine::run(args),
        Commands::Show(args) => show::run(args),
        Commands::Stats(args) => stats::run(args),
        Commands::Verify(args) => verify::run(args),
    }
}
