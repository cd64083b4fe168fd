use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "scl",
    about = "Supply Chain Ledger: a stage-gated block chain of supply-chain events",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Session configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Where option 4 writes the ledger
    #[arg(long, global = true)]
    pub export: Option<PathBuf>,

    /// Fixed seed for reproducible block hashes and return numbers
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and start the interactive ledger session (default)
    Run,
    /// List the stages and the fields each one collects
    Stages,
    /// Check the chain links of an exported ledger file
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Export file to check; defaults to the configured export path
    pub file: Option<PathBuf>,
}
