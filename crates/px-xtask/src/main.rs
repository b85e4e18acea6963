use clap::{Parser, Subcommand};

use xtask::error_codes::ErrorCodes;

#[derive(Debug, Parser)]
struct Cli {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Regenerate `px-compiler/src/diagnostics/codes.rs` from
    /// `px-compiler/error-codes.yaml`.
    ErrorCodes(ErrorCodes),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::ErrorCodes(cmd) => cmd.run(),
    }
}
