use crate::report::{run_calculation, CalculateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use contribution::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Contribution Calculator",
    about = "Compute social-insurance contribution bases and employer fees",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Calculate contributions from salary and city standard sheets without a server
    Calculate(CalculateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the city whose contribution standard is applied
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Persist tables as JSON files in this directory instead of memory
    #[arg(long)]
    pub(crate) store_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Calculate(args) => run_calculation(args),
    }
}
