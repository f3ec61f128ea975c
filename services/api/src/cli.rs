use crate::demo::{run_check, run_import, CheckArgs, ImportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use credit_engine::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Credit Approval Service",
    about = "Run the credit approval HTTP service or evaluate seed data from the command line",
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
    /// Evaluate a single loan request against seeded customer data
    Check(CheckArgs),
    /// Validate customer and loan CSV exports and print an import summary
    Import(ImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Customer CSV export to seed the store with
    #[arg(long)]
    pub(crate) customers: Option<PathBuf>,
    /// Loan CSV export to seed the store with (requires --customers)
    #[arg(long, requires = "customers")]
    pub(crate) loans: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Check(args) => run_check(args),
        Command::Import(args) => run_import(args),
    }
}
