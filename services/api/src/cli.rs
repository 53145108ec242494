use crate::listing::{run_nearby, run_store, NearbyArgs, StoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use coffee_nearby::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Coffee Nearby",
    about = "Find nearby coffee stores and serve the store locator API",
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
    /// List coffee stores around a location
    Nearby(NearbyArgs),
    /// Show a single coffee store from the nearby results
    Store(StoreArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Nearby(args) => run_nearby(args).await,
        Command::Store(args) => run_store(args).await,
    }
}
