use crate::demo::{run_demo, run_estimate, run_neighborhood, DemoArgs, EstimateArgs, NeighborhoodArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rent_advisor::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Rent Advisor",
    about = "Price rentals from comparables and neighborhood data, or run the pricing API",
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
    /// Estimate rent for one property from the command line
    Estimate(EstimateArgs),
    /// Score a neighborhood from area statistics
    Neighborhood(NeighborhoodArgs),
    /// Run an end-to-end analysis with sample data
    Demo(DemoArgs),
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
        Command::Estimate(args) => run_estimate(args),
        Command::Neighborhood(args) => run_neighborhood(args),
        Command::Demo(args) => run_demo(args),
    }
}
