use crate::report::{run_stats_report, StatsReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use purity_stats::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "purity-stats",
    about = "Run the purity test survey service or report on a submissions export",
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
    /// Offline statistics over a CSV export
    Stats {
        #[command(subcommand)]
        command: StatsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum StatsCommand {
    /// Print the admin statistics report
    Report(StatsReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Load submissions from a CSV export before accepting traffic
    #[arg(long)]
    pub(crate) seed_csv: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Stats {
            command: StatsCommand::Report(args),
        } => run_stats_report(args),
    }
}
