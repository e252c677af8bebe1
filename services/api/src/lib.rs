mod cli;
mod infra;
mod report;
mod routes;
mod server;

use purity_stats::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
