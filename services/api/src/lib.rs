mod cli;
mod infra;
mod routes;
mod server;

use competence_tracker::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
