use clap::Parser;
use tracing::error;

use vantedge::adapter::cli::command::Cli;
use vantedge::adapter::cli::{output, run};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    if let Err(e) = run::run(cli).await {
        error!(error = %e, "Command failed");
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
