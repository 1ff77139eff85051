mod cmd;

use clap::{Parser, Subcommand};
use pr_reviewers_api::config::Config;

#[derive(Debug, Parser)]
#[clap(name = "pr-reviewers", about = "Pull request reviewer assignment service")]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server, applying any pending migrations first.
    Serve(Config),
    /// Apply pending database migrations and exit.
    Migrate(Config),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    color_eyre::install()?;
    dotenv::dotenv().ok();

    match Cli::parse().command {
        Command::Serve(config) => cmd::server::run(config).await?,
        Command::Migrate(config) => cmd::migrate::run(config).await?,
    }

    Ok(())
}
