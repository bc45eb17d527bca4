use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libris::cli::{self, Cli};
use libris::config::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing. Logs go to stderr so command output stays clean.
    let default_filter = if cli.verbose {
        "libris=debug"
    } else {
        "libris=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env().with_overrides(cli.api_url.clone(), cli.profile.clone());

    if let Err(e) = cli::run(cli, config).await {
        let steps = e.completed_steps();
        if !steps.is_empty() {
            tracing::error!("Partial write left in place: {:?}", steps);
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
