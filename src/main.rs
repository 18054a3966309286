use anyhow::{Context, Result};
use clap::Parser;
use profile_scorer::cli::{handle_command, Cli};
use profile_scorer::environment::{AppConfig, Secrets};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE: &str = "profile-scorer.log";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.log_json)?;

    let config = AppConfig::load()?;
    let secrets = Secrets::from_env();
    info!(
        "Profiles: {}, job descriptions: {}",
        config.scraped_data_dir.display(),
        config.jds_dir.display()
    );

    handle_command(cli.command, config, secrets).await
}

fn init_logging(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("profile_scorer=info,rocket::server=off"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true) // Clear file on startup
            .open(LOG_FILE)
            .with_context(|| format!("Failed to open log file {}", LOG_FILE))?;

        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(Mutex::new(file))
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .init();
    } else {
        registry.with(fmt::layer()).init();
    }

    Ok(())
}
