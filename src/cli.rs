// src/cli.rs
use crate::core::FsOps;
use crate::environment::{AppConfig, Secrets};
use crate::linkedin::{scrape_and_save, ProfileStore, SavedProfile};
use crate::scoring::{score_pending, GeminiClient, LanguageModel, ScoringClient};
use crate::store::{ApplicationLog, JobCatalog, UserStore};
use crate::web::{start_web_server, ScrapeFn, WebState};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "profile-scorer")]
#[command(about = "Scrape LinkedIn profiles and score them against job descriptions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Write JSON logs to profile-scorer.log instead of the terminal
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the web front end
    Serve,
    /// Scrape one profile and save it under the scraped data directory
    Scrape {
        url: String,
        /// Leave the browser on the profile page instead of closing it
        #[arg(long)]
        keep_open: bool,
    },
    /// Score a saved profile against one job description
    Score {
        profile: PathBuf,
        job_description: PathBuf,
    },
    /// Fill in missing scores in the application log
    ScorePending,
}

pub async fn handle_command(command: Command, config: AppConfig, secrets: Secrets) -> Result<()> {
    match command {
        Command::Serve => {
            config.ensure_directories().await?;
            let state = web_state(&config, &secrets)?;
            start_web_server(state).await
        }

        Command::Scrape { url, keep_open } => {
            config.ensure_directories().await?;
            let saved = run_scrape(&config, &secrets, url, !keep_open).await?;
            for notice in &saved.report.notices {
                warn!("{}", notice.message());
            }
            println!("Saved {} to {}", saved.report.profile.linkedin_url, saved.path.display());
            Ok(())
        }

        Command::Score {
            profile,
            job_description,
        } => {
            let candidate = read_json(&profile).await?;
            let job = read_json(&job_description).await?;
            let client = ScoringClient::new(GeminiClient::new(secrets.gemini(&config.scoring)?)?);

            let score = client.score(&job, &candidate).await?;
            println!("{}", score);
            Ok(())
        }

        Command::ScorePending => {
            let client = ScoringClient::new(GeminiClient::new(secrets.gemini(&config.scoring)?)?);
            let summary = score_pending(
                &ApplicationLog::new(&config.applications_file),
                &ProfileStore::new(&config.scraped_data_dir),
                &JobCatalog::new(&config.jds_dir),
                &client,
            )
            .await?;
            info!(
                "Scored {} rows, {} already scored, {} skipped",
                summary.scored, summary.already_scored, summary.skipped
            );
            Ok(())
        }
    }
}

fn web_state(config: &AppConfig, secrets: &Secrets) -> Result<WebState> {
    let model: Box<dyn LanguageModel> = Box::new(GeminiClient::new(secrets.gemini(&config.scoring)?)?);
    let profiles = ProfileStore::new(&config.scraped_data_dir);

    Ok(WebState {
        users: UserStore::new(&config.users_file),
        profiles: profiles.clone(),
        jobs: JobCatalog::new(&config.jds_dir),
        applications: ApplicationLog::new(&config.applications_file),
        scorer: ScoringClient::new(model),
        scraper: browser_scraper(config, secrets, profiles, config.browser.close_on_complete),
    })
}

/// Browser-backed scrape closure. Credentials are checked per call so the
/// server can start without them.
fn browser_scraper(
    config: &AppConfig,
    secrets: &Secrets,
    store: ProfileStore,
    close_on_complete: bool,
) -> Arc<ScrapeFn> {
    let settings = config.browser.settings();
    let secrets = secrets.clone();
    Arc::new(move |url: &str| -> Result<SavedProfile> {
        let credentials = secrets.credentials()?;
        scrape_and_save(url, &credentials, &settings, close_on_complete, &store)
    })
}

async fn run_scrape(
    config: &AppConfig,
    secrets: &Secrets,
    url: String,
    close_on_complete: bool,
) -> Result<SavedProfile> {
    let scraper = browser_scraper(
        config,
        secrets,
        ProfileStore::new(&config.scraped_data_dir),
        close_on_complete,
    );
    tokio::task::spawn_blocking(move || (*scraper)(&url))
        .await
        .context("Scrape worker stopped unexpectedly")?
}

async fn read_json(path: &Path) -> Result<Value> {
    let content = FsOps::read_file_safe(path).await?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::parse_from(["profile-scorer", "scrape", "https://www.linkedin.com/in/jane/", "--keep-open"]);
        match cli.command {
            Command::Scrape { url, keep_open } => {
                assert_eq!(url, "https://www.linkedin.com/in/jane/");
                assert!(keep_open);
            }
            _ => panic!("expected scrape"),
        }

        let cli = Cli::parse_from(["profile-scorer", "--log-json", "score-pending"]);
        assert!(cli.log_json);
        assert!(matches!(cli.command, Command::ScorePending));

        let cli = Cli::parse_from(["profile-scorer", "score", "jane.json", "backend.json"]);
        assert!(matches!(cli.command, Command::Score { .. }));
    }

    #[test]
    fn test_serve_requires_api_key() {
        let result = web_state(&AppConfig::default(), &Secrets::default());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_read_json_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{").unwrap();
        let err = read_json(&path).await.unwrap_err();
        assert!(format!("{:#}", err).contains("broken.json"));
    }
}
