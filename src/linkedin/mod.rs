// src/linkedin/mod.rs
//! Profile scraping: browser navigation, page parsing and persistence.

pub mod assembler;
pub mod dom;
pub mod extract;
pub mod navigator;
pub mod serializer;
pub mod types;

pub use assembler::{ProfileAssembler, ScrapeError, ScrapeOptions, ScrapeReport, ScrapeState};
pub use navigator::{login, BrowserSettings, ChromeNavigator, Credentials, NavigationError, Navigator};
pub use serializer::ProfileStore;
pub use types::*;

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

/// Result of a scrape that reached the store.
#[derive(Debug, Clone)]
pub struct SavedProfile {
    pub path: PathBuf,
    pub report: ScrapeReport,
}

/// Launch a browser, log in, scrape `url` and persist the record.
///
/// Blocking: run it on a worker thread from async code.
pub fn scrape_and_save(
    url: &str,
    credentials: &Credentials,
    settings: &BrowserSettings,
    close_on_complete: bool,
    store: &ProfileStore,
) -> Result<SavedProfile> {
    let mut navigator = ChromeNavigator::launch(settings)?;
    login(&mut navigator, credentials, settings.wait_timeout).map_err(|e| match e {
        NavigationError::ElementNotFound { .. } => ScrapeError::NotLoggedIn,
        other => ScrapeError::Navigation(other),
    })?;

    let options = ScrapeOptions {
        wait_timeout: settings.wait_timeout,
        settle: settings.settle,
        close_on_complete,
    };
    let report = ProfileAssembler::new(&mut navigator, options).scrape(url)?;
    let path = store.save(&report.profile)?;
    info!("Saved profile {} to {}", url, path.display());

    Ok(SavedProfile { path, report })
}
