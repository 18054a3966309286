// src/linkedin/assembler.rs
use super::extract::{self, simple, DETAILS_LIST};
use super::navigator::{NavigationError, Navigator};
use super::types::{ProfileRecord, Section, SectionNotice};
use scraper::Html;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub const CONNECTIONS_URL: &str = "https://www.linkedin.com/mynetwork/invite-connect/connections/";
const TOP_CARD: &str = "main";

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("you are not logged in")]
    NotLoggedIn,
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

/// Progress of one profile scrape. Every state after `Authenticated` is
/// reached even when its extractor degrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeState {
    NotLoaded,
    Unauthenticated,
    Authenticated,
    NameLocated,
    AboutLoaded,
    ExperienceLoaded,
    EducationLoaded,
    SocialSectionsLoaded,
    Done,
}

impl ScrapeState {
    pub fn after_load(signed_in: bool) -> Self {
        if signed_in {
            ScrapeState::Authenticated
        } else {
            ScrapeState::Unauthenticated
        }
    }

    pub fn next(self) -> Self {
        match self {
            ScrapeState::Authenticated => ScrapeState::NameLocated,
            ScrapeState::NameLocated => ScrapeState::AboutLoaded,
            ScrapeState::AboutLoaded => ScrapeState::ExperienceLoaded,
            ScrapeState::ExperienceLoaded => ScrapeState::EducationLoaded,
            ScrapeState::EducationLoaded => ScrapeState::SocialSectionsLoaded,
            ScrapeState::SocialSectionsLoaded => ScrapeState::Done,
            terminal => terminal,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub wait_timeout: Duration,
    pub settle: Duration,
    pub close_on_complete: bool,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(5),
            settle: Duration::from_secs(5),
            close_on_complete: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub profile: ProfileRecord,
    pub notices: Vec<SectionNotice>,
}

/// Sub-page URL the way a path join would build it.
pub fn details_url(profile_url: &str, section: &str) -> String {
    if profile_url.ends_with('/') {
        format!("{profile_url}details/{section}")
    } else {
        format!("{profile_url}/details/{section}")
    }
}

/// Drives every extractor, in order, against one profile URL.
pub struct ProfileAssembler<'n, N: Navigator> {
    navigator: &'n mut N,
    options: ScrapeOptions,
}

impl<'n, N: Navigator> ProfileAssembler<'n, N> {
    pub fn new(navigator: &'n mut N, options: ScrapeOptions) -> Self {
        Self { navigator, options }
    }

    pub fn scrape(mut self, url: &str) -> Result<ScrapeReport, ScrapeError> {
        let mut report = ScrapeReport {
            profile: ProfileRecord::new(url),
            notices: Vec::new(),
        };

        let mut state = ScrapeState::NotLoaded;
        loop {
            state = match state {
                ScrapeState::NotLoaded => {
                    if let Err(e) = self.navigator.load(url) {
                        self.release(url);
                        return Err(e.into());
                    }
                    ScrapeState::after_load(self.navigator.is_signed_in(self.options.wait_timeout))
                }
                ScrapeState::Unauthenticated => {
                    error!("Not logged in, aborting scrape of {}", url);
                    self.release(url);
                    return Err(ScrapeError::NotLoggedIn);
                }
                ScrapeState::Done => break,
                current => {
                    let target = current.next();
                    self.enter(target, url, &mut report);
                    debug!("Scrape of {} reached {:?}", url, target);
                    target
                }
            };
        }

        self.release(url);
        info!(
            "Scraped {}: {} experiences, {} educations, {} degraded sections",
            url,
            report.profile.experiences.len(),
            report.profile.educations.len(),
            report.notices.len()
        );
        Ok(report)
    }

    fn enter(&mut self, target: ScrapeState, url: &str, report: &mut ScrapeReport) {
        match target {
            ScrapeState::NameLocated => {
                let top_card = self
                    .navigator
                    .wait_for(TOP_CARD, self.options.wait_timeout)
                    .and_then(|_| {
                        self.navigator.pause(self.options.settle);
                        self.navigator.snapshot()
                    });
                let outcome = match &top_card {
                    Ok(document) => extract::parse_name_and_location(document),
                    Err(e) => degraded(e),
                };
                let found = record(report, "name", outcome).unwrap_or_default();
                report.profile.name = found.name;
                report.profile.location = found.location;
                report.profile.open_to_work = top_card
                    .as_ref()
                    .map(extract::parse_open_to_work)
                    .unwrap_or(false);
            }
            ScrapeState::AboutLoaded => {
                let outcome = match self.navigator.snapshot() {
                    Ok(document) => extract::parse_about(&document),
                    Err(e) => degraded(&e),
                };
                report.profile.about = record(report, "about", outcome);
                self.scroll(&[2.0, 1.5]);
            }
            ScrapeState::ExperienceLoaded => {
                let outcome = match self.details_page(url, "experience") {
                    Ok(document) => extract::parse_experiences(&document),
                    Err(e) => degraded(&e),
                };
                if !outcome.is_found() {
                    warn!("No experience found...");
                }
                report.profile.experiences = record(report, "experience", outcome).unwrap_or_default();
            }
            ScrapeState::EducationLoaded => {
                let outcome = match self.details_page(url, "education") {
                    Ok(document) => extract::parse_educations(&document),
                    Err(e) => degraded(&e),
                };
                if !outcome.is_found() {
                    warn!("No education found...");
                }
                report.profile.educations = record(report, "education", outcome).unwrap_or_default();
            }
            ScrapeState::SocialSectionsLoaded => {
                // The remaining extractors expect the main profile page.
                if let Err(e) = self.navigator.load(url) {
                    warn!("Could not return to {}: {}", url, e);
                }

                let outcome = self.bounded_section(simple::INTERESTS_CONTAINER, extract::parse_interests);
                report.profile.interests = record(report, "interests", outcome).unwrap_or_default();

                let outcome =
                    self.bounded_section(simple::ACCOMPLISHMENTS_CONTAINER, extract::parse_accomplishments);
                report.profile.accomplishments =
                    record(report, "accomplishments", outcome).unwrap_or_default();

                let outcome = match self.navigator.load(CONNECTIONS_URL) {
                    Ok(()) => self.bounded_section(simple::CONNECTIONS_CONTAINER, extract::parse_connections),
                    Err(e) => degraded(&e),
                };
                report.profile.contacts = record(report, "connections", outcome).unwrap_or_default();
            }
            ScrapeState::NotLoaded
            | ScrapeState::Unauthenticated
            | ScrapeState::Authenticated
            | ScrapeState::Done => {}
        }
    }

    fn details_page(&mut self, url: &str, section: &str) -> Result<Html, NavigationError> {
        let timeout = self.options.wait_timeout;
        self.navigator.load(&details_url(url, section))?;
        self.navigator.wait_for("main", timeout)?;
        self.scroll(&[2.0, 1.0]);
        self.navigator.wait_for(DETAILS_LIST, timeout)?;
        self.navigator.snapshot()
    }

    fn bounded_section<T>(&mut self, container: &str, parse: fn(&Html) -> Section<T>) -> Section<T> {
        let document = self
            .navigator
            .wait_for(container, self.options.wait_timeout)
            .and_then(|_| self.navigator.snapshot());
        match document {
            Ok(document) => parse(&document),
            Err(e) => degraded(&e),
        }
    }

    fn scroll(&mut self, divisors: &[f64]) {
        for divisor in divisors {
            if let Err(e) = self.navigator.scroll_to_fraction(*divisor) {
                debug!("Scroll failed: {}", e);
            }
        }
    }

    /// Close the session, or leave it on the profile page for reuse.
    fn release(&mut self, url: &str) {
        if self.options.close_on_complete {
            self.navigator.close();
        } else if self.navigator.current_url() != url {
            if let Err(e) = self.navigator.load(url) {
                warn!("Could not return to {}: {}", url, e);
            }
        }
    }
}

fn degraded<T>(e: &NavigationError) -> Section<T> {
    match e {
        NavigationError::ElementNotFound { .. } => Section::NotFound,
        other => Section::Failed(other.to_string()),
    }
}

/// Unwrap a section outcome, noting it in the report when it degraded.
fn record<T>(report: &mut ScrapeReport, section: &'static str, outcome: Section<T>) -> Option<T> {
    let detail = match outcome {
        Section::Found(value) => return Some(value),
        Section::NotFound => "not present on page".to_string(),
        Section::Failed(reason) => reason,
    };
    warn!("Section '{}' degraded: {}", section, detail);
    report.notices.push(SectionNotice { section, detail });
    None
}
