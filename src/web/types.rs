// src/web/types.rs
use crate::linkedin::{ProfileStore, SavedProfile};
use crate::scoring::{LanguageModel, ScoringClient};
use crate::store::{ApplicationLog, JobCatalog, UserStore};
use rocket::form::FromForm;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a message is styled. `Reauth`, `Section` and `Scoring` mark the
/// three failure kinds a user has to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageClass {
    Info,
    Success,
    Warning,
    Error,
    /// Scraper session is not authenticated.
    Reauth,
    /// A profile section was skipped during the scrape.
    Section,
    /// The language model gave no usable score.
    Scoring,
}

impl MessageClass {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageClass::Info => "info",
            MessageClass::Success => "success",
            MessageClass::Warning => "warning",
            MessageClass::Error => "error",
            MessageClass::Reauth => "reauth",
            MessageClass::Section => "section",
            MessageClass::Scoring => "scoring",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub class: MessageClass,
    pub text: String,
}

#[derive(FromForm)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(FromForm)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(FromForm)]
pub struct ProfileForm {
    pub name: String,
    pub linkedin_url: String,
}

#[derive(FromForm)]
pub struct ApplyForm {
    pub jd_filename: String,
}

/// Blocking profile scrape, run on a worker thread.
pub type ScrapeFn = dyn Fn(&str) -> anyhow::Result<SavedProfile> + Send + Sync;

/// Everything the handlers share.
pub struct WebState {
    pub users: UserStore,
    pub profiles: ProfileStore,
    pub jobs: JobCatalog,
    pub applications: ApplicationLog,
    pub scorer: ScoringClient<Box<dyn LanguageModel>>,
    pub scraper: Arc<ScrapeFn>,
}
