// src/environment.rs
use crate::linkedin::{BrowserSettings, Credentials};
use crate::scoring::GeminiSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub wait_timeout_secs: u64,
    pub settle_secs: u64,
    pub close_on_complete: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            wait_timeout_secs: 10,
            settle_secs: 5,
            close_on_complete: true,
        }
    }
}

impl BrowserConfig {
    pub fn settings(&self) -> BrowserSettings {
        BrowserSettings {
            headless: self.headless,
            wait_timeout: Duration::from_secs(self.wait_timeout_secs),
            settle: Duration::from_secs(self.settle_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Paths and tunables for one environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scraped_data_dir: PathBuf,
    pub jds_dir: PathBuf,
    pub users_file: PathBuf,
    pub applications_file: PathBuf,
    pub browser: BrowserConfig,
    pub scoring: ScoringConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scraped_data_dir: PathBuf::from("./scraped_data"),
            jds_dir: PathBuf::from("./JDs"),
            users_file: PathBuf::from("./users.json"),
            applications_file: PathBuf::from("./user_inputs.csv"),
            browser: BrowserConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: Option<AppConfig>,
    #[serde(default)]
    production: Option<AppConfig>,
}

impl AppConfig {
    /// Load the section for the current environment from `config.yaml`,
    /// falling back to built-in defaults when the file is absent.
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);
        Self::load_from(Path::new(CONFIG_FILE), &environment)
    }

    fn get_environment() -> String {
        std::env::var("SCORER_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    pub fn load_from(config_path: &Path, environment: &str) -> Result<Self> {
        let config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::from_yaml(&content, environment)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?
        } else {
            warn!("{} not found, using default configuration", config_path.display());
            Self::default()
        };

        config.resolved()
    }

    fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content)?;
        let section = match environment {
            "production" => file.production,
            _ => file.local,
        };
        Ok(section.unwrap_or_default())
    }

    fn resolved(self) -> Result<Self> {
        Ok(Self {
            scraped_data_dir: resolve_path(&self.scraped_data_dir)?,
            jds_dir: resolve_path(&self.jds_dir)?,
            users_file: resolve_path(&self.users_file)?,
            applications_file: resolve_path(&self.applications_file)?,
            ..self
        })
    }

    /// Create the profile and job description directories.
    pub async fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.scraped_data_dir, &self.jds_dir] {
            crate::core::FsOps::ensure_dir_exists(dir).await?;
        }
        info!("All configured directories ensured to exist");
        Ok(())
    }
}

fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(current_dir.join(path))
    }
}

/// Credentials read from the process environment (after `.env` is loaded).
#[derive(Clone, Default)]
pub struct Secrets {
    pub scraper_email: Option<String>,
    pub scraper_password: Option<String>,
    pub session_cookie: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Secrets")
            .field("scraper_email", &self.scraper_email)
            .field("scraper_password", &mask(&self.scraper_password))
            .field("session_cookie", &mask(&self.session_cookie))
            .field("gemini_api_key", &mask(&self.gemini_api_key))
            .finish()
    }
}

impl Secrets {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            scraper_email: get("PROXY_EMAIL_ID"),
            scraper_password: get("PROXY_EMAIL_PASSWORD"),
            session_cookie: get("LINKEDIN_SESSION_COOKIE"),
            gemini_api_key: get("GEMINI_API_KEY"),
        }
    }

    /// Browser login details. A session cookie alone is enough.
    pub fn credentials(&self) -> Result<Credentials> {
        if self.session_cookie.is_none()
            && (self.scraper_email.is_none() || self.scraper_password.is_none())
        {
            anyhow::bail!(
                "Set PROXY_EMAIL_ID and PROXY_EMAIL_PASSWORD, or LINKEDIN_SESSION_COOKIE, in the environment"
            );
        }
        Ok(Credentials {
            email: self.scraper_email.clone().unwrap_or_default(),
            password: self.scraper_password.clone().unwrap_or_default(),
            session_cookie: self.session_cookie.clone(),
        })
    }

    pub fn gemini(&self, config: &ScoringConfig) -> Result<GeminiSettings> {
        let api_key = self
            .gemini_api_key
            .clone()
            .context("Gemini API Key not found. Please set GEMINI_API_KEY in your .env file.")?;
        Ok(GeminiSettings {
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}
