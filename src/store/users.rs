// src/store/users.rs
use crate::core::FsOps;
use crate::linkedin::serializer::to_pretty_json;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Stored account. Passwords are kept as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub password: String,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

pub type Users = BTreeMap<String, UserRecord>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserStoreError {
    #[error("All fields are required.")]
    MissingFields,
    #[error("Passwords do not match.")]
    PasswordMismatch,
    #[error("Username or email already exists. Please choose another or log in.")]
    UsernameTaken,
    #[error("Both Name and LinkedIn URL are required.")]
    MissingProfileFields,
    #[error("Please enter a valid LinkedIn URL (e.g., https://www.linkedin.com/in/your-profile).")]
    InvalidProfileUrl,
    #[error("User data not found. Please log in again.")]
    UnknownUser,
}

/// Outcome of a store operation: either a validation refusal shown to the
/// user or an I/O failure.
#[derive(Debug, Error)]
pub enum UserStoreFailure {
    #[error(transparent)]
    Invalid(#[from] UserStoreError),
    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

/// Accounts persisted as one JSON object keyed by username.
///
/// Every mutation is a read-modify-write of the whole file, serialized by an
/// in-process lock.
pub struct UserStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl UserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all users. A missing, empty or unreadable file is reset to `{}`.
    pub async fn load(&self) -> Result<Users> {
        if !FsOps::file_accessible(&self.path).await {
            self.save(&Users::new()).await?;
            return Ok(Users::new());
        }

        let content = FsOps::read_file_safe(&self.path).await?;
        if content.trim().is_empty() {
            warn!("{} is empty. Initializing with empty user data.", self.path.display());
            self.save(&Users::new()).await?;
            return Ok(Users::new());
        }

        match serde_json::from_str(&content) {
            Ok(users) => Ok(users),
            Err(e) => {
                warn!(
                    "Error decoding JSON from {} ({}). Re-initializing.",
                    self.path.display(),
                    e
                );
                self.save(&Users::new()).await?;
                Ok(Users::new())
            }
        }
    }

    pub async fn save(&self, users: &Users) -> Result<()> {
        let content = to_pretty_json(users).context("Failed to serialize users")?;
        FsOps::write_file_safe(&self.path, &content).await
    }

    pub async fn get(&self, username: &str) -> Result<Option<UserRecord>> {
        Ok(self.load().await?.get(username).cloned())
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<UserRecord>> {
        let user = self.get(username).await?;
        Ok(user.filter(|user| user.password == password))
    }

    pub async fn sign_up(
        &self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), UserStoreFailure> {
        if username.is_empty() || password.is_empty() || confirm_password.is_empty() {
            return Err(UserStoreError::MissingFields.into());
        }
        if password != confirm_password {
            return Err(UserStoreError::PasswordMismatch.into());
        }

        let _guard = self.lock.lock().await;
        let mut users = self.load().await?;
        if users.contains_key(username) {
            return Err(UserStoreError::UsernameTaken.into());
        }

        users.insert(
            username.to_string(),
            UserRecord {
                password: password.to_string(),
                ..Default::default()
            },
        );
        self.save(&users).await?;
        info!("Created account for {}", username);
        Ok(())
    }

    /// Store the display name and profile URL of an existing user.
    pub async fn save_profile(
        &self,
        username: &str,
        name: &str,
        linkedin_url: &str,
    ) -> Result<UserRecord, UserStoreFailure> {
        validate_profile(name, linkedin_url)?;

        let _guard = self.lock.lock().await;
        let mut users = self.load().await?;
        let user = users.get_mut(username).ok_or(UserStoreError::UnknownUser)?;
        user.name = Some(name.to_string());
        user.linkedin_url = Some(linkedin_url.to_string());
        let updated = user.clone();

        self.save(&users).await?;
        Ok(updated)
    }
}

pub fn validate_profile(name: &str, linkedin_url: &str) -> Result<(), UserStoreError> {
    if name.is_empty() || linkedin_url.is_empty() {
        return Err(UserStoreError::MissingProfileFields);
    }
    let has_scheme = linkedin_url.starts_with("http://") || linkedin_url.starts_with("https://");
    if !has_scheme || !linkedin_url.contains("linkedin.com/in/") {
        return Err(UserStoreError::InvalidProfileUrl);
    }
    Ok(())
}
