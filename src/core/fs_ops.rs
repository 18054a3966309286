// src/core/fs_ops.rs
//! File system helpers shared by the stores

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use tracing::info;

const PROFILE_MARKER: &str = "linkedin.com/in/";
pub const FALLBACK_PROFILE_FILE: &str = "default_profile.json";

pub struct FsOps;

impl FsOps {
    /// Ensure directory exists
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            info!("Created directory: {}", path.display());
        }
        Ok(())
    }

    pub async fn read_file_safe(path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }

    /// Write file, creating the parent directory first
    pub async fn write_file_safe(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent).await?;
        }

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        info!("Written file: {}", path.display());
        Ok(())
    }

    /// Blocking variant for the scrape worker thread
    pub fn write_file_blocking(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        info!("Written file: {}", path.display());
        Ok(())
    }

    pub async fn file_accessible(path: &Path) -> bool {
        fs::metadata(path).await.is_ok()
    }

    /// True when the file exists and holds at least one byte.
    pub async fn file_has_content(path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|meta| meta.len() > 0)
            .unwrap_or(false)
    }

    /// Filename for a profile URL: the path segment after `linkedin.com/in/`
    /// with everything outside `[A-Za-z0-9_-]` removed, plus `.json`.
    ///
    /// URLs without the marker, or whose segment sanitizes to nothing, share
    /// a fixed fallback name.
    pub fn sanitize_profile_filename(url: &str) -> String {
        let segment = url
            .find(PROFILE_MARKER)
            .map(|start| &url[start + PROFILE_MARKER.len()..])
            .map(|rest| rest.split(['/', '\\', '?']).next().unwrap_or_default())
            .unwrap_or_default();

        let safe: String = segment
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .collect();

        if safe.is_empty() {
            FALLBACK_PROFILE_FILE.to_string()
        } else {
            format!("{safe}.json")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_profile_filename() {
        assert_eq!(
            FsOps::sanitize_profile_filename("https://www.linkedin.com/in/john-doe-123456789/"),
            "john-doe-123456789.json"
        );
        assert_eq!(
            FsOps::sanitize_profile_filename("https://www.linkedin.com/in/jane_doe?trk=abc"),
            "jane_doe.json"
        );
        assert_eq!(
            FsOps::sanitize_profile_filename("https://linkedin.com/in/j%C3%A9r%C3%B4me.x/details"),
            "jC3A9rC3B4mex.json"
        );
    }

    #[test]
    fn test_sanitize_without_marker_falls_back() {
        assert_eq!(
            FsOps::sanitize_profile_filename("https://example.com/profile/jane"),
            FALLBACK_PROFILE_FILE
        );
        assert_eq!(
            FsOps::sanitize_profile_filename("https://www.linkedin.com/in//"),
            FALLBACK_PROFILE_FILE
        );
    }

    #[test]
    fn test_sanitize_is_pure() {
        let url = "https://www.linkedin.com/in/ada-lovelace/";
        assert_eq!(
            FsOps::sanitize_profile_filename(url),
            FsOps::sanitize_profile_filename(url)
        );
    }

    #[tokio::test]
    async fn test_write_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.json");
        FsOps::write_file_safe(&path, "{}").await.unwrap();
        assert_eq!(FsOps::read_file_safe(&path).await.unwrap(), "{}");
        assert!(FsOps::file_accessible(&path).await);
    }
}
