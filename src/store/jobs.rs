// src/store/jobs.rs
use crate::core::FsOps;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A job description file. The content is opaque apart from the two display
/// keys.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDescription {
    pub filename: String,
    pub data: Value,
}

impl JobDescription {
    pub fn title(&self) -> &str {
        self.data.get("job_title").and_then(Value::as_str).unwrap_or("N/A")
    }

    pub fn company(&self) -> &str {
        self.data.get("company").and_then(Value::as_str).unwrap_or("N/A")
    }
}

/// Directory of `*.json` job descriptions, read-only.
#[derive(Debug, Clone)]
pub struct JobCatalog {
    dir: PathBuf,
}

impl JobCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every parsable job description, sorted by filename.
    pub async fn list(&self) -> Result<Vec<JobDescription>> {
        if !FsOps::file_accessible(&self.dir).await {
            return Ok(Vec::new());
        }

        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("Failed to read {}", self.dir.display()))?;
        let mut filenames = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(".json") {
                    filenames.push(name.to_string());
                }
            }
        }
        filenames.sort();

        let mut jobs = Vec::with_capacity(filenames.len());
        for filename in filenames {
            match self.load(&filename).await {
                Ok(data) => jobs.push(JobDescription { filename, data }),
                Err(e) => warn!("Skipping malformed JD file {}: {:#}", filename, e),
            }
        }
        Ok(jobs)
    }

    /// One job description by bare filename.
    pub async fn load(&self, filename: &str) -> Result<Value> {
        if filename.contains(['/', '\\']) || filename.starts_with('.') {
            anyhow::bail!("Invalid job description filename: {}", filename);
        }
        let path = self.dir.join(filename);
        let content = FsOps::read_file_safe(&path).await?;
        serde_json::from_str(&content)
            .with_context(|| format!("Malformed job description {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_sorted_and_skips_malformed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("b_backend.json"),
            r#"{"job_title": "Backend Engineer", "company": "Acme"}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("a_data.json"), r#"{"job_title": "Data Engineer"}"#).unwrap();
        std::fs::write(dir.path().join("c_broken.json"), "{oops").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let jobs = JobCatalog::new(dir.path()).list().await.unwrap();
        let names: Vec<&str> = jobs.iter().map(|j| j.filename.as_str()).collect();
        assert_eq!(names, vec!["a_data.json", "b_backend.json"]);
        assert_eq!(jobs[0].company(), "N/A");
        assert_eq!(jobs[1].title(), "Backend Engineer");
        assert_eq!(jobs[1].company(), "Acme");
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = JobCatalog::new(dir.path().join("JDs"));
        assert!(catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_rejects_paths() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = JobCatalog::new(dir.path());
        assert!(catalog.load("../users.json").await.is_err());
        assert!(catalog.load(".hidden.json").await.is_err());
    }
}
