// src/linkedin/serializer.rs
use super::types::ProfileRecord;
use crate::core::FsOps;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};

/// One JSON document per profile, named after the sanitized profile URL.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(FsOps::sanitize_profile_filename(url))
    }

    pub async fn exists(&self, url: &str) -> bool {
        FsOps::file_accessible(&self.path_for(url)).await
    }

    /// Write the record, replacing any earlier scrape of the same URL.
    pub fn save(&self, profile: &ProfileRecord) -> Result<PathBuf> {
        let path = self.path_for(&profile.linkedin_url);
        let content = to_pretty_json(profile)?;
        FsOps::write_file_blocking(&path, &content)?;
        Ok(path)
    }

    /// The persisted record as a raw JSON value, the form the scorer consumes.
    pub async fn load_json(&self, url: &str) -> Result<serde_json::Value> {
        let path = self.path_for(url);
        let content = FsOps::read_file_safe(&path).await?;
        serde_json::from_str(&content)
            .with_context(|| format!("Corrupted profile data in {}", path.display()))
    }
}

/// Pretty JSON with four-space indentation.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .context("Failed to serialize to JSON")?;
    String::from_utf8(buffer).context("Serialized JSON is not UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linkedin::types::{EducationEntry, ExperienceEntry};

    fn sample() -> ProfileRecord {
        ProfileRecord {
            name: "Jane Doe".to_string(),
            location: "Paris".to_string(),
            experiences: vec![ExperienceEntry {
                institution_name: "Acme".to_string(),
                linkedin_url: Some("https://www.linkedin.com/company/acme/".to_string()),
                from_date: "Jan 2019".to_string(),
                to_date: "Mar 2021".to_string(),
                position_title: "Engineer".to_string(),
                duration: Some("2 yrs 3 mos".to_string()),
                ..Default::default()
            }],
            educations: vec![EducationEntry {
                institution_name: "ENS".to_string(),
                ..Default::default()
            }],
            ..ProfileRecord::new("https://www.linkedin.com/in/jane-doe/")
        }
    }

    #[test]
    fn test_save_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());

        let first = store.save(&sample()).unwrap();
        let first_bytes = std::fs::read(&first).unwrap();
        let second = store.save(&sample()).unwrap();
        let second_bytes = std::fs::read(&second).unwrap();

        assert_eq!(first, second);
        assert_eq!(first_bytes, second_bytes);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        assert!(first.ends_with("jane-doe.json"));
    }

    #[test]
    fn test_entries_are_flat_objects() {
        let json = to_pretty_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let experience = &value["experiences"][0];
        assert!(experience.as_object().unwrap().values().all(|v| !v.is_object() && !v.is_array()));
        assert_eq!(experience["from_date"], "Jan 2019");
        assert_eq!(value["educations"][0]["linkedin_url"], serde_json::Value::Null);
        assert!(json.contains("\n    \"name\": \"Jane Doe\""));
    }

    #[tokio::test]
    async fn test_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        store.save(&sample()).unwrap();

        assert!(store.exists("https://www.linkedin.com/in/jane-doe").await);
        let value = store.load_json("https://www.linkedin.com/in/jane-doe/").await.unwrap();
        let loaded: ProfileRecord = serde_json::from_value(value).unwrap();
        assert_eq!(loaded, sample());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        let url = "https://www.linkedin.com/in/broken/";
        std::fs::write(store.path_for(url), "{not json").unwrap();
        assert!(store.load_json(url).await.is_err());
    }
}
