// src/store/applications.rs
use crate::core::FsOps;
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// One "I'm interested" click: who applied to which role, and the score once
/// it is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRow {
    pub user_linkedin_url: String,
    #[serde(rename = "JD")]
    pub job_title: String,
    pub jd_filename: String,
    #[serde(deserialize_with = "score_cell")]
    pub score: Option<u8>,
}

impl ApplicationRow {
    pub fn is_pending(&self) -> bool {
        self.score.is_none()
    }
}

/// Empty and `nan` cells are absent. Float cells such as `85.0` are accepted
/// because spreadsheet tools rewrite integer columns that way.
fn score_cell<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.map(|s| s.trim().to_string()) else {
        return Ok(None);
    };
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }

    let value: f64 = raw
        .parse()
        .map_err(|_| serde::de::Error::custom(format!("invalid score '{}'", raw)))?;
    Ok(Some(value.clamp(0.0, 100.0).round() as u8))
}

/// Append-only CSV log of applications.
#[derive(Debug, Clone)]
pub struct ApplicationLog {
    path: PathBuf,
}

impl ApplicationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All rows, or none when the log does not exist yet.
    pub async fn load(&self) -> Result<Vec<ApplicationRow>> {
        if !FsOps::file_accessible(&self.path).await {
            return Ok(Vec::new());
        }

        let content = FsOps::read_file_safe(&self.path).await?;
        let mut reader = csv::Reader::from_reader(content.as_bytes());
        reader
            .deserialize()
            .enumerate()
            .map(|(idx, row)| {
                row.with_context(|| format!("Invalid row {} in {}", idx + 1, self.path.display()))
            })
            .collect()
    }

    /// Add one row, writing the header first when the log is missing or empty.
    pub async fn append(&self, row: &ApplicationRow) -> Result<()> {
        let is_new = !FsOps::file_has_content(&self.path).await;
        let chunk = encode(std::slice::from_ref(row), is_new)?;

        if let Some(parent) = self.path.parent() {
            FsOps::ensure_dir_exists(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        file.write_all(chunk.as_bytes())
            .await
            .with_context(|| format!("Failed to append to {}", self.path.display()))?;

        debug!("Logged application of {} to {}", row.user_linkedin_url, row.jd_filename);
        Ok(())
    }

    /// Replace the whole log.
    pub async fn save_all(&self, rows: &[ApplicationRow]) -> Result<()> {
        let content = encode(rows, true)?;
        FsOps::write_file_safe(&self.path, &content).await?;
        info!("Wrote {} application rows to {}", rows.len(), self.path.display());
        Ok(())
    }
}

fn encode(rows: &[ApplicationRow], with_header: bool) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).context("Failed to encode application row")?;
    }
    let bytes = writer.into_inner().context("Failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(score: Option<u8>) -> ApplicationRow {
        ApplicationRow {
            user_linkedin_url: "https://www.linkedin.com/in/jane/".to_string(),
            job_title: "Data Engineer".to_string(),
            jd_filename: "data_engineer.json".to_string(),
            score,
        }
    }

    #[tokio::test]
    async fn test_append_creates_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = ApplicationLog::new(dir.path().join("user_inputs.csv"));

        log.append(&row(None)).await.unwrap();
        log.append(&row(Some(70))).await.unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "user_linkedin_url,JD,jd_filename,score");
        assert_eq!(lines[1], "https://www.linkedin.com/in/jane/,Data Engineer,data_engineer.json,");
        assert_eq!(lines.len(), 3);

        let rows = log.load().await.unwrap();
        assert_eq!(rows, vec![row(None), row(Some(70))]);
        assert!(rows[0].is_pending());
    }

    #[tokio::test]
    async fn test_append_to_empty_file_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let log = ApplicationLog::new(dir.path().join("user_inputs.csv"));
        std::fs::write(log.path(), "").unwrap();

        log.append(&row(Some(40))).await.unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert!(content.starts_with("user_linkedin_url,JD,jd_filename,score\n"));
        assert_eq!(log.load().await.unwrap(), vec![row(Some(40))]);
    }

    #[tokio::test]
    async fn test_load_accepts_float_and_nan_cells() {
        let dir = tempfile::tempdir().unwrap();
        let log = ApplicationLog::new(dir.path().join("user_inputs.csv"));
        std::fs::write(
            log.path(),
            "user_linkedin_url,JD,jd_filename,score\n\
             u1,Role,a.json,85.0\n\
             u2,Role,a.json,nan\n",
        )
        .unwrap();

        let rows = log.load().await.unwrap();
        assert_eq!(rows[0].score, Some(85));
        assert_eq!(rows[1].score, None);
    }

    #[tokio::test]
    async fn test_missing_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = ApplicationLog::new(dir.path().join("absent.csv"));
        assert!(log.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_all_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let log = ApplicationLog::new(dir.path().join("user_inputs.csv"));
        log.append(&row(None)).await.unwrap();

        log.save_all(&[row(Some(42))]).await.unwrap();
        assert_eq!(log.load().await.unwrap(), vec![row(Some(42))]);
    }
}
