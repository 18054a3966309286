// src/scoring/batch.rs
use super::client::{LanguageModel, ScoringClient};
use crate::linkedin::ProfileStore;
use crate::store::{ApplicationLog, JobCatalog};
use anyhow::Result;
use tracing::{info, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PendingSummary {
    pub already_scored: usize,
    pub scored: usize,
    pub skipped: usize,
}

/// Score every logged application that has no score yet, then rewrite the
/// log once. Rows whose profile or job description cannot be read are left
/// pending.
pub async fn score_pending<M: LanguageModel>(
    log: &ApplicationLog,
    profiles: &ProfileStore,
    jobs: &JobCatalog,
    client: &ScoringClient<M>,
) -> Result<PendingSummary> {
    let mut rows = log.load().await?;
    let mut summary = PendingSummary::default();

    for (idx, row) in rows.iter_mut().enumerate() {
        if !row.is_pending() {
            info!(
                "Row {}: already scored {} for {} ({:?})",
                idx, row.user_linkedin_url, row.job_title, row.score
            );
            summary.already_scored += 1;
            continue;
        }

        info!("Row {}: scoring {} for {}", idx, row.user_linkedin_url, row.job_title);

        let candidate = match profiles.load_json(&row.user_linkedin_url).await {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(
                    "Profile data for {} unavailable, re-do profile setup: {:#}",
                    row.user_linkedin_url, e
                );
                summary.skipped += 1;
                continue;
            }
        };
        let job = match jobs.load(&row.jd_filename).await {
            Ok(job) => job,
            Err(e) => {
                warn!("Skipping job description {}: {:#}", row.jd_filename, e);
                summary.skipped += 1;
                continue;
            }
        };

        row.score = client.score_or_absent(&job, &candidate).await;
        if row.score.is_some() {
            summary.scored += 1;
        }
    }

    log.save_all(&rows).await?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linkedin::ProfileRecord;
    use crate::store::ApplicationRow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
    }

    #[rocket::async_trait]
    impl LanguageModel for Counting {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("64".to_string())
        }
    }

    fn row(url: &str, score: Option<u8>) -> ApplicationRow {
        ApplicationRow {
            user_linkedin_url: url.to_string(),
            job_title: "Backend Engineer".to_string(),
            jd_filename: "backend.json".to_string(),
            score,
        }
    }

    #[tokio::test]
    async fn test_fills_only_pending_rows() {
        let dir = tempfile::tempdir().unwrap();
        let profiles = ProfileStore::new(dir.path().join("scraped_data"));
        let jobs = JobCatalog::new(dir.path().join("JDs"));
        let log = ApplicationLog::new(dir.path().join("user_inputs.csv"));

        let known = "https://www.linkedin.com/in/known/";
        profiles.save(&ProfileRecord::new(known)).unwrap();
        std::fs::create_dir_all(jobs.dir()).unwrap();
        std::fs::write(jobs.dir().join("backend.json"), r#"{"job_title": "Backend Engineer"}"#).unwrap();

        let unknown = "https://www.linkedin.com/in/unknown/";
        log.save_all(&[row(known, Some(90)), row(known, None), row(unknown, None)])
            .await
            .unwrap();

        let client = ScoringClient::new(Counting { calls: AtomicUsize::new(0) });
        let summary = score_pending(&log, &profiles, &jobs, &client).await.unwrap();

        assert_eq!(
            summary,
            PendingSummary { already_scored: 1, scored: 1, skipped: 1 }
        );
        assert_eq!(
            log.load().await.unwrap(),
            vec![row(known, Some(90)), row(known, Some(64)), row(unknown, None)]
        );
    }
}
