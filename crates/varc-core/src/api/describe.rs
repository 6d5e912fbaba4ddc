//! Describe-job probe: fetch the job's JSON document before downloading.

use anyhow::{Context, Result};
use std::time::Duration;

use crate::job::Job;

use super::VaultClient;

impl VaultClient {
    /// Fetches the job document and parses it into a [`Job`].
    ///
    /// Callers check `completed` before attempting a download; the service
    /// rejects output requests for jobs still being staged.
    pub fn describe_job(&self, job_id: &str) -> Result<Job> {
        let url = self.job_url(job_id);
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&url).context("invalid job URL")?;
        easy.follow_location(true)?;
        easy.connect_timeout(Duration::from_secs(15))?;
        easy.timeout(Duration::from_secs(30))?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer
                .perform()
                .with_context(|| format!("describe job {}", job_id))?;
        }

        let code = easy.response_code().context("no response code")?;
        if !(200..300).contains(&code) {
            anyhow::bail!("describe job {} returned HTTP {}", job_id, code);
        }

        let job: Job = serde_json::from_slice(&body)
            .with_context(|| format!("unparseable job document for {}", job_id))?;
        tracing::debug!(
            job = job_id,
            completed = job.completed,
            archive_size = job.archive_size(),
            status = job.status_code.as_deref().unwrap_or("-"),
            "described job"
        );
        Ok(job)
    }
}
