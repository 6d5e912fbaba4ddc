//! HTTP binding to the vault service's job API.
//!
//! Uses the curl crate (libcurl) for the describe-job probe and the ranged
//! job-output GETs. Request signing is expected to happen upstream (gateway
//! or sigv4 proxy); this layer only shapes URLs, headers, and errors.

mod describe;
mod output;

use crate::chunk::ByteRange;
use crate::fetch::{ChunkResult, RangeFetch};
use crate::retry::FetchError;

/// Response header carrying the tree hash of the returned byte range.
pub const TREE_HASH_HEADER: &str = "x-amz-sha256-tree-hash";

/// Client for one vault's jobs.
#[derive(Debug, Clone)]
pub struct VaultClient {
    endpoint: String,
    account_id: String,
    vault: String,
}

impl VaultClient {
    /// `endpoint` is the service base URL without a trailing slash
    /// (e.g. `https://vault.eu-west-1.example.com`). `account_id` is usually
    /// `-`, meaning the account owning the credentials.
    pub fn new(endpoint: &str, account_id: &str, vault: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            account_id: account_id.to_string(),
            vault: vault.to_string(),
        }
    }

    pub fn vault(&self) -> &str {
        &self.vault
    }

    /// URL of one job's resource.
    fn job_url(&self, job_id: &str) -> String {
        format!(
            "{}/{}/vaults/{}/jobs/{}",
            self.endpoint, self.account_id, self.vault, job_id
        )
    }

    /// URL of one job's output resource.
    fn job_output_url(&self, job_id: &str) -> String {
        format!("{}/output", self.job_url(job_id))
    }
}

impl RangeFetch for VaultClient {
    fn fetch_range(
        &self,
        job_id: &str,
        range: Option<ByteRange>,
    ) -> Result<ChunkResult, FetchError> {
        output::get_job_output(&self.job_output_url(job_id), range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_urls() {
        let c = VaultClient::new("https://vault.example.com/", "-", "backups");
        assert_eq!(
            c.job_url("j-123"),
            "https://vault.example.com/-/vaults/backups/jobs/j-123"
        );
        assert_eq!(
            c.job_output_url("j-123"),
            "https://vault.example.com/-/vaults/backups/jobs/j-123/output"
        );
    }
}
