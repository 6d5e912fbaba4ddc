//! Retrieval job model, parsed from the service's describe-job JSON document.

use serde::Deserialize;
use std::collections::HashMap;

/// A retrieval job as reported by the vault service.
///
/// Known response elements map to typed fields; anything the service adds
/// later lands in [`Job::extra`] instead of being dropped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Job {
    /// Job type, e.g. `ArchiveRetrieval` or `InventoryRetrieval`.
    pub action: Option<String>,
    /// Archive the job retrieves (archive-retrieval jobs only).
    pub archive_id: Option<String>,
    /// Archive size in bytes. Null for inventory jobs.
    pub archive_size_in_bytes: Option<u64>,
    /// True once the service has finished staging the job output.
    /// Downloading before this is set fails with a not-ready error.
    #[serde(default)]
    pub completed: bool,
    pub completion_date: Option<String>,
    pub creation_date: Option<String>,
    /// Inventory size in bytes. Null for archive jobs.
    pub inventory_size_in_bytes: Option<u64>,
    #[serde(rename = "JobDescription")]
    pub description: Option<String>,
    #[serde(rename = "JobId")]
    pub id: Option<String>,
    /// Tree hash over the whole archive, when the service computed one.
    #[serde(rename = "SHA256TreeHash")]
    pub sha256_tree_hash: Option<String>,
    #[serde(rename = "SNSTopic")]
    pub sns_topic: Option<String>,
    /// `InProgress`, `Succeeded`, or `Failed`.
    pub status_code: Option<String>,
    pub status_message: Option<String>,
    #[serde(rename = "VaultARN")]
    pub vault_arn: Option<String>,
    /// Response fields this client does not know about.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Job {
    /// Size of the job output in bytes; 0 when the service reported none.
    pub fn archive_size(&self) -> u64 {
        self.archive_size_in_bytes.unwrap_or(0)
    }
}
