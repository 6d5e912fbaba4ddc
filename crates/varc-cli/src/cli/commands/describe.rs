//! `varc describe` – show a retrieval job's document.

use anyhow::Result;
use varc_core::api::VaultClient;

/// Fetch and print the job document.
pub fn run_describe(client: &VaultClient, job_id: &str) -> Result<()> {
    let job = client.describe_job(job_id)?;

    println!("{:<16} {}", "Vault:", client.vault());
    println!("{:<16} {}", "Job:", job.id.as_deref().unwrap_or(job_id));
    println!("{:<16} {}", "Action:", job.action.as_deref().unwrap_or("-"));
    println!(
        "{:<16} {}",
        "Status:",
        job.status_code.as_deref().unwrap_or("-")
    );
    println!("{:<16} {}", "Completed:", job.completed);
    println!("{:<16} {}", "Size:", job.archive_size());
    if let Some(archive) = &job.archive_id {
        println!("{:<16} {}", "Archive:", archive);
    }
    if let Some(hash) = &job.sha256_tree_hash {
        println!("{:<16} {}", "Tree hash:", hash);
    }
    if let Some(created) = &job.creation_date {
        println!("{:<16} {}", "Created:", created);
    }
    if let Some(completed) = &job.completion_date {
        println!("{:<16} {}", "Finished:", completed);
    }
    if let Some(msg) = &job.status_message {
        println!("{:<16} {}", "Message:", msg);
    }
    Ok(())
}
