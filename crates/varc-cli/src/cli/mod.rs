//! CLI for the varc archive retrieval client.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use varc_core::api::VaultClient;
use varc_core::config;

use commands::{run_describe, run_fetch, run_treehash};

/// Top-level CLI for the varc archive retrieval client.
#[derive(Debug, Parser)]
#[command(name = "varc")]
#[command(about = "varc: chunked, tree-hash-verified archive retrieval", long_about = None)]
pub struct Cli {
    /// Vault service endpoint (overrides the config file).
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Account owning the vaults; `-` means the credential owner.
    #[arg(long, global = true)]
    pub account_id: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Show a retrieval job's document (status, size, tree hash).
    Describe {
        /// Vault holding the job.
        vault: String,
        /// Job identifier.
        job_id: String,
    },

    /// Download a completed job's output to a file, verifying each chunk.
    Fetch {
        /// Vault holding the job.
        vault: String,
        /// Job identifier.
        job_id: String,
        /// Destination file for the archive.
        output: PathBuf,
        /// Chunk size in MiB (default from config; must be a whole MiB multiple).
        #[arg(long, value_name = "MIB")]
        chunk_size_mib: Option<u64>,
        /// Skip per-chunk tree hash verification.
        #[arg(long)]
        no_verify: bool,
    },

    /// Compute the SHA-256 tree hash of a local file.
    Treehash {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Describe { vault, job_id } => {
                let client = make_client(&cli.endpoint, &cli.account_id, &cfg, &vault)?;
                run_describe(&client, &job_id)?;
            }
            CliCommand::Fetch {
                vault,
                job_id,
                output,
                chunk_size_mib,
                no_verify,
            } => {
                let client = make_client(&cli.endpoint, &cli.account_id, &cfg, &vault)?;
                run_fetch(&client, &cfg, &job_id, &output, chunk_size_mib, no_verify)?;
            }
            CliCommand::Treehash { path } => run_treehash(&path)?,
        }

        Ok(())
    }
}

fn make_client(
    endpoint_flag: &Option<String>,
    account_flag: &Option<String>,
    cfg: &config::VarcConfig,
    vault: &str,
) -> Result<VaultClient> {
    let endpoint = endpoint_flag
        .as_deref()
        .or(cfg.endpoint.as_deref())
        .context("no endpoint configured; pass --endpoint or set it in config.toml")?;
    let account_id = account_flag.as_deref().unwrap_or(&cfg.account_id);
    Ok(VaultClient::new(endpoint, account_id, vault))
}
