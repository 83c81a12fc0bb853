//! spmirror CLI - Mirror a local directory tree into a SharePoint document library
//!
//! One run performs:
//! 1. Client-credentials token acquisition
//! 2. Site and drive identity resolution from the site URL and library name
//! 3. A depth-first mirror of the local tree into the destination folder
//!
//! With `--dry-run` the remote store is replaced by a preview store and no
//! network connection is made at all.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use spmirror_core::config::{ConflictBehavior, RetryPolicy, TransferPolicy};
use spmirror_core::domain::newtypes::FolderPath;
use spmirror_core::ports::remote_store::RemoteStore;
use spmirror_graph::auth::ClientCredentials;
use spmirror_graph::client::GraphClient;
use spmirror_graph::identity::DriveHandle;
use spmirror_graph::store::GraphRemoteStore;
use spmirror_sync::{DryRunStore, MirrorEngine, MirrorSummary};

mod output;

use output::{get_formatter, OutputFormat};

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Parser)]
#[command(
    name = "spmirror",
    version,
    about = "Upload a directory tree to a SharePoint document library"
)]
pub struct Cli {
    /// Local directory to upload
    local_folder: PathBuf,

    /// Entra ID tenant (directory) ID
    #[arg(long, env = "SPMIRROR_TENANT_ID")]
    tenant_id: String,

    /// Application (client) ID
    #[arg(long, env = "SPMIRROR_CLIENT_ID")]
    client_id: String,

    /// Application client secret
    #[arg(long, env = "SPMIRROR_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// SharePoint site URL, e.g. https://contoso.sharepoint.com/sites/Engineering
    #[arg(long, env = "SPMIRROR_SITE_URL")]
    site_url: String,

    /// Document library name or display name
    #[arg(long, default_value = "Documents")]
    library: String,

    /// Destination folder inside the library (library root by default)
    #[arg(long, default_value = "")]
    dest: FolderPath,

    /// Conflict behavior for existing remote items: replace, rename or fail
    #[arg(long, default_value = "replace")]
    conflict: ConflictBehavior,

    /// Largest file (MiB) uploaded in a single request
    #[arg(long, default_value_t = 4)]
    small_upload_max_mb: u64,

    /// Chunk size (MiB) for session-based uploads
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u64).range(1..))]
    chunk_size_mb: u64,

    /// Total send attempts per request before giving up on transient errors
    #[arg(long, default_value_t = 5)]
    retry_max: u32,

    /// Exponential backoff base in seconds
    #[arg(long, default_value_t = 2.0)]
    retry_backoff: f64,

    /// Show what would be uploaded without making changes
    #[arg(long)]
    dry_run: bool,

    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn transfer_policy(&self) -> TransferPolicy {
        TransferPolicy {
            conflict_behavior: self.conflict,
            small_upload_threshold: self.small_upload_max_mb * MIB,
            chunk_size: self.chunk_size_mb * MIB,
        }
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_max,
            backoff_base: self.retry_backoff,
        }
    }

    /// Builds the remote store for this run. Dry-run never authenticates
    /// or touches the network.
    async fn build_store(&self) -> Result<Arc<dyn RemoteStore>> {
        if self.dry_run {
            return Ok(Arc::new(DryRunStore));
        }

        let credentials =
            ClientCredentials::new(&self.tenant_id, &self.client_id, &self.client_secret);
        let token = credentials.acquire().await?;

        let client = GraphClient::new(token, self.retry_policy());
        let handle = DriveHandle::connect(client, &self.site_url, &self.library)
            .await
            .with_context(|| format!("failed to connect to '{}'", self.site_url))?;

        Ok(Arc::new(GraphRemoteStore::new(
            handle,
            self.transfer_policy(),
        )))
    }
}

fn report(cli: &Cli, summary: &MirrorSummary, format: OutputFormat) {
    let formatter = get_formatter(format);

    if matches!(format, OutputFormat::Json) {
        formatter.print_json(&serde_json::json!({
            "dry_run": cli.dry_run,
            "files_total": summary.files_total,
            "files_uploaded": summary.files_uploaded,
            "files_planned": summary.files_planned,
        }));
        return;
    }

    if summary.files_total == 0 {
        formatter.info("Nothing to upload.");
    } else if cli.dry_run {
        formatter.success(&format!("Would upload {} file(s)", summary.files_planned));
    } else {
        formatter.success(&format!(
            "Uploaded {} file(s) to {} in '{}'",
            summary.files_uploaded, cli.dest, cli.library
        ));
    }
}

async fn run(cli: &Cli, format: OutputFormat) -> Result<()> {
    let store = cli.build_store().await?;
    let engine = MirrorEngine::new(store);
    let summary = engine.run(&cli.local_folder, &cli.dest).await?;

    report(cli, &summary, format);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    // Fatal errors go through the formatter too, so --json emits a
    // machine-readable error line instead of anyhow's plain-text report.
    if let Err(err) = run(&cli, format).await {
        get_formatter(format).error(&format!("{err:#}"));
        std::process::exit(1);
    }
}
