//! SessionEnd hook: Capture significant sessions as memory records.
//!
//! Scores the session context, and when the work looks substantial
//! queues one memory record for the archival store to pick up.
//! Always exits successfully so the calling workflow is never blocked.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use hook_common::{SessionContext, logging};
use hook_memory::JsonlQueue;
use hook_significance::{CapturePipeline, CaptureSettings};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "capture-session", version)]
#[command(about = "Queue a memory record for sessions that did real work")]
struct Cli {
    /// Session context JSON file (read from stdin when omitted)
    context: Option<Utf8PathBuf>,

    /// Queue file to append to [default: ~/.claude/memory/capture-queue.jsonl]
    #[arg(long, env = "MEMORY_QUEUE_PATH")]
    queue: Option<Utf8PathBuf>,

    /// Score and check for duplicates without writing
    #[arg(long)]
    dry_run: bool,

    /// Print the outcome as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage errors are reported but never fail the caller
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        tracing::error!("capture failed: {:#}", e);
    }

    ExitCode::SUCCESS
}

fn run(cli: Cli) -> Result<()> {
    // An empty MEMORY_QUEUE_PATH means "use the default"
    let queue_path = cli
        .queue
        .filter(|path| !path.as_str().trim().is_empty())
        .unwrap_or_else(JsonlQueue::default_path);
    tracing::debug!(queue = %queue_path, "capture starting");

    let settings = CaptureSettings {
        dry_run: cli.dry_run,
        ..Default::default()
    };
    let pipeline = CapturePipeline::with_settings(JsonlQueue::new(queue_path), settings);

    let outcome = match &cli.context {
        Some(path) => pipeline.process_path(path),
        None => pipeline.process_loaded(SessionContext::from_stdin()),
    };

    if cli.json {
        let line = serde_json::to_string(&outcome).context("Failed to serialize outcome")?;
        println!("{}", line);
    }

    Ok(())
}
