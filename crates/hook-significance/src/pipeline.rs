//! Capture pipeline: score, gate, compose, dedup, queue.
//!
//! Every path through the pipeline ends in a [`CaptureOutcome`] and a
//! status line on the log stream. Errors are reported, never returned:
//! capture runs as a best-effort step of a larger workflow.

use crate::compose::build_record;
use crate::gate::{SIGNIFICANCE_THRESHOLD, passes_threshold};
use crate::scorer::score;
use camino::Utf8Path;
use hook_common::{HookError, SessionContext};
use hook_memory::{DEDUP_WINDOW, QueueStore, seen_recently};
use serde::Serialize;

/// Tunables for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureSettings {
    /// Inclusive minimum score
    pub threshold: f64,
    /// Recent queue entries checked for duplicates
    pub dedup_window: usize,
    /// Run every stage except the final append
    pub dry_run: bool,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            threshold: SIGNIFICANCE_THRESHOLD,
            dedup_window: DEDUP_WINDOW,
            dry_run: false,
        }
    }
}

/// How a capture attempt ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaptureOutcome {
    /// Record appended to the queue
    Queued {
        score: f64,
        content: String,
        content_hash: String,
    },
    /// Score under the threshold; nothing composed
    BelowThreshold { score: f64, threshold: f64 },
    /// Same content already among the recent entries
    Duplicate { score: f64, content_hash: String },
    /// Would have been queued
    DryRun {
        score: f64,
        content: String,
        content_hash: String,
    },
    /// Context could not be loaded
    MalformedInput { reason: String },
    /// Append failed
    WriteFailed { score: f64, reason: String },
}

impl CaptureOutcome {
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued { .. })
    }
}

/// Runs the capture stages against a queue.
#[derive(Debug)]
pub struct CapturePipeline<S> {
    store: S,
    settings: CaptureSettings,
}

impl<S: QueueStore> CapturePipeline<S> {
    pub fn new(store: S) -> Self {
        Self::with_settings(store, CaptureSettings::default())
    }

    pub fn with_settings(store: S, settings: CaptureSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Load a context file and process it.
    pub fn process_path(&self, path: &Utf8Path) -> CaptureOutcome {
        self.process_loaded(SessionContext::from_path(path))
    }

    /// Process the result of loading a context from anywhere.
    pub fn process_loaded(&self, loaded: hook_common::Result<SessionContext>) -> CaptureOutcome {
        match loaded {
            Ok(ctx) => self.process(&ctx),
            Err(e) => {
                tracing::warn!("malformed input, skipping capture: {}", e);
                CaptureOutcome::MalformedInput {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Process one session context.
    pub fn process(&self, ctx: &SessionContext) -> CaptureOutcome {
        let result = score(ctx);
        tracing::info!("significance score: {:.2}", result.score);
        if result.reasons.is_empty() {
            tracing::info!("reasons: none");
        } else {
            tracing::info!("reasons: {}", result.reasons.join("; "));
        }

        if !passes_threshold(result.score, self.settings.threshold) {
            tracing::info!("{}", below_threshold_message(result.score, self.settings.threshold));
            return CaptureOutcome::BelowThreshold {
                score: result.score,
                threshold: self.settings.threshold,
            };
        }

        let record = build_record(ctx, &result);
        let content_hash = record.content_hash();

        if seen_recently(&self.store, &record.content, self.settings.dedup_window) {
            tracing::info!(hash = %short(&content_hash), "duplicate of a recent memory, not queued");
            return CaptureOutcome::Duplicate {
                score: result.score,
                content_hash,
            };
        }

        if self.settings.dry_run {
            tracing::info!(hash = %short(&content_hash), "dry run, would queue: {}", record.content);
            return CaptureOutcome::DryRun {
                score: result.score,
                content: record.content,
                content_hash,
            };
        }

        match self.store.append_record(&record) {
            Ok(()) => {
                tracing::info!(hash = %short(&content_hash), "queued memory: {}", record.content);
                CaptureOutcome::Queued {
                    score: result.score,
                    content: record.content,
                    content_hash,
                }
            }
            Err(e) => {
                tracing::error!("queue write failed, memory dropped: {}", e);
                CaptureOutcome::WriteFailed {
                    score: result.score,
                    reason: write_failure_reason(e),
                }
            }
        }
    }
}

fn write_failure_reason(err: HookError) -> String {
    match err {
        HookError::QueueWrite { reason, .. } => reason,
        other => other.to_string(),
    }
}

// Unrounded so a near miss never reads as equal to the threshold
fn below_threshold_message(score: f64, threshold: f64) -> String {
    format!("below threshold ({} < {}), not queued", score, threshold)
}

fn short(hash: &str) -> &str {
    &hash[..hash.len().min(12)]
}
