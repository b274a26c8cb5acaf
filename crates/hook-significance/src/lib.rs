//! Session significance capture.
//!
//! Decides whether a finished session did enough work to be remembered,
//! and queues a single memory record for it when it did:
//!
//! context -> [`scorer`] -> [`gate`] -> [`compose`] -> dedup -> queue
//!
//! [`pipeline::CapturePipeline`] runs the whole chain and never fails.

pub mod compose;
pub mod gate;
pub mod parse;
pub mod pipeline;
pub mod scorer;

pub use compose::{build_record, compose, tags};
pub use gate::{SIGNIFICANCE_THRESHOLD, passes};
pub use pipeline::{CaptureOutcome, CapturePipeline, CaptureSettings};
pub use scorer::{ScoreResult, score};
