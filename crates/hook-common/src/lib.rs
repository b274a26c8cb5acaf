//! Common utilities for Claude Code hooks.
//!
//! This crate provides shared functionality for the Rust-based hooks:
//! - Session context parsing (file or stdin)
//! - Error handling
//! - Logging setup

pub mod error;
pub mod input;
pub mod logging;

pub use error::{HookError, Result};
pub use input::SessionContext;

