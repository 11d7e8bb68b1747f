//! Gmail Cleaner Library
//!
//! Bulk cleanup of Gmail messages driven by natural-language commands.
//! Provides the Gmail batch client, the LLM-backed command interpreter, the
//! AI proxy server and the orchestration tying them together.

pub mod ai;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod gmail;
pub mod server;

pub use config::Config;
pub use error::{CleanerError, Result};
