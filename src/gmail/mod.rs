//! Gmail API module
//!
//! Contains types and the client for interacting with the Gmail API.

pub mod client;
pub mod drafts;
pub mod labels;
pub mod types;
pub mod utils;
