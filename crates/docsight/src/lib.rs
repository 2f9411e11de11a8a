//! Docsight - Document Insight API Client
//!
//! Uploads PDFs to a remote analysis API and reads back either an AI
//! summary or a word-frequency fallback, plus the history of past uploads.

pub mod client;
pub mod commands;
pub mod config;
pub mod display;
pub mod document;
pub mod error;
pub mod state;
pub mod types;

pub use client::{ClientConfig, InsightApi, InsightClient};
pub use document::UploadRequest;
pub use error::{ClientError, ErrorKind, Result};
pub use types::{Insight, SummaryKind};
