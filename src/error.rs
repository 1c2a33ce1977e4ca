//! Error types for loading the business dataset.
//!
//! A load either succeeds completely or fails with exactly one `LoadError`;
//! there is no partial dataset and no retry.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "http")]
    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error! status: {status} ({url})")]
    HttpStatus { status: u16, url: String },

    #[error("Malformed business data in {source_name}: {source}")]
    MalformedJson {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed CSV business data in {source_name}: {source}")]
    MalformedCsv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    #[error("Unsupported data file format: {path} (expected .json or .csv)")]
    UnsupportedFormat { path: PathBuf },

    #[error("Remote data sources are not available in this build: {url}")]
    RemoteDisabled { url: String },
}

impl LoadError {
    /// The one message shown to the user in place of the normal header.
    pub fn user_message(&self, source_name: &str) -> String {
        format!(
            "Could not load business data. Please ensure '{}' is present.",
            source_name
        )
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;
