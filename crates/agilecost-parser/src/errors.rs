use std::num::ParseFloatError;
use std::path::PathBuf;
use std::str::Utf8Error;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{loader} could not open '{}': {source}", path.display())]
    Open {
        loader: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{loader} header row could not be read: {source}")]
    Header {
        loader: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{loader} input is empty; expected a header row")]
    MissingHeader { loader: &'static str },

    #[error("{loader} line {line}: invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        loader: &'static str,
        line: u64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("{loader} line {line}: column '{column}' is not valid UTF-8 ('{value}'): {source}")]
    InvalidEncoding {
        loader: &'static str,
        line: u64,
        column: &'static str,
        value: String,
        #[source]
        source: Utf8Error,
    },

    #[error("{loader} line {line}: column '{column}' is not a number ('{value}'): {source}")]
    InvalidNumber {
        loader: &'static str,
        line: u64,
        column: &'static str,
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

impl LoadError {
    pub fn loader(&self) -> &'static str {
        match self {
            LoadError::Open { loader, .. }
            | LoadError::Header { loader, .. }
            | LoadError::MissingHeader { loader }
            | LoadError::InvalidTimestamp { loader, .. }
            | LoadError::InvalidEncoding { loader, .. }
            | LoadError::InvalidNumber { loader, .. } => *loader,
        }
    }
}
