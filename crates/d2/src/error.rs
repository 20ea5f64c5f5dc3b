//! Error types for D2 operations.
//!
//! This module provides the main error type [`D2Error`] which wraps the
//! error conditions that can occur while processing a document.

use std::io;

use thiserror::Error;

use d2_parser::error::ParseError;

/// The main error type for D2 operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries every diagnostic of the failed parse together
/// with the source text, so callers can render labelled snippets.
#[derive(Debug, Error)]
pub enum D2Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl D2Error {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
