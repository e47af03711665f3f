/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for CRYSTAL output parsing

use std::io;
use thiserror::Error;

/// Errors that can occur while reading a CRYSTAL output file
#[derive(Error, Debug)]
pub enum InputError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// A section was reached before the state it depends on was parsed
    #[error("Section '{section}' reached before {requires} was parsed")]
    OrderingError {
        section: &'static str,
        requires: &'static str,
    },

    /// A line did not tokenize into the expected shape
    #[error("Format error at line {line}: expected {expected}, found '{found}'")]
    FormatError {
        line: usize,
        expected: String,
        found: String,
    },

    /// The stream ended in the middle of a section
    #[error("Input truncated while reading {context} (last line read: {line})")]
    TruncatedInput { context: String, line: usize },

    /// A matrix reached its final entry with interior entries never written
    #[error("Matrix '{context}' is incomplete: {filled} of {expected} entries written")]
    IncompleteMatrix {
        context: String,
        filled: usize,
        expected: usize,
    },

    #[error("Missing required section: {0}")]
    MissingSection(&'static str),

    #[error("Unsupported calculation mode: {0}")]
    UnsupportedMode(String),

    #[error("Inconsistent data: {0}")]
    InconsistentData(String),

    #[error("Invalid parser configuration: {0}")]
    InvalidConfig(String),
}

impl InputError {
    /// Build a format error for the given line
    pub fn format(line: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        InputError::FormatError {
            line,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Build a truncation error for the given context
    pub fn truncated(context: impl Into<String>, line: usize) -> Self {
        InputError::TruncatedInput {
            context: context.into(),
            line,
        }
    }
}

/// Result type for input operations
pub type Result<T> = std::result::Result<T, InputError>;
