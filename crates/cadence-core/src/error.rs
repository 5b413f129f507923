//! # Error Hierarchy
//!
//! Structured error types for the activity record codec, built with
//! `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Only missing or insufficient mandatory structure is a hard failure.
//! Malformed optional fields (value type, context, version, timestamp)
//! degrade to permissive defaults and are reported as
//! [`Diagnostic`](crate::diagnostics::Diagnostic)s instead.

use thiserror::Error;

/// Top-level error type for codec operations that both decode and encode
/// (sanitization, context injection, re-encoding).
#[derive(Error, Debug)]
pub enum CodecError {
    /// Encoding a record failed.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Decoding a record failed.
    #[error("decoding error: {0}")]
    Decoding(#[from] DecodingError),
}

/// Errors produced while encoding an activity record.
#[derive(Error, Debug)]
pub enum EncodingError {
    /// The activity label is empty.
    #[error("invalid activity: activity label must be non-empty text")]
    InvalidActivity,

    /// Fewer than three non-empty fields remained after rendering.
    #[error("structural error: encoded record has {fields} non-empty fields, at least 3 required")]
    Structural {
        /// Number of non-empty fields that were produced.
        fields: usize,
    },

    /// JSON serialization of a value or context failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors produced while decoding an activity record.
#[derive(Error, Debug)]
pub enum DecodingError {
    /// The input splits into fewer than three non-empty fields.
    #[error("input too short: {fields} non-empty fields, at least 3 required")]
    TooShort {
        /// Number of non-empty fields found.
        fields: usize,
    },
}
