//! # Analytics Errors
//!
//! Batch-level failures carry a stable machine-readable [`code`] so callers
//! can branch on the kind of failure without matching `Display` text, and
//! [`ErrorBody`] gives them a serializable shape for reporting.
//!
//! [`code`]: AnalyticsError::code

use cadence_core::CodecError;
use serde::Serialize;
use thiserror::Error;

/// Errors returned by the analytics crate.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// The batch is larger than the configured maximum. Nothing was decoded.
    #[error("batch of {count} events exceeds the limit of {max}")]
    ExceededLimit {
        /// Number of events supplied.
        count: usize,
        /// Configured maximum.
        max: usize,
    },

    /// None of the supplied events could be decoded.
    #[error("none of the {attempted} events could be decoded")]
    NoValidEvents {
        /// Number of events supplied.
        attempted: usize,
    },

    /// A record could not be decoded or re-encoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Configuration could not be parsed or is out of range.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AnalyticsError {
    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ExceededLimit { .. } => "EXCEEDED_LIMIT",
            Self::NoValidEvents { .. } => "NO_VALID_EVENTS",
            Self::Codec(_) => "CODEC_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Serializable `{code, message}` body.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

/// Structured error body for callers that report failures as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Stable error code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}
