//! # Diagnostics — Structured Non-Fatal Warnings
//!
//! The codec degrades gracefully on malformed optional fields instead of
//! failing. Each degradation is reported as a [`Diagnostic`] through an
//! injected [`DiagnosticSink`]; the core never assumes a console exists.
//!
//! - [`TracingSink`] forwards to `tracing::warn!` with structured fields.
//! - [`CollectingSink`] buffers diagnostics for callers that want to inspect
//!   them (and for tests).
//! - [`NullSink`] discards everything.

use parking_lot::Mutex;
use serde::Serialize;

/// The kind of non-fatal condition encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A nested container exceeded the encoding depth cap and was dropped.
    DepthLimit,
    /// The timestamp field was not an integer.
    InvalidTimestamp,
    /// The context field was not a JSON object and was kept as raw text.
    UnparsedContext,
    /// An integrity envelope checksum did not match its data.
    IntegrityMismatch,
    /// The record carried more than five fields; the extras were ignored.
    SurplusFields,
}

impl DiagnosticKind {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DepthLimit => "depth_limit",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::UnparsedContext => "unparsed_context",
            Self::IntegrityMismatch => "integrity_mismatch",
            Self::SurplusFields => "surplus_fields",
        }
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single non-fatal condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// What happened.
    pub kind: DiagnosticKind,
    /// Human-readable detail.
    pub message: String,
}

impl Diagnostic {
    /// Build a diagnostic.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Receiver for non-fatal diagnostics.
pub trait DiagnosticSink: Send + Sync + std::fmt::Debug {
    /// Record one diagnostic.
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `tracing` facade at WARN level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        tracing::warn!(kind = %diagnostic.kind, "{}", diagnostic.message);
    }
}

/// Discards diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _diagnostic: Diagnostic) {}
}

/// Buffers diagnostics in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything collected so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    /// Remove and return everything collected so far.
    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// Number of collected diagnostics of the given kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.lock().iter().filter(|d| d.kind == kind).count()
    }

    /// True when nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.entries.lock().push(diagnostic);
    }
}
