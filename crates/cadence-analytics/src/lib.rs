//! # cadence-analytics — Activity Record Analytics
//!
//! Stateless analytics over encoded activity records:
//!
//! - **Complexity** (`complexity.rs`): bounded iterative scoring of nested
//!   contexts with depth, cycle, and iteration guards.
//!
//! - **Impact** (`impact.rs`): variant-dispatched magnitude of record values.
//!
//! - **Predictor** (`predictor.rs`): first-order Markov next-activity
//!   prediction over a trailing window.
//!
//! - **Temporal** (`temporal.rs`): inter-arrival statistics.
//!
//! - **Sanitize / Inject** (`sanitize.rs`, `inject.rs`): new records with
//!   redacted or enriched context.
//!
//! - **Batch** (`batch.rs`): one report over a collection of records.
//!
//! ## Resource Bounds
//!
//! Every traversal is capped: complexity by depth, node identity, and
//! iteration count; impact by depth and container truncation; batches by
//! `max_events`. No call holds state between invocations, and the only
//! external effect is the clock reached through the injected [`Codec`].
//!
//! [`Codec`]: cadence_core::Codec

pub mod batch;
pub mod complexity;
pub mod config;
pub mod error;
pub mod impact;
pub mod inject;
pub mod predictor;
pub mod sanitize;
pub mod stats;
pub mod temporal;

pub use batch::{analyze_batch, BatchAnalyzer, BatchOptions, BatchReport};
pub use complexity::{analyze_complexity, complexity, ComplexityLevel, ComplexityReport, NodeView};
pub use config::AnalyticsConfig;
pub use error::{AnalyticsError, ErrorBody};
pub use impact::{impact, ImpactLevel};
pub use inject::{inject_context, ContextInjector, InjectOptions};
pub use predictor::{predict_next, Prediction, SequencePattern, TransitionPredictor};
pub use sanitize::{sanitize, Sanitizer, DEFAULT_SENSITIVE_KEYS};
pub use temporal::{temporal, TemporalAnalyzer, TemporalStats, Trend};
