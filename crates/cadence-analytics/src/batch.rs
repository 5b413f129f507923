//! # Batch Analytics Façade
//!
//! Runs every analyzer over a collection of encoded records and folds the
//! results into one [`BatchReport`].
//!
//! ## Flow
//!
//! 1. Reject batches over `max_events` with
//!    [`AnalyticsError::ExceededLimit`] before decoding anything.
//! 2. An empty batch yields [`BatchReport::empty`], not an error.
//! 3. Decode every event once, tolerating individual failures. If none
//!    decode, fail with [`AnalyticsError::NoValidEvents`].
//! 4. Aggregate counts, impact, and complexity over the decoded records, then
//!    run the transition predictor over the trailing window and the temporal
//!    analyzer over all decoded timestamps.
//! 5. Fold validity, diversity, rhythm, and predictability into a quality
//!    score in `[0, 100]`.

use std::collections::HashSet;

use cadence_core::{ActivityRecord, Codec};
use serde::{Deserialize, Serialize};

use crate::complexity::{complexity, ComplexityLevel};
use crate::error::AnalyticsError;
use crate::impact::{impact, ImpactLevel};
use crate::predictor::{
    clamp_lookback, predict_from_activities, trailing_window, Prediction, DEFAULT_LOOKBACK,
};
use crate::stats::round_to;
use crate::temporal::TemporalStats;

/// Default upper bound on batch size.
pub const DEFAULT_MAX_EVENTS: usize = 10_000;

/// Batch limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Largest accepted batch.
    pub max_events: usize,
    /// Predictor window; clamped to the predictor's accepted range.
    pub lookback: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_events: DEFAULT_MAX_EVENTS,
            lookback: DEFAULT_LOOKBACK,
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Counts and time range of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Events supplied.
    pub total_events: usize,
    /// Events that decoded.
    pub valid_events: usize,
    /// Events that failed to decode.
    pub invalid_events: usize,
    /// `valid / total`, rounded to 2 decimals.
    pub valid_ratio: f64,
    /// Distinct non-empty activities among decoded events.
    pub unique_activities: usize,
    /// Newest minus oldest decoded timestamp.
    pub timespan_ms: i64,
    /// Age of the newest event at analysis time.
    pub newest_age_ms: Option<i64>,
    /// Age of the oldest event at analysis time.
    pub oldest_age_ms: Option<i64>,
}

/// Impact aggregate over decoded values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactSummary {
    /// Sum of value impacts, rounded to 2 decimals.
    pub total: f64,
    /// Mean impact per decoded event, rounded to 2 decimals.
    pub average: f64,
    /// Band of the unrounded average.
    pub level: ImpactLevel,
}

/// Complexity aggregate over decoded contexts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexitySummary {
    /// Mean context score per decoded event, rounded to 2 decimals.
    pub average: f64,
    /// Highest context score.
    pub max: f64,
    /// Band of the unrounded average.
    pub level: ComplexityLevel,
}

/// Everything the façade computes for one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    /// Clock reading when the analysis ran.
    pub analyzed_at: i64,
    /// Counts and time range.
    pub summary: BatchSummary,
    /// Impact aggregate.
    pub impact: ImpactSummary,
    /// Complexity aggregate.
    pub complexity: ComplexitySummary,
    /// `None` for an empty batch.
    pub prediction: Option<Prediction>,
    /// `None` with fewer than two decoded timestamps.
    pub temporal: Option<TemporalStats>,
    /// Composite score in `[0, 100]`, rounded to 1 decimal.
    pub quality_score: f64,
}

impl BatchReport {
    /// The zero-metrics report for an empty batch.
    pub fn empty(analyzed_at: i64) -> Self {
        Self {
            analyzed_at,
            summary: BatchSummary::default(),
            impact: ImpactSummary {
                total: 0.0,
                average: 0.0,
                level: ImpactLevel::Minimal,
            },
            complexity: ComplexitySummary {
                average: 0.0,
                max: 0.0,
                level: ComplexityLevel::Simple,
            },
            prediction: None,
            temporal: None,
            quality_score: 0.0,
        }
    }
}

/// `40·valid_ratio + 20·min(unique/valid, 1) + 20·consistency + 20·confidence`,
/// rounded to 1 decimal.
pub fn quality_score(
    valid_ratio: f64,
    unique_activities: usize,
    valid_events: usize,
    consistency: f64,
    confidence: f64,
) -> f64 {
    let diversity = if valid_events == 0 {
        0.0
    } else {
        (unique_activities as f64 / valid_events as f64).min(1.0)
    };
    let raw = 40.0 * valid_ratio + 20.0 * diversity + 20.0 * consistency + 20.0 * confidence;
    round_to(raw.clamp(0.0, 100.0), 1)
}

// ---------------------------------------------------------------------------
// BatchAnalyzer
// ---------------------------------------------------------------------------

/// Configurable batch façade.
#[derive(Debug, Clone, Default)]
pub struct BatchAnalyzer {
    options: BatchOptions,
    codec: Codec,
}

impl BatchAnalyzer {
    /// Build an analyzer. The codec's clock supplies `analyzed_at` and ages.
    pub fn new(codec: Codec, options: BatchOptions) -> Self {
        Self { options, codec }
    }

    /// The active limits.
    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Analyze a batch of encoded records in chronological order.
    ///
    /// # Errors
    ///
    /// - [`AnalyticsError::ExceededLimit`] if `events` is larger than
    ///   `max_events`. Nothing is decoded.
    /// - [`AnalyticsError::NoValidEvents`] if the batch is non-empty and no
    ///   event decodes.
    pub fn analyze<S: AsRef<str>>(&self, events: &[S]) -> Result<BatchReport, AnalyticsError> {
        if events.len() > self.options.max_events {
            return Err(AnalyticsError::ExceededLimit {
                count: events.len(),
                max: self.options.max_events,
            });
        }

        let now = self.codec.now_millis();
        if events.is_empty() {
            return Ok(BatchReport::empty(now));
        }

        let decoded: Vec<Option<ActivityRecord>> = events
            .iter()
            .map(|event| self.codec.decode(event.as_ref()).ok())
            .collect();
        let records: Vec<&ActivityRecord> = decoded.iter().flatten().collect();
        if records.is_empty() {
            return Err(AnalyticsError::NoValidEvents {
                attempted: events.len(),
            });
        }

        let total = events.len();
        let valid = records.len();
        tracing::debug!(total, valid, "decoded batch");

        let unique: HashSet<&str> = records
            .iter()
            .map(|r| r.activity.as_str())
            .filter(|a| !a.is_empty())
            .collect();

        let timestamps: Vec<i64> = records.iter().filter_map(|r| r.timestamp).collect();
        let newest = timestamps.iter().copied().max();
        let oldest = timestamps.iter().copied().min();
        let timespan_ms = match (newest, oldest) {
            (Some(n), Some(o)) => n.saturating_sub(o),
            _ => 0,
        };

        let summary = BatchSummary {
            total_events: total,
            valid_events: valid,
            invalid_events: total - valid,
            valid_ratio: round_to(valid as f64 / total as f64, 2),
            unique_activities: unique.len(),
            timespan_ms,
            newest_age_ms: newest.map(|t| now.saturating_sub(t)),
            oldest_age_ms: oldest.map(|t| now.saturating_sub(t)),
        };

        let impact_total: f64 = records.iter().map(|r| impact(&r.value)).sum();
        let impact_average = impact_total / valid as f64;
        let impact = ImpactSummary {
            total: round_to(impact_total, 2),
            average: round_to(impact_average, 2),
            level: ImpactLevel::classify(impact_average),
        };

        let scores: Vec<f64> = records
            .iter()
            .map(|r| r.context.as_ref().map_or(0.0, complexity))
            .collect();
        let complexity_average = scores.iter().sum::<f64>() / valid as f64;
        let complexity = ComplexitySummary {
            average: round_to(complexity_average, 2),
            max: scores.iter().copied().fold(0.0, f64::max),
            level: ComplexityLevel::classify(complexity_average),
        };

        let lookback = clamp_lookback(self.options.lookback);
        let window: Vec<&str> = trailing_window(&decoded, lookback)
            .iter()
            .flatten()
            .map(|r| r.activity.as_str())
            .filter(|a| !a.is_empty())
            .collect();
        let prediction = predict_from_activities(&window);

        let temporal = TemporalStats::from_timestamps(timestamps);

        let quality_score = quality_score(
            valid as f64 / total as f64,
            unique.len(),
            valid,
            temporal.as_ref().map_or(0.0, |t| t.consistency),
            prediction.confidence,
        );

        Ok(BatchReport {
            analyzed_at: now,
            summary,
            impact,
            complexity,
            prediction: Some(prediction),
            temporal,
            quality_score,
        })
    }
}

/// Analyze with the default codec.
///
/// # Errors
///
/// See [`BatchAnalyzer::analyze`].
pub fn analyze_batch<S: AsRef<str>>(
    events: &[S],
    options: &BatchOptions,
) -> Result<BatchReport, AnalyticsError> {
    BatchAnalyzer::new(Codec::default(), *options).analyze(events)
}
