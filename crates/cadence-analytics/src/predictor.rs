//! # Transition Predictor — First-Order Markov Model
//!
//! Predicts the next activity from a trailing window of encoded records.
//!
//! ## Algorithm
//!
//! 1. Keep only the last `lookback` records (clamped to
//!    [`MIN_LOOKBACK`]`..=`[`MAX_LOOKBACK`]) and decode them, dropping records
//!    that fail to decode or carry an empty activity.
//! 2. With fewer than two activities the result is
//!    [`SequencePattern::InsufficientData`].
//! 3. Count every consecutive `(from, to)` pair into a [`TransitionModel`].
//! 4. From the outgoing counts of the last activity, predict the
//!    most probable next activity. Ties go to the transition observed first.
//! 5. Label the pattern from the winning probability, or from label
//!    diversity when no transition is convincing.

use std::collections::HashMap;

use cadence_core::Codec;
use serde::Serialize;

use crate::stats::round_to;

/// Default window size.
pub const DEFAULT_LOOKBACK: usize = 10;

/// Smallest accepted window.
pub const MIN_LOOKBACK: usize = 3;

/// Largest accepted window.
pub const MAX_LOOKBACK: usize = 50;

/// Number of ranked candidates reported.
pub const MAX_ALTERNATIVES: usize = 3;

// ---------------------------------------------------------------------------
// SequencePattern
// ---------------------------------------------------------------------------

/// Qualitative label for the observed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencePattern {
    /// Winning transition probability above 0.8.
    StrongSequence,
    /// Winning transition probability above 0.6.
    ModerateSequence,
    /// Winning transition probability above 0.4.
    WeakSequence,
    /// More than 70% of the window's activities are distinct.
    HighDiversity,
    /// Fewer than 30% of the window's activities are distinct.
    Repetitive,
    /// Neither sequential nor clearly diverse or repetitive.
    Random,
    /// Fewer than two usable activities.
    InsufficientData,
}

impl SequencePattern {
    /// Label from the winning probability, falling back to diversity
    /// (`unique / total`).
    pub fn classify(max_probability: f64, diversity: f64) -> Self {
        if max_probability > 0.8 {
            Self::StrongSequence
        } else if max_probability > 0.6 {
            Self::ModerateSequence
        } else if max_probability > 0.4 {
            Self::WeakSequence
        } else if diversity > 0.7 {
            Self::HighDiversity
        } else if diversity < 0.3 {
            Self::Repetitive
        } else {
            Self::Random
        }
    }

    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrongSequence => "strong_sequence",
            Self::ModerateSequence => "moderate_sequence",
            Self::WeakSequence => "weak_sequence",
            Self::HighDiversity => "high_diversity",
            Self::Repetitive => "repetitive",
            Self::Random => "random",
            Self::InsufficientData => "insufficient_data",
        }
    }
}

impl std::fmt::Display for SequencePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TransitionModel
// ---------------------------------------------------------------------------

/// A candidate next activity with its transition probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// The candidate activity.
    pub activity: String,
    /// `count / total outgoing`, rounded to 2 decimals.
    pub probability: f64,
}

/// Transition counts between consecutive activities.
///
/// Outgoing counts keep first-observed order, which is what makes tie
/// breaking deterministic.
#[derive(Debug, Clone, Default)]
pub struct TransitionModel {
    transitions: HashMap<String, Vec<(String, usize)>>,
}

impl TransitionModel {
    /// Count every consecutive pair of a sequence.
    pub fn from_sequence<S: AsRef<str>>(activities: &[S]) -> Self {
        let mut model = Self::default();
        for pair in activities.windows(2) {
            model.record(pair[0].as_ref(), pair[1].as_ref());
        }
        model
    }

    fn record(&mut self, from: &str, to: &str) {
        let outgoing = self.transitions.entry(from.to_string()).or_default();
        match outgoing.iter_mut().find(|(next, _)| next == to) {
            Some((_, count)) => *count += 1,
            None => outgoing.push((to.to_string(), 1)),
        }
    }

    /// Observed `(next, count)` pairs from an activity, in first-seen order.
    pub fn outgoing(&self, from: &str) -> &[(String, usize)] {
        self.transitions.get(from).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of observed transitions from an activity.
    pub fn total_from(&self, from: &str) -> usize {
        self.outgoing(from).iter().map(|(_, c)| c).sum()
    }

    /// Most probable next activity and its unrounded probability. Ties go to
    /// the transition observed first.
    pub fn most_likely(&self, from: &str) -> Option<(&str, f64)> {
        let total = self.total_from(from);
        if total == 0 {
            return None;
        }
        let mut best: Option<(&str, usize)> = None;
        for (next, count) in self.outgoing(from) {
            if best.map_or(true, |(_, c)| *count > c) {
                best = Some((next.as_str(), *count));
            }
        }
        best.map(|(next, count)| (next, count as f64 / total as f64))
    }

    /// Candidates from an activity ranked by descending probability; equal
    /// probabilities keep first-seen order.
    pub fn ranked(&self, from: &str) -> Vec<Candidate> {
        let total = self.total_from(from);
        if total == 0 {
            return Vec::new();
        }
        let mut ranked: Vec<(&str, usize)> = self
            .outgoing(from)
            .iter()
            .map(|(next, count)| (next.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .map(|(activity, count)| Candidate {
                activity: activity.to_string(),
                probability: round_to(count as f64 / total as f64, 2),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

/// Result of a next-activity prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Predicted next activity, if any transition from the last one was seen.
    pub next_activity: Option<String>,
    /// Probability of the prediction, rounded to 2 decimals; 0 without one.
    pub confidence: f64,
    /// Qualitative sequence label.
    pub pattern: SequencePattern,
    /// Up to three candidates ranked by probability.
    pub alternatives: Vec<Candidate>,
    /// Most frequent activity in the window (first seen wins ties).
    pub most_frequent: Option<String>,
    /// Number of usable activities in the window.
    pub sample_size: usize,
}

impl Prediction {
    fn insufficient(activities: &[&str]) -> Self {
        Self {
            next_activity: None,
            confidence: 0.0,
            pattern: SequencePattern::InsufficientData,
            alternatives: Vec::new(),
            most_frequent: activities.first().map(|a| a.to_string()),
            sample_size: activities.len(),
        }
    }
}

/// Predict from an already decoded, chronological activity sequence.
pub fn predict_from_activities(activities: &[&str]) -> Prediction {
    if activities.len() < 2 {
        return Prediction::insufficient(activities);
    }

    let model = TransitionModel::from_sequence(activities);
    let last = activities[activities.len() - 1];
    let best = model.most_likely(last);
    let max_probability = best.map_or(0.0, |(_, p)| p);

    let mut alternatives = model.ranked(last);
    alternatives.truncate(MAX_ALTERNATIVES);

    Prediction {
        next_activity: best.map(|(next, _)| next.to_string()),
        confidence: round_to(max_probability, 2),
        pattern: SequencePattern::classify(max_probability, diversity(activities)),
        alternatives,
        most_frequent: most_frequent(activities).map(str::to_string),
        sample_size: activities.len(),
    }
}

/// Ratio of distinct activities to total activities.
fn diversity(activities: &[&str]) -> f64 {
    if activities.is_empty() {
        return 0.0;
    }
    let mut unique: Vec<&str> = activities.to_vec();
    unique.sort_unstable();
    unique.dedup();
    unique.len() as f64 / activities.len() as f64
}

fn most_frequent<'a>(activities: &[&'a str]) -> Option<&'a str> {
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    for activity in activities {
        match counts.iter_mut().find(|(a, _)| a == activity) {
            Some((_, count)) => *count += 1,
            None => counts.push((*activity, 1)),
        }
    }
    let mut best: Option<(&'a str, usize)> = None;
    for (activity, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((activity, count));
        }
    }
    best.map(|(activity, _)| activity)
}

/// The trailing `lookback` items of a slice.
pub fn trailing_window<T>(items: &[T], lookback: usize) -> &[T] {
    &items[items.len().saturating_sub(lookback)..]
}

/// Clamp a requested window into the accepted range.
pub fn clamp_lookback(lookback: usize) -> usize {
    lookback.clamp(MIN_LOOKBACK, MAX_LOOKBACK)
}

// ---------------------------------------------------------------------------
// TransitionPredictor
// ---------------------------------------------------------------------------

/// Decodes a trailing window of encoded records and predicts the next activity.
#[derive(Debug, Clone)]
pub struct TransitionPredictor {
    codec: Codec,
    lookback: usize,
}

impl Default for TransitionPredictor {
    fn default() -> Self {
        Self::new(Codec::default(), DEFAULT_LOOKBACK)
    }
}

impl TransitionPredictor {
    /// Build a predictor. `lookback` is clamped to the accepted range.
    pub fn new(codec: Codec, lookback: usize) -> Self {
        Self {
            codec,
            lookback: clamp_lookback(lookback),
        }
    }

    /// The effective window size.
    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Predict the next activity from chronologically ordered encoded records.
    pub fn predict<S: AsRef<str>>(&self, events: &[S]) -> Prediction {
        let window = trailing_window(events, self.lookback);
        let activities: Vec<String> = window
            .iter()
            .filter_map(|event| self.codec.decode(event.as_ref()).ok())
            .map(|record| record.activity)
            .filter(|activity| !activity.is_empty())
            .collect();
        tracing::debug!(
            window = window.len(),
            usable = activities.len(),
            "decoded prediction window"
        );
        let refs: Vec<&str> = activities.iter().map(String::as_str).collect();
        predict_from_activities(&refs)
    }
}

/// Predict with the default codec.
pub fn predict_next<S: AsRef<str>>(events: &[S], lookback: usize) -> Prediction {
    TransitionPredictor::new(Codec::default(), lookback).predict(events)
}
