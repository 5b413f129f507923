//! # Complexity Analyzer — Bounded Structural Scoring
//!
//! Scores the structural complexity of a record context in `[0, 100]`.
//!
//! ## Termination
//!
//! The traversal is iterative over an explicit work stack and bounded three
//! ways, so it terminates on any input shape, including cyclic graphs:
//!
//! - **Depth cap** ([`MAX_DEPTH`]): a map deeper than the cap adds
//!   [`OVERFLOW_PENALTY`] and is not descended.
//! - **Cycle guard**: nodes are tracked by identity; reaching an already
//!   visited node adds [`CYCLE_PENALTY`] and is not descended.
//! - **Iteration cap** ([`MAX_ITERATIONS`]): total work is bounded
//!   regardless of breadth.
//!
//! ## Scoring
//!
//! Each visited map scores `1 + min(0.5 × keys, 20)`. Lists, temporal values
//! and scalars are leaves. A non-map root scores 0. The sum is clamped to
//! `[0, 100]`.
//!
//! The traversal runs over the [`NodeView`] trait rather than [`Value`]
//! directly. `&Value` trees are acyclic by construction; other
//! representations (shared or reference-counted graphs) can implement the
//! trait and rely on the cycle guard.

use std::collections::HashSet;
use std::hash::Hash;

use cadence_core::Value;
use serde::Serialize;

/// Maximum map depth scored normally. The root is depth 0.
pub const MAX_DEPTH: usize = 8;

/// Score added for a map beyond [`MAX_DEPTH`].
pub const OVERFLOW_PENALTY: f64 = 10.0;

/// Score added when a node is reached a second time.
pub const CYCLE_PENALTY: f64 = 5.0;

/// Maximum number of stack pops per traversal.
pub const MAX_ITERATIONS: usize = 1000;

/// Cap on the per-node key contribution.
pub const MAX_KEY_SCORE: f64 = 20.0;

/// Upper bound of the final score.
pub const MAX_SCORE: f64 = 100.0;

/// A node in a context graph, as seen by the complexity traversal.
pub trait NodeView: Sized {
    /// Identity used by the cycle guard.
    type Id: Copy + Eq + Hash;

    /// This node's identity.
    fn id(&self) -> Self::Id;

    /// Number of keys if this node is a map, `None` for leaves.
    fn key_count(&self) -> Option<usize>;

    /// Children that are themselves maps.
    fn branches(&self) -> Vec<Self>;
}

impl<'a> NodeView for &'a Value {
    type Id = *const Value;

    fn id(&self) -> Self::Id {
        *self as *const Value
    }

    fn key_count(&self) -> Option<usize> {
        match *self {
            Value::Map(map) => Some(map.len()),
            Value::Null
            | Value::Number(_)
            | Value::Bool(_)
            | Value::Text(_)
            | Value::Temporal(_)
            | Value::List(_) => None,
        }
    }

    fn branches(&self) -> Vec<Self> {
        match *self {
            Value::Map(map) => map
                .values()
                .filter(|v| matches!(v, Value::Map(_)))
                .collect(),
            Value::Null
            | Value::Number(_)
            | Value::Bool(_)
            | Value::Text(_)
            | Value::Temporal(_)
            | Value::List(_) => Vec::new(),
        }
    }
}

/// Outcome of a complexity traversal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComplexityReport {
    /// Final clamped score.
    pub score: f64,
    /// Maps scored normally.
    pub visited: usize,
    /// Nodes reached more than once.
    pub revisits: usize,
    /// Maps beyond the depth cap.
    pub overflows: usize,
    /// Stack pops performed.
    pub iterations: usize,
    /// True if the iteration cap stopped the traversal early.
    pub truncated: bool,
}

/// Score a context. Non-map contexts score 0.
pub fn complexity(context: &Value) -> f64 {
    analyze_complexity(context).score
}

/// Run the bounded traversal and report what it saw.
pub fn analyze_complexity<N: NodeView>(root: N) -> ComplexityReport {
    let mut report = ComplexityReport::default();
    if root.key_count().is_none() {
        return report;
    }

    let mut seen: HashSet<N::Id> = HashSet::new();
    let mut stack = vec![(root, 0usize)];
    let mut raw = 0.0;

    while let Some((node, depth)) = stack.pop() {
        if report.iterations >= MAX_ITERATIONS {
            report.truncated = true;
            break;
        }
        report.iterations += 1;

        if depth > MAX_DEPTH {
            raw += OVERFLOW_PENALTY;
            report.overflows += 1;
            continue;
        }
        if !seen.insert(node.id()) {
            raw += CYCLE_PENALTY;
            report.revisits += 1;
            continue;
        }

        let keys = node.key_count().unwrap_or(0);
        raw += 1.0 + (0.5 * keys as f64).min(MAX_KEY_SCORE);
        report.visited += 1;

        for child in node.branches() {
            stack.push((child, depth + 1));
        }
    }

    if report.truncated {
        tracing::debug!(
            iterations = report.iterations,
            visited = report.visited,
            "complexity traversal hit the iteration cap"
        );
    }

    report.score = raw.clamp(0.0, MAX_SCORE);
    report
}

/// Qualitative complexity band for an average score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityLevel {
    /// Average below 10.
    Simple,
    /// Average in `[10, 30)`.
    Moderate,
    /// Average in `[30, 60)`.
    Complex,
    /// Average of 60 or more.
    HighlyComplex,
}

impl ComplexityLevel {
    /// Band for an average complexity score.
    pub fn classify(average: f64) -> Self {
        if average < 10.0 {
            Self::Simple
        } else if average < 30.0 {
            Self::Moderate
        } else if average < 60.0 {
            Self::Complex
        } else {
            Self::HighlyComplex
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::Map;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn flat(keys: usize) -> Value {
        let map: Map = (0..keys).map(|i| (format!("k{i}"), Value::Number(i as f64))).collect();
        Value::Map(map)
    }

    fn nested(levels: usize) -> Value {
        let mut v = Value::Bool(true);
        for _ in 0..levels {
            let mut m = Map::new();
            m.insert("n".into(), v);
            v = Value::Map(m);
        }
        v
    }

    #[test]
    fn test_non_map_scores_zero() {
        assert_eq!(complexity(&Value::Text("x".into())), 0.0);
        assert_eq!(complexity(&Value::List(vec![flat(3)])), 0.0);
        assert_eq!(complexity(&Value::Null), 0.0);
    }

    #[test]
    fn test_empty_map_scores_one() {
        assert_eq!(complexity(&flat(0)), 1.0);
    }

    #[test]
    fn test_flat_map_key_scoring() {
        assert_eq!(complexity(&flat(4)), 3.0);
        // Key contribution caps at 20.
        assert_eq!(complexity(&flat(40)), 21.0);
        assert_eq!(complexity(&flat(80)), 21.0);
    }

    #[test]
    fn test_lists_are_leaves() {
        let mut m = Map::new();
        m.insert("items".into(), Value::List(vec![flat(10), flat(10)]));
        assert_eq!(complexity(&Value::Map(m)), 1.5);
    }

    #[test]
    fn test_nested_maps_sum() {
        let v = Value::from(serde_json::json!({"a": {"b": 1, "c": 2}, "d": {}}));
        // root: 1 + 1.0, a: 1 + 1.0, d: 1 + 0
        assert_eq!(complexity(&v), 5.0);
    }

    #[test]
    fn test_depth_cap_applies_single_overflow_penalty() {
        // Depths 0..=8 score 1.5 each; the map at depth 9 adds the penalty
        // and nothing below it is visited.
        let within = analyze_complexity(&nested(9));
        assert_eq!(within.score, 13.5);
        assert_eq!(within.overflows, 0);

        let deep = analyze_complexity(&nested(12));
        assert_eq!(deep.overflows, 1);
        assert_eq!(deep.visited, 9);
        assert_eq!(deep.score, 13.5 + OVERFLOW_PENALTY);
    }

    #[test]
    fn test_score_clamped_to_max() {
        let wide: Map = (0..200).map(|i| (format!("k{i}"), flat(40))).collect();
        let report = analyze_complexity(&Value::Map(wide));
        assert_eq!(report.score, MAX_SCORE);
    }

    #[test]
    fn test_iteration_cap_bounds_work() {
        let wide: Map = (0..1500).map(|i| (format!("k{i:04}"), flat(0))).collect();
        let report = analyze_complexity(&Value::Map(wide));
        assert!(report.truncated);
        assert_eq!(report.iterations, MAX_ITERATIONS);
        assert_eq!(report.score, MAX_SCORE);
    }

    #[test]
    fn test_levels() {
        assert_eq!(ComplexityLevel::classify(0.0), ComplexityLevel::Simple);
        assert_eq!(ComplexityLevel::classify(10.0), ComplexityLevel::Moderate);
        assert_eq!(ComplexityLevel::classify(45.0), ComplexityLevel::Complex);
        assert_eq!(ComplexityLevel::classify(100.0), ComplexityLevel::HighlyComplex);
    }

    // ---- cyclic graphs ----

    #[derive(Default)]
    struct GraphNode {
        leaf_keys: usize,
        children: Vec<Rc<RefCell<GraphNode>>>,
    }

    #[derive(Clone)]
    struct Handle(Rc<RefCell<GraphNode>>);

    impl NodeView for Handle {
        type Id = usize;

        fn id(&self) -> usize {
            Rc::as_ptr(&self.0) as usize
        }

        fn key_count(&self) -> Option<usize> {
            let node = self.0.borrow();
            Some(node.leaf_keys + node.children.len())
        }

        fn branches(&self) -> Vec<Self> {
            self.0.borrow().children.iter().cloned().map(Handle).collect()
        }
    }

    fn break_cycles(node: &Rc<RefCell<GraphNode>>) {
        node.borrow_mut().children.clear();
    }

    #[test]
    fn test_self_reference_terminates() {
        let root = Rc::new(RefCell::new(GraphNode::default()));
        root.borrow_mut().children.push(root.clone());

        let report = analyze_complexity(Handle(root.clone()));
        assert_eq!(report.visited, 1);
        assert_eq!(report.revisits, 1);
        // root: 1 + 0.5, then one revisit.
        assert_eq!(report.score, 1.5 + CYCLE_PENALTY);
        assert!(report.score.is_finite());

        break_cycles(&root);
    }

    #[test]
    fn test_mutual_cycle_terminates() {
        let a = Rc::new(RefCell::new(GraphNode {
            leaf_keys: 2,
            children: Vec::new(),
        }));
        let b = Rc::new(RefCell::new(GraphNode::default()));
        a.borrow_mut().children.push(b.clone());
        b.borrow_mut().children.push(a.clone());

        let report = analyze_complexity(Handle(a.clone()));
        assert_eq!(report.visited, 2);
        assert_eq!(report.revisits, 1);
        assert!(report.iterations <= MAX_ITERATIONS);

        break_cycles(&a);
        break_cycles(&b);
    }

    #[test]
    fn test_shared_child_counted_once() {
        let shared = Rc::new(RefCell::new(GraphNode {
            leaf_keys: 4,
            children: Vec::new(),
        }));
        let root = Rc::new(RefCell::new(GraphNode {
            leaf_keys: 0,
            children: vec![shared.clone(), shared.clone()],
        }));
        let report = analyze_complexity(Handle(root));
        assert_eq!(report.visited, 2);
        assert_eq!(report.revisits, 1);
        // root: 1 + 1.0, shared: 1 + 2.0, plus one revisit penalty.
        assert_eq!(report.score, 2.0 + 3.0 + CYCLE_PENALTY);
    }
}
