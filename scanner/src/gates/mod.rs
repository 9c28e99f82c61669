//! Entry gates: named boolean admission rules over a candidate's metrics.
//!
//! The gate set is an open, name-keyed collection rather than a closed enum.
//! Every gate is evaluated on every call, so a failing candidate still
//! reports the outcome of each rule.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::microstructure::vadr::estimate_vadr_from_total_depth;

pub const SCORE_THRESHOLD: &str = "score_threshold";
pub const SPREAD_LIMIT: &str = "spread_limit";
pub const DEPTH_MINIMUM: &str = "depth_minimum";
pub const VADR_THRESHOLD: &str = "vadr_threshold";

/// Values the gates look at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GateInput {
    pub score: f64,
    pub spread_bps: f64,
    pub depth_usd: f64,
    pub vadr: f64,
}

impl GateInput {
    /// Input for a standalone gate check that only has per-side depth
    /// figures and no snapshot. `depth_usd` is the bid/ask mean and VADR
    /// comes from the pre-summed total.
    pub fn from_side_depths(score: f64, spread_bps: f64, bid_depth: f64, ask_depth: f64) -> Self {
        let total = bid_depth + ask_depth;
        Self {
            score,
            spread_bps,
            depth_usd: total / 2.0,
            vadr: estimate_vadr_from_total_depth(total),
        }
    }
}

/// Thresholds for the default gate set.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateThresholds {
    /// `score >= min_score`
    pub min_score: f64,
    /// `spread_bps < max_spread_bps` (strict)
    pub max_spread_bps: f64,
    /// `depth_usd >= min_depth_usd`
    pub min_depth_usd: f64,
    /// `vadr >= min_vadr`
    pub min_vadr: f64,
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            min_score: 75.0,
            max_spread_bps: 50.0,
            min_depth_usd: 100_000.0,
            min_vadr: 1.75,
        }
    }
}

pub type GateRule = Box<dyn Fn(&GateInput) -> bool + Send + Sync>;

/// Per-gate results plus the aggregate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GateOutcome {
    pub results: BTreeMap<String, bool>,
    /// True iff every entry of `results` is true.
    pub passes: bool,
}

impl GateOutcome {
    fn from_results(results: BTreeMap<String, bool>) -> Self {
        let passes = results.values().all(|v| *v);
        Self { results, passes }
    }
}

pub struct GateEvaluator {
    gates: BTreeMap<String, GateRule>,
}

impl GateEvaluator {
    /// Evaluator with no gates; every input passes until gates are added.
    pub fn empty() -> Self {
        Self {
            gates: BTreeMap::new(),
        }
    }

    /// The four standard entry gates.
    pub fn new(t: GateThresholds) -> Self {
        Self::empty()
            .with_gate(SCORE_THRESHOLD, move |i| i.score >= t.min_score)
            .with_gate(SPREAD_LIMIT, move |i| i.spread_bps < t.max_spread_bps)
            .with_gate(DEPTH_MINIMUM, move |i| i.depth_usd >= t.min_depth_usd)
            .with_gate(VADR_THRESHOLD, move |i| i.vadr >= t.min_vadr)
    }

    /// Adds a gate, replacing any existing gate with the same name.
    pub fn with_gate<F>(mut self, name: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&GateInput) -> bool + Send + Sync + 'static,
    {
        self.gates.insert(name.into(), Box::new(rule));
        self
    }

    pub fn gate_names(&self) -> impl Iterator<Item = &str> {
        self.gates.keys().map(String::as_str)
    }

    /// Evaluates every gate, without short-circuiting.
    pub fn evaluate(&self, input: &GateInput) -> GateOutcome {
        let results = self
            .gates
            .iter()
            .map(|(name, rule)| (name.clone(), rule(input)))
            .collect();
        GateOutcome::from_results(results)
    }
}

impl Default for GateEvaluator {
    fn default() -> Self {
        Self::new(GateThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn passing() -> GateInput {
        GateInput {
            score: 80.0,
            spread_bps: 10.0,
            depth_usd: 250_000.0,
            vadr: 2.5,
        }
    }

    #[test]
    fn passing_candidate_passes_every_gate() {
        let out = GateEvaluator::default().evaluate(&passing());

        assert!(out.passes);
        assert_eq!(out.results.len(), 4);
        assert!(out.results.values().all(|v| *v));
    }

    #[test]
    fn threshold_boundaries() {
        let gates = GateEvaluator::default();
        let at = |f: fn(&mut GateInput)| {
            let mut i = passing();
            f(&mut i);
            gates.evaluate(&i)
        };

        assert!(at(|i| i.score = 75.0).results[SCORE_THRESHOLD]);
        assert!(!at(|i| i.score = 74.99).results[SCORE_THRESHOLD]);
        assert!(!at(|i| i.spread_bps = 50.0).results[SPREAD_LIMIT]);
        assert!(at(|i| i.spread_bps = 49.99).results[SPREAD_LIMIT]);
        assert!(at(|i| i.depth_usd = 100_000.0).results[DEPTH_MINIMUM]);
        assert!(at(|i| i.vadr = 1.75).results[VADR_THRESHOLD]);
        assert!(!at(|i| i.vadr = 1.74).results[VADR_THRESHOLD]);
    }

    #[test]
    fn every_gate_is_reported_when_an_early_gate_fails() {
        let mut input = passing();
        input.score = 0.0;
        input.depth_usd = 551.0;

        let out = GateEvaluator::default().evaluate(&input);

        assert!(!out.passes);
        assert_eq!(out.results.len(), 4);
        assert!(!out.results[SCORE_THRESHOLD]);
        assert!(out.results[SPREAD_LIMIT]);
        assert!(!out.results[DEPTH_MINIMUM]);
        assert!(out.results[VADR_THRESHOLD]);
    }

    #[test]
    fn custom_gates_extend_and_replace() {
        let gates = GateEvaluator::default()
            .with_gate("tight_spread", |i| i.spread_bps < 5.0)
            .with_gate(SCORE_THRESHOLD, |i| i.score >= 90.0);

        let out = gates.evaluate(&passing());

        assert_eq!(out.results.len(), 5);
        assert!(!out.results["tight_spread"]);
        assert!(!out.results[SCORE_THRESHOLD]);
        assert!(!out.passes);
    }

    #[test]
    fn standalone_check_uses_total_depth_ladder() {
        let input = GateInput::from_side_depths(80.0, 10.0, 150_000.0, 110_000.0);
        assert_eq!(input.depth_usd, 130_000.0);
        assert_eq!(input.vadr, 2.0);
        assert!(GateEvaluator::default().evaluate(&input).passes);

        let thin = GateInput::from_side_depths(80.0, 10.0, 60_000.0, 40_000.0);
        assert_eq!(thin.vadr, 1.2);
        let out = GateEvaluator::default().evaluate(&thin);
        assert!(!out.results[DEPTH_MINIMUM]);
        assert!(!out.results[VADR_THRESHOLD]);
    }

    #[test]
    fn empty_gate_set_passes() {
        let out = GateEvaluator::empty().evaluate(&passing());
        assert!(out.passes);
        assert!(out.results.is_empty());
    }

    #[test]
    fn toggling_one_gate_flips_the_aggregate() {
        let gates = GateEvaluator::default();
        let breakers: [(&str, fn(&mut GateInput)); 4] = [
            (SCORE_THRESHOLD, |i| i.score = 10.0),
            (SPREAD_LIMIT, |i| i.spread_bps = 500.0),
            (DEPTH_MINIMUM, |i| i.depth_usd = 10.0),
            (VADR_THRESHOLD, |i| i.vadr = 0.5),
        ];

        for (name, brk) in breakers {
            let mut input = passing();
            brk(&mut input);
            let out = gates.evaluate(&input);

            assert!(!out.passes, "{name} should fail the candidate");
            let failed: Vec<_> = out.results.iter().filter(|(_, v)| !**v).collect();
            assert_eq!(failed.len(), 1);
            assert_eq!(failed[0].0, name);
        }
    }

    proptest! {
        #[test]
        fn aggregate_is_conjunction_and_deterministic(
            score in 0.0f64..100.0,
            spread_bps in 0.0f64..200.0,
            depth_usd in 0.0f64..1_000_000.0,
            vadr in 0.0f64..4.0,
        ) {
            let gates = GateEvaluator::default();
            let input = GateInput { score, spread_bps, depth_usd, vadr };

            let a = gates.evaluate(&input);
            let b = gates.evaluate(&input);

            prop_assert_eq!(a.passes, a.results.values().all(|v| *v));
            prop_assert_eq!(a, b);
        }
    }
}
