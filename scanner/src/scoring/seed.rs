use std::collections::HashMap;

use super::{CompositeScore, RegimeWeights, Scorer, TRENDING_BULL};

const BASE: f64 = 40.0;
const SPREAD: u64 = 40;
const TRENDING_BULL_BONUS: f64 = 15.0;

/// Stand-in scorer derived only from the symbol's bytes and the regime.
///
/// `composite = 40 + (sum of symbol bytes mod 40)`, plus 15 under
/// `trending_bull`. No clock or randomness is involved.
#[derive(Clone, Debug, Default)]
pub struct SymbolSeedScorer {
    weights: HashMap<String, RegimeWeights>,
}

impl SymbolSeedScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Component weights for `regime`; regimes without weights use the
    /// trending-bull split.
    pub fn with_weights(mut self, regime: impl Into<String>, weights: RegimeWeights) -> Self {
        self.weights.insert(regime.into(), weights);
        self
    }

    fn composite(symbol: &str, regime: &str) -> f64 {
        let seed: u64 = symbol.bytes().map(u64::from).sum();
        let mut score = BASE + (seed % SPREAD) as f64;
        if regime == TRENDING_BULL {
            score += TRENDING_BULL_BONUS;
        }
        score
    }
}

impl Scorer for SymbolSeedScorer {
    fn score(&self, symbol: &str, regime: &str) -> CompositeScore {
        let weights = self.weights.get(regime).copied().unwrap_or_default();
        weights.split(Self::composite(symbol, regime))
    }
}
