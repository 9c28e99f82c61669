//! Scoring boundary.
//!
//! The composite scoring model lives outside this crate. The scan loop only
//! consumes its numeric output through [`Scorer`], and the regime label
//! through [`RegimeProvider`].

mod seed;

pub use seed::SymbolSeedScorer;

use serde::{Deserialize, Serialize};

pub const TRENDING_BULL: &str = "trending_bull";

/// Composite score and its five named components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub composite: f64,
    pub momentum: f64,
    pub technical: f64,
    pub volume: f64,
    pub quality: f64,
    pub social: f64,
}

pub trait Scorer: Send + Sync {
    fn score(&self, symbol: &str, regime: &str) -> CompositeScore;
}

pub trait RegimeProvider: Send + Sync {
    /// Active regime label, e.g. `trending_bull`.
    fn current_regime(&self) -> String;
}

/// Regime fixed at construction.
#[derive(Clone, Debug)]
pub struct StaticRegime(String);

impl StaticRegime {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }
}

impl RegimeProvider for StaticRegime {
    fn current_regime(&self) -> String {
        self.0.clone()
    }
}

/// Component weights for one regime; they sum to 1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegimeWeights {
    pub momentum: f64,
    pub technical: f64,
    pub volume: f64,
    pub quality: f64,
    pub social: f64,
}

impl RegimeWeights {
    pub const TRENDING_BULL: RegimeWeights = RegimeWeights {
        momentum: 0.40,
        technical: 0.25,
        volume: 0.20,
        quality: 0.10,
        social: 0.05,
    };

    /// Splits `composite` into weighted components.
    pub fn split(&self, composite: f64) -> CompositeScore {
        CompositeScore {
            composite,
            momentum: composite * self.momentum,
            technical: composite * self.technical,
            volume: composite * self.volume,
            quality: composite * self.quality,
            social: composite * self.social,
        }
    }
}

impl Default for RegimeWeights {
    fn default() -> Self {
        Self::TRENDING_BULL
    }
}
