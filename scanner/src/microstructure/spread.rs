//! Top-of-book price metrics.

use serde::Serialize;

/// Arithmetic mean of best bid and best ask.
pub fn mid_price(best_bid: f64, best_ask: f64) -> f64 {
    (best_bid + best_ask) / 2.0
}

/// Quoted spread relative to mid, in basis points.
///
/// Non-negative whenever `best_ask >= best_bid`.
pub fn spread_bps(best_bid: f64, best_ask: f64) -> f64 {
    let mid = mid_price(best_bid, best_ask);
    (best_ask - best_bid) / mid * 10_000.0
}

/// Price band of `range_pct` percent around `mid`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PriceBand {
    pub lower: f64,
    pub upper: f64,
}

impl PriceBand {
    pub fn around(mid: f64, range_pct: f64) -> Self {
        Self {
            lower: mid * (1.0 - range_pct / 100.0),
            upper: mid * (1.0 + range_pct / 100.0),
        }
    }
}
