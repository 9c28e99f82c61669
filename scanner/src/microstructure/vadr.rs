//! Depth-based VADR (volume-adjusted depth ratio) proxies.
//!
//! Neither estimator is a statistical VADR; both classify resting depth into
//! fixed tiers for use when historical trade volume is unavailable. They are
//! calibrated for different callers and intentionally not unified:
//!
//! - [`estimate_vadr_from_book`] is the live-scan path. It takes the whole
//!   snapshot, penalises thin books and measures depth within ±1% of mid.
//! - [`estimate_vadr_from_total_depth`] is the standalone gate-check path. It
//!   takes an already summed depth figure and uses a finer ladder.

use super::depth::depth_within_range;
use crate::market::types::OrderBookSnapshot;

/// Books with fewer levels than this on either side get [`THIN_BOOK_VADR`].
pub const THIN_BOOK_MIN_LEVELS: usize = 5;
pub const THIN_BOOK_VADR: f64 = 0.5;

/// Band used by the live-scan estimator, independent of the scan's depth range.
pub const BOOK_VADR_RANGE_PCT: f64 = 1.0;

/// Live-scan estimator. Tiers on bid + ask depth within ±1%:
/// `> $500k → 2.5`, `> $100k → 1.8`, otherwise `1.0`.
pub fn estimate_vadr_from_book(book: &OrderBookSnapshot, mid: f64) -> f64 {
    if book.bids.len() < THIN_BOOK_MIN_LEVELS || book.asks.len() < THIN_BOOK_MIN_LEVELS {
        return THIN_BOOK_VADR;
    }

    let total = depth_within_range(book, mid, BOOK_VADR_RANGE_PCT).total();
    book_depth_tier(total)
}

fn book_depth_tier(total_depth: f64) -> f64 {
    if total_depth > 500_000.0 {
        2.5
    } else if total_depth > 100_000.0 {
        1.8
    } else {
        1.0
    }
}

/// Gate-check estimator over a pre-summed depth:
/// `> $1M → 3.0`, `> $500k → 2.5`, `> $200k → 2.0`, `> $100k → 1.8`,
/// otherwise `1.2`.
pub fn estimate_vadr_from_total_depth(total_depth: f64) -> f64 {
    match total_depth {
        d if d > 1_000_000.0 => 3.0,
        d if d > 500_000.0 => 2.5,
        d if d > 200_000.0 => 2.0,
        d if d > 100_000.0 => 1.8,
        _ => 1.2,
    }
}
