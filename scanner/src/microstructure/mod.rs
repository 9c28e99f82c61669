//! Microstructure metrics derived from a single order-book snapshot.
//!
//! Everything here is a pure function of its inputs; there is no rolling
//! state, so repeated evaluation of the same snapshot yields the same metrics.

pub mod depth;
pub mod spread;
pub mod vadr;

use serde::Serialize;

use crate::market::errors::VenueError;
use crate::market::types::{BookSide, OrderBookSnapshot};
use depth::depth_within_range;
use spread::{PriceBand, mid_price, spread_bps};
use vadr::estimate_vadr_from_book;

/// Default half-width, in percent of mid, of the band used for `depth_usd`.
pub const DEFAULT_DEPTH_RANGE_PCT: f64 = 2.0;

/// Metrics consumed by the gates and copied into scan results.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MicrostructureMetrics {
    pub mid: f64,
    pub spread_bps: f64,
    pub band: PriceBand,
    pub bid_depth: f64,
    pub ask_depth: f64,
    /// Mean of `bid_depth` and `ask_depth`.
    pub depth_usd: f64,
    pub vadr: f64,
}

/// Computes mid, spread, depth within `range_pct` and the live-scan VADR proxy.
///
/// Fails with `EmptyBook` when a side has no levels and with `MalformedData`
/// when the book is crossed (best ask below best bid).
pub fn compute_metrics(
    book: &OrderBookSnapshot,
    range_pct: f64,
) -> Result<MicrostructureMetrics, VenueError> {
    let (Some(best_bid), Some(best_ask)) = (book.best_bid(), book.best_ask()) else {
        return Err(VenueError::EmptyBook {
            symbol: book.symbol.clone(),
            side: book.empty_side().unwrap_or(BookSide::Bid),
        });
    };

    if best_ask.price < best_bid.price {
        return Err(VenueError::MalformedData(format!(
            "crossed book for {}: bid {} > ask {}",
            book.symbol, best_bid.price, best_ask.price
        )));
    }

    let mid = mid_price(best_bid.price, best_ask.price);
    let depth = depth_within_range(book, mid, range_pct);

    Ok(MicrostructureMetrics {
        mid,
        spread_bps: spread_bps(best_bid.price, best_ask.price),
        band: PriceBand::around(mid, range_pct),
        bid_depth: depth.bid,
        ask_depth: depth.ask,
        depth_usd: depth.average(),
        vadr: estimate_vadr_from_book(book, mid),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::errors::VenueErrorKind;
    use crate::microstructure::depth::tests::{arb_book, book};
    use proptest::prelude::*;

    #[test]
    fn reference_book_metrics() {
        let b = book(&[(100.0, 2.0), (99.0, 5.0)], &[(101.0, 1.0), (102.0, 3.0)]);
        let m = compute_metrics(&b, DEFAULT_DEPTH_RANGE_PCT).unwrap();

        assert_eq!(m.mid, 100.5);
        assert!((m.spread_bps - 99.5).abs() < 0.01);
        assert!((m.band.lower - 98.49).abs() < 1e-9);
        assert!((m.band.upper - 102.51).abs() < 1e-9);
        assert_eq!(m.bid_depth, 695.0);
        assert_eq!(m.ask_depth, 407.0);
        assert_eq!(m.depth_usd, 551.0);
        // Two levels per side is a thin book.
        assert_eq!(m.vadr, vadr::THIN_BOOK_VADR);
    }

    #[test]
    fn empty_side_is_rejected() {
        let b = book(&[(100.0, 1.0)], &[]);
        let err = compute_metrics(&b, 2.0).unwrap_err();
        assert_eq!(err.kind(), VenueErrorKind::EmptyBook);
    }

    #[test]
    fn crossed_book_is_rejected() {
        let b = book(&[(101.0, 1.0)], &[(100.0, 1.0)]);
        let err = compute_metrics(&b, 2.0).unwrap_err();
        assert_eq!(err.kind(), VenueErrorKind::MalformedData);
    }

    proptest! {
        #[test]
        fn metrics_are_deterministic(b in arb_book(), r in 0.0f64..10.0) {
            prop_assert_eq!(compute_metrics(&b, r).unwrap(), compute_metrics(&b, r).unwrap());
        }

        #[test]
        fn metrics_respect_band_invariants(b in arb_book(), r in 0.0f64..10.0) {
            let m = compute_metrics(&b, r).unwrap();
            prop_assert!(m.band.lower <= m.mid && m.mid <= m.band.upper);
            prop_assert!(m.spread_bps >= 0.0);
            prop_assert!(m.depth_usd >= 0.0);
        }
    }
}
