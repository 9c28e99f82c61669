//! Quote-currency liquidity resting near mid.

use super::spread::PriceBand;
use crate::market::types::OrderBookSnapshot;

/// Notional resting on each side of the book inside a price band.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SideDepth {
    pub bid: f64,
    pub ask: f64,
}

impl SideDepth {
    pub fn total(&self) -> f64 {
        self.bid + self.ask
    }

    /// Reported depth: the mean of the two sides, not their sum.
    pub fn average(&self) -> f64 {
        self.total() / 2.0
    }
}

/// Sums `price * size` over bids at or above the band's lower edge and asks
/// at or below its upper edge, for a band of `range_pct` percent around `mid`.
pub fn depth_within_range(book: &OrderBookSnapshot, mid: f64, range_pct: f64) -> SideDepth {
    let band = PriceBand::around(mid, range_pct);

    let bid = book
        .bids
        .iter()
        .filter(|l| l.price >= band.lower)
        .map(|l| l.notional())
        .sum();

    let ask = book
        .asks
        .iter()
        .filter(|l| l.price <= band.upper)
        .map(|l| l.notional())
        .sum();

    SideDepth { bid, ask }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::market::types::BookLevel;
    use chrono::Utc;
    use proptest::prelude::*;

    pub(crate) fn book(bids: &[(f64, f64)], asks: &[(f64, f64)]) -> OrderBookSnapshot {
        OrderBookSnapshot {
            symbol: "TEST".into(),
            venue: "test".into(),
            timestamp: Utc::now(),
            sequence: 0,
            bids: bids.iter().map(|&(p, s)| BookLevel::new(p, s)).collect(),
            asks: asks.iter().map(|&(p, s)| BookLevel::new(p, s)).collect(),
        }
    }

    /// Uncrossed book with 1..30 levels per side, best level first.
    pub(crate) fn arb_book() -> impl Strategy<Value = OrderBookSnapshot> {
        (
            1.0f64..100_000.0,
            0.0f64..0.01,
            prop::collection::vec((0.0001f64..0.01, 0.0f64..1_000.0), 1..30),
            prop::collection::vec((0.0001f64..0.01, 0.0f64..1_000.0), 1..30),
        )
            .prop_map(|(base, half_gap, bid_steps, ask_steps)| {
                let mut price = base * (1.0 - half_gap);
                let bids: Vec<_> = bid_steps
                    .iter()
                    .map(|&(step, size)| {
                        let level = (price, size);
                        price *= 1.0 - step;
                        level
                    })
                    .collect();

                let mut price = base * (1.0 + half_gap);
                let asks: Vec<_> = ask_steps
                    .iter()
                    .map(|&(step, size)| {
                        let level = (price, size);
                        price *= 1.0 + step;
                        level
                    })
                    .collect();

                book(&bids, &asks)
            })
    }

    #[test]
    fn reference_book_depth_at_two_percent() {
        let b = book(&[(100.0, 2.0), (99.0, 5.0)], &[(101.0, 1.0), (102.0, 3.0)]);
        let d = depth_within_range(&b, 100.5, 2.0);

        assert_eq!(d.bid, 695.0);
        assert_eq!(d.ask, 407.0);
        assert_eq!(d.average(), 551.0);
        assert_eq!(d.total(), 1_102.0);
    }

    #[test]
    fn levels_outside_band_are_excluded() {
        let b = book(&[(100.0, 1.0), (90.0, 100.0)], &[(101.0, 1.0), (120.0, 100.0)]);
        let d = depth_within_range(&b, 100.5, 1.0);

        assert_eq!(d.bid, 100.0);
        assert_eq!(d.ask, 101.0);
    }

    proptest! {
        #[test]
        fn depth_is_monotone_in_range(
            b in arb_book(),
            r1 in 0.0f64..20.0,
            extra in 0.0f64..20.0,
        ) {
            let mid = (b.bids[0].price + b.asks[0].price) / 2.0;
            let narrow = depth_within_range(&b, mid, r1);
            let wide = depth_within_range(&b, mid, r1 + extra);

            prop_assert!(narrow.average() <= wide.average());
            prop_assert!(narrow.bid <= wide.bid);
            prop_assert!(narrow.ask <= wide.ask);
        }
    }
}
