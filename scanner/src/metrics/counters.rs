use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::market::errors::VenueErrorKind;

/// Minimal counters for operational visibility.
#[derive(Clone, Default)]
pub struct Counters {
    pub symbols_attempted: Arc<AtomicU64>,
    pub books_fetched: Arc<AtomicU64>,
    pub candidates: Arc<AtomicU64>,

    // skip reasons
    pub skip_network: Arc<AtomicU64>,
    pub skip_malformed: Arc<AtomicU64>,
    pub skip_empty_book: Arc<AtomicU64>,
}

impl Counters {
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skip(&self, kind: VenueErrorKind) {
        let counter = match kind {
            VenueErrorKind::Network => &self.skip_network,
            VenueErrorKind::MalformedData => &self.skip_malformed,
            VenueErrorKind::EmptyBook => &self.skip_empty_book,
        };
        Self::incr(counter);
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}
