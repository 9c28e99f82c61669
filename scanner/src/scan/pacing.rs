//! Client-side pacing between venue calls.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

/// Decides how long the scan loop waits before its next venue call.
#[async_trait]
pub trait Pacer: Send {
    async fn wait(&mut self);
}

/// No waiting at all.
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn wait(&mut self) {}
}

/// Fixed sleep between consecutive calls; the first call is not delayed.
/// No burst allowance and no back-off.
pub struct FixedDelay {
    delay: Duration,
    primed: bool,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            primed: false,
        }
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn wait(&mut self) {
        if self.primed {
            tokio::time::sleep(self.delay).await;
        }
        self.primed = true;
    }
}

/// Token bucket: up to `capacity` calls back to back, refilling one token
/// every `refill_every`.
pub struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_every: Duration,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(capacity: u32, refill_every: Duration) -> Self {
        let capacity = f64::from(capacity.max(1));
        Self {
            capacity,
            tokens: capacity,
            refill_every,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        if self.refill_every.is_zero() {
            self.tokens = self.capacity;
        } else {
            let earned = now.duration_since(self.last_refill).as_secs_f64()
                / self.refill_every.as_secs_f64();
            self.tokens = (self.tokens + earned).min(self.capacity);
        }
        self.last_refill = now;
    }
}

#[async_trait]
impl Pacer for TokenBucket {
    async fn wait(&mut self) {
        self.refill();
        if self.tokens < 1.0 {
            let missing = 1.0 - self.tokens;
            tokio::time::sleep(self.refill_every.mul_f64(missing)).await;
            self.refill();
        }
        self.tokens = (self.tokens - 1.0).max(0.0);
    }
}

/// Pacing policy selected by configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum PacingPolicy {
    None,
    Fixed(Duration),
    TokenBucket { capacity: u32, refill_every: Duration },
}

impl PacingPolicy {
    pub fn build(&self) -> Box<dyn Pacer> {
        match self {
            PacingPolicy::None => Box::new(NoPacing),
            PacingPolicy::Fixed(d) => Box::new(FixedDelay::new(*d)),
            PacingPolicy::TokenBucket {
                capacity,
                refill_every,
            } => Box::new(TokenBucket::new(*capacity, *refill_every)),
        }
    }
}
