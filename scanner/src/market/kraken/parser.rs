//! Pure decoders for Kraken public REST payloads.
//!
//! Kept free of I/O so the venue's JSON quirks (string-encoded decimals,
//! results keyed by the venue's pair name, error arrays next to results) can
//! be tested against captured bodies.

use chrono::{DateTime, Utc};

use super::types::{DepthResult, KrakenEnvelope, RawLevel, SystemStatus, TickerResult};
use crate::market::errors::VenueError;
use crate::market::types::{BookLevel, BookSide, OrderBookSnapshot, VenueHealth};

fn open_envelope<T>(envelope: KrakenEnvelope<T>) -> Result<T, VenueError> {
    if !envelope.error.is_empty() {
        return Err(VenueError::Api(envelope.error));
    }
    envelope
        .result
        .ok_or_else(|| VenueError::MalformedData("response has no result".into()))
}

fn parse_decimal(raw: &str, what: &str) -> Result<f64, VenueError> {
    let v: f64 = raw
        .trim()
        .parse()
        .map_err(|e| VenueError::MalformedData(format!("{what} {raw:?}: {e}")))?;

    if !v.is_finite() {
        return Err(VenueError::MalformedData(format!("{what} {raw:?} is not finite")));
    }
    Ok(v)
}

fn parse_side(raw: &[RawLevel], side: BookSide) -> Result<Vec<BookLevel>, VenueError> {
    let mut levels = raw
        .iter()
        .map(|RawLevel(price, size, _)| {
            let price = parse_decimal(price, &format!("{side} price"))?;
            let size = parse_decimal(size, &format!("{side} size"))?;
            if price <= 0.0 || size < 0.0 {
                return Err(VenueError::MalformedData(format!(
                    "{side} level out of range: price={price} size={size}"
                )));
            }
            Ok(BookLevel::new(price, size))
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Best level first on both sides.
    match side {
        BookSide::Bid => levels.sort_by(|a, b| b.price.total_cmp(&a.price)),
        BookSide::Ask => levels.sort_by(|a, b| a.price.total_cmp(&b.price)),
    }
    Ok(levels)
}

/// Decodes a `/0/public/Depth` body into a normalized snapshot.
///
/// Kraken's REST book carries no sequence number, so `sequence` is 0 and the
/// snapshot is stamped with `received_at`.
pub fn parse_depth(
    symbol: &str,
    venue: &str,
    body: &[u8],
    received_at: DateTime<Utc>,
) -> Result<OrderBookSnapshot, VenueError> {
    let envelope: KrakenEnvelope<DepthResult> = serde_json::from_slice(body)?;
    let result = open_envelope(envelope)?;

    let depth = result.into_values().next().ok_or_else(|| {
        VenueError::MalformedData(format!("no order book data found for {symbol}"))
    })?;

    let snapshot = OrderBookSnapshot {
        symbol: symbol.to_string(),
        venue: venue.to_string(),
        timestamp: received_at,
        sequence: 0,
        bids: parse_side(&depth.bids, BookSide::Bid)?,
        asks: parse_side(&depth.asks, BookSide::Ask)?,
    };

    if let Some(side) = snapshot.empty_side() {
        return Err(VenueError::EmptyBook {
            symbol: symbol.to_string(),
            side,
        });
    }

    Ok(snapshot)
}

/// Decodes a `/0/public/Ticker` body into 24h volume in quote currency
/// (base volume over the last 24h times the last trade price).
pub fn parse_volume_24h(body: &[u8]) -> Result<f64, VenueError> {
    let envelope: KrakenEnvelope<TickerResult> = serde_json::from_slice(body)?;
    let result = open_envelope(envelope)?;

    let ticker = result
        .into_values()
        .next()
        .ok_or_else(|| VenueError::MalformedData("no ticker data".into()))?;

    let base_volume = ticker
        .v
        .get(1)
        .ok_or_else(|| VenueError::MalformedData("ticker missing 24h volume".into()))?;
    let last_price = ticker
        .c
        .first()
        .ok_or_else(|| VenueError::MalformedData("ticker missing last price".into()))?;

    Ok(parse_decimal(base_volume, "24h volume")? * parse_decimal(last_price, "last price")?)
}

/// Decodes `/0/public/SystemStatus` into venue health.
pub fn parse_system_status(body: &[u8]) -> Result<VenueHealth, VenueError> {
    let envelope: KrakenEnvelope<SystemStatus> = serde_json::from_slice(body)?;
    let status = open_envelope(envelope)?;

    let health = match status.status.as_str() {
        "online" => VenueHealth::healthy(),
        "cancel_only" | "post_only" => {
            VenueHealth::degraded(format!("venue in {} mode", status.status))
        }
        "maintenance" => VenueHealth::unhealthy("venue under maintenance"),
        other => VenueHealth::degraded(format!("unknown venue status {other:?}")),
    };
    Ok(health)
}
