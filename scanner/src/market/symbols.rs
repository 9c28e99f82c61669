//! Universal ⇄ Kraken symbol spelling.

/// Static universal → Kraken pair names. Anything not listed is passed
/// through unchanged.
const KRAKEN_SYMBOLS: &[(&str, &str)] = &[
    ("BTCUSD", "XXBTZUSD"),
    ("ETHUSD", "XETHZUSD"),
    ("LTCUSD", "XLTCZUSD"),
    ("XRPUSD", "XXRPZUSD"),
    ("BTCUSDT", "XBTUSDT"),
    ("ETHUSDT", "ETHUSDT"),
];

/// Uppercases and strips the common separators (`BTC/USD`, `btc-usd`).
pub fn canonical(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| *c != '/' && *c != '-')
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Maps a universal symbol to Kraken's spelling.
pub fn to_kraken(symbol: &str) -> String {
    let canonical = canonical(symbol);
    KRAKEN_SYMBOLS
        .iter()
        .find(|(universal, _)| *universal == canonical)
        .map(|(_, venue)| (*venue).to_string())
        .unwrap_or(canonical)
}
