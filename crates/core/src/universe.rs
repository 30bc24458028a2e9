//! Built-in symbol universes.
//!
//! A universe maps each symbol to the name of the provider that feeds it.
//! The update service reconciles the store against exactly this set:
//! symbols present here are kept current, persisted symbols absent from
//! here are removed.

use std::collections::BTreeMap;

use securitydb_market_data::PROVIDER_ALPHA_VANTAGE;

const ETF_SYMBOLS: &[&str] = &[
    "QQQ", "SPY", "IWM", "IVW", "IWB", "HYG", "JNK", "TBX", "AGG", "BND", "VNQ", "USO", "UUP",
];

/// Broad-market and sector ETF universe.
pub fn etf_universe() -> BTreeMap<String, String> {
    ETF_SYMBOLS
        .iter()
        .map(|s| (s.to_string(), PROVIDER_ALPHA_VANTAGE.to_string()))
        .collect()
}

/// Look up a built-in universe by name.
pub fn universe_by_name(name: &str) -> Option<BTreeMap<String, String>> {
    match name {
        "etfs" => Some(etf_universe()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etf_universe_contents() {
        let universe = etf_universe();
        assert_eq!(universe.len(), 13);
        assert_eq!(universe.get("SPY").map(String::as_str), Some("AlphaVantage"));
        assert_eq!(universe.get("UUP").map(String::as_str), Some("AlphaVantage"));
    }

    #[test]
    fn test_universe_by_name() {
        assert!(universe_by_name("etfs").is_some());
        assert!(universe_by_name("bonds").is_none());
    }
}
