//! Fetch models shared by all providers.

mod bar;

pub use bar::{parse_price, ProviderBar};

use serde::{Deserialize, Serialize};

/// How much history to request from a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchMode {
    /// Maximum available history. Used when a symbol has no stored data yet.
    Seed,
    /// Recent window only. Used when a symbol already has stored data.
    Incremental,
}

/// Sampling frequency of the requested series.
///
/// Intraday series do not carry adjusted-close, dividend, or split data at
/// the source; those fields come back as explicit `None` so every row has
/// the same shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sampling {
    Daily,
    Intraday,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_filters_non_finite() {
        assert_eq!(parse_price("1.25"), Some(1.25));
        assert_eq!(parse_price("0"), Some(0.0));
        assert_eq!(parse_price("NaN"), None);
        assert_eq!(parse_price("inf"), None);
        assert_eq!(parse_price("-"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("None"), None);
    }
}
