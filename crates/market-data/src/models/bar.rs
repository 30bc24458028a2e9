use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One price observation as returned by a provider.
///
/// All numeric fields are optional: a value the provider omitted, reported
/// as not-a-number, or that failed to parse is carried as `None` rather than
/// being dropped or coerced to zero. The storage layer maps `None` to SQL
/// NULL.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderBar {
    /// Sample timestamp. Midnight for daily series.
    pub timestamp: NaiveDateTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    /// Not provided for intraday series.
    pub adjusted_close: Option<f64>,
    pub volume: Option<f64>,
    /// Not provided for intraday series.
    pub dividend_amount: Option<f64>,
    /// Not provided for intraday series.
    pub split_coefficient: Option<f64>,
}

/// Parse a numeric string from a provider payload.
///
/// Returns `None` for anything that is not a finite number, including the
/// literal "NaN"/"inf" spellings `f64` would otherwise accept.
pub fn parse_price(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
