//! Read-side summaries over stored price history.
//!
//! These queries answer the questions an operator asks of the store after
//! updates have run: which symbols trade above or below their recent
//! average, and what each symbol's price extremes were over a window.
//! They never mutate anything.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::errors::Result;

/// Which side of its recent average a security's latest close is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AverageRelation {
    Above,
    Below,
}

/// A security whose latest close sits on the requested side of its
/// average close over the comparison window.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RelativeAverageRow {
    pub symbol: String,
    pub latest_close: f64,
    pub average_close: f64,
}

/// Per-security traded price range over a window, from the high and low
/// columns.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RangeSummaryRow {
    pub symbol: String,
    pub highest: f64,
    pub lowest: f64,
}

/// Per-security highest and lowest close over a window.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CloseExtremesRow {
    pub symbol: String,
    pub highest_close: f64,
    pub lowest_close: f64,
}

/// Reporting queries over stored price history.
///
/// Split from [`PriceStore`](crate::store::PriceStore) so the update engine
/// never depends on the read-side surface; the storage backend implements
/// both. Securities with no usable rows in the window are omitted rather
/// than reported with nulls.
pub trait ReportingStore: Send + Sync {
    /// Securities whose latest close is above (or below) their average
    /// close since `window_start`.
    fn closes_relative_to_average(
        &self,
        window_start: NaiveDateTime,
        relation: AverageRelation,
    ) -> Result<Vec<RelativeAverageRow>>;

    /// Highest high and lowest low per security between `start` and `end`
    /// inclusive, ordered by symbol.
    fn range_summary(&self, start: NaiveDateTime, end: NaiveDateTime)
        -> Result<Vec<RangeSummaryRow>>;

    /// Highest and lowest close per security between `start` and `end`
    /// inclusive, ordered by symbol.
    fn close_extremes(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CloseExtremesRow>>;
}
