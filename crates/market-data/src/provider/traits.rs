//! Market data provider trait definition.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{FetchMode, ProviderBar, Sampling};

/// Trait for market data providers.
///
/// Implement this trait to add support for a new upstream price source, then
/// register the client with the [`ProviderRegistry`](crate::ProviderRegistry)
/// under the name the symbol universe refers to it by.
#[async_trait]
pub trait MarketDataProvider: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this provider.
    ///
    /// Must match the name used in settings and in the persisted
    /// data-source row (e.g. "AlphaVantage").
    fn id(&self) -> &'static str;

    /// Fetch a time-ordered price history for one symbol.
    ///
    /// `mode` selects the provider's maximum depth (seed) or its compact
    /// recent window (incremental). Rows come back ordered by timestamp
    /// ascending, one row per sample timestamp, with missing numerics as
    /// explicit `None`.
    async fn fetch_history(
        &self,
        symbol: &str,
        mode: FetchMode,
        sampling: Sampling,
    ) -> Result<Vec<ProviderBar>, MarketDataError>;
}
