//! Persistence trait the storage backend implements.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use crate::errors::Result;

/// Descriptive attributes persisted with a security row.
#[derive(Clone, Debug)]
pub struct SecurityProfile {
    pub security_type: String,
    pub timezone: String,
    pub contract_size: f64,
    pub currency: String,
}

impl Default for SecurityProfile {
    fn default() -> Self {
        Self {
            security_type: "EQUITY".to_string(),
            timezone: "EST".to_string(),
            contract_size: 1.0,
            currency: "USD".to_string(),
        }
    }
}

/// One price observation ready for persistence.
#[derive(Clone, Debug)]
pub struct ObservationRow {
    pub sample_time: NaiveDateTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adjusted_close: Option<f64>,
    pub volume: Option<f64>,
    pub dividend_amount: Option<f64>,
    pub split_coefficient: Option<f64>,
    /// Data source the observation came from.
    pub data_source_id: i32,
}

/// Store of securities, data sources, and their price observations.
///
/// Reads are synchronous; mutations are async. Create operations are
/// tolerant of concurrent duplicates: a unique violation from a row another
/// writer inserted first is not an error, callers re-resolve by lookup.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Resolve a data source name to its row id.
    fn lookup_data_source_id(&self, name: &str) -> Result<Option<i32>>;

    /// Resolve a symbol to its security row id.
    fn lookup_security_id(&self, symbol: &str) -> Result<Option<i32>>;

    /// Latest stored sample time for a symbol, or `None` when the symbol has
    /// no observations yet.
    fn last_observed_timestamp(&self, symbol: &str) -> Result<Option<NaiveDateTime>>;

    /// All persisted symbols with the name of the data source that feeds
    /// them, ordered by symbol.
    fn list_symbols(&self) -> Result<BTreeMap<String, String>>;

    /// Create a data source row. Succeeds silently when a row with this name
    /// already exists.
    async fn create_data_source(&self, name: &str, url: &str) -> Result<()>;

    /// Create a security row. Succeeds silently when a row with this symbol
    /// already exists.
    async fn create_security(
        &self,
        symbol: &str,
        profile: &SecurityProfile,
        data_source_id: i32,
    ) -> Result<()>;

    /// Insert observations for a symbol, skipping rows whose
    /// (security, sample time) pair is already stored. Returns the number of
    /// rows actually inserted.
    async fn bulk_insert_observations(
        &self,
        symbol: &str,
        rows: &[ObservationRow],
    ) -> Result<usize>;

    /// Delete a security and, via cascade, all of its observations. Returns
    /// whether a row was deleted.
    async fn delete_security_cascade(&self, symbol: &str) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = SecurityProfile::default();
        assert_eq!(profile.security_type, "EQUITY");
        assert_eq!(profile.timezone, "EST");
        assert_eq!(profile.contract_size, 1.0);
        assert_eq!(profile.currency, "USD");
    }
}
