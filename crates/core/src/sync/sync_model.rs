use chrono::NaiveDateTime;
use serde::Serialize;
use std::time::Duration;

use securitydb_market_data::Sampling;

use crate::store::SecurityProfile;

/// Tunables for one update run.
#[derive(Clone, Debug)]
pub struct UpdateOptions {
    /// Hour of day (local) after which today's session counts as complete.
    pub cutoff_hour: u32,
    /// Pause between symbols, to stay under provider rate limits.
    pub delay: Duration,
    /// Fetch attempts per symbol before it is reported as failed.
    pub max_attempts: u32,
    pub sampling: Sampling,
    /// Profile applied to securities created during this run.
    pub default_profile: SecurityProfile,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            cutoff_hour: 17,
            delay: Duration::from_secs(2),
            max_attempts: 3,
            sampling: Sampling::Daily,
            default_profile: SecurityProfile::default(),
        }
    }
}

/// What happened to one symbol during a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SymbolOutcome {
    /// Stored history already reaches the cutoff; no fetch was made.
    UpToDate,
    /// This many new rows were persisted.
    Inserted(usize),
}

/// A symbol that exhausted its fetch attempts.
#[derive(Clone, Debug, Serialize)]
pub struct FailedSymbol {
    pub symbol: String,
    pub error: String,
}

/// Summary of one update run.
#[derive(Clone, Debug, Serialize)]
pub struct UpdateReport {
    pub started_at: NaiveDateTime,
    /// Wall-clock duration in seconds.
    pub duration_secs: f64,
    /// Symbols that completed, whether or not new rows were written.
    pub processed: usize,
    /// Symbols skipped because their history already reached the cutoff.
    pub up_to_date: usize,
    pub rows_inserted: usize,
    /// Stale symbols removed during reconciliation.
    pub removed: Vec<String>,
    /// Symbols that exhausted their attempts.
    pub failed: Vec<FailedSymbol>,
}

impl UpdateReport {
    /// True when every desired symbol completed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
