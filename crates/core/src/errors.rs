use serde::Serialize;
use thiserror::Error;

use securitydb_market_data::MarketDataError;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Database related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Market data provider errors
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    /// Settings file could not be read
    #[error("Configuration error: {0}")]
    ConfigIO(String),

    /// Settings file parsed but a value is malformed
    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    /// A required settings key is absent
    #[error("Missing configuration key: {0}")]
    MissingConfigKey(String),

    /// Catch-all for invariant breaches that should not happen
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Database-level errors, kept storage-agnostic.
///
/// The storage crate maps its backend's native errors into these variants so
/// callers never see driver types.
#[derive(Debug, Error, Serialize)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Pool creation failed: {0}")]
    PoolCreationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Foreign key constraint violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Database(DatabaseError::UniqueViolation("symbol AAA".to_string()));
        assert_eq!(
            err.to_string(),
            "Database error: Unique constraint violation: symbol AAA"
        );

        let err = Error::MissingConfigKey("databases.daily".to_string());
        assert_eq!(
            err.to_string(),
            "Missing configuration key: databases.daily"
        );
    }
}
