//! Error types for the market data crate.

use thiserror::Error;

/// Errors that can occur while fetching data from an upstream provider.
///
/// During one symbol's processing the update scheduler treats all of these
/// as transient and requeues the symbol; only [`MarketDataError::UnknownProvider`]
/// is structural, because it means the run's configuration is wrong and every
/// pass over the symbol would fail the same way.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested symbol was not found by the provider.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider rate limited the request.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider returned a payload we could not interpret.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// No provider is registered under this name.
    ///
    /// Raised at lookup time by the registry; configuration problem,
    /// not a network hiccup.
    #[error("No provider registered under name: {0}")]
    UnknownProvider(String),

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = MarketDataError::SymbolNotFound("INVALID".to_string());
        assert_eq!(format!("{}", error), "Symbol not found: INVALID");

        let error = MarketDataError::RateLimited {
            provider: "AlphaVantage".to_string(),
        };
        assert_eq!(format!("{}", error), "Rate limited: AlphaVantage");

        let error = MarketDataError::ProviderError {
            provider: "AlphaVantage".to_string(),
            message: "API key invalid".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Provider error: AlphaVantage - API key invalid"
        );
    }
}
