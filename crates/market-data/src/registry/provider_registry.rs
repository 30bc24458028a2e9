use log::warn;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::MarketDataError;
use crate::provider::{AlphaVantageProvider, MarketDataProvider, PROVIDER_ALPHA_VANTAGE};

/// Configuration for one provider, as read from settings.
#[derive(Clone, Debug)]
pub struct ProviderSetting {
    /// Registry name, e.g. "AlphaVantage".
    pub name: String,
    pub api_key: String,
    /// Base URL persisted with the data-source row.
    pub url: String,
}

/// Lookup table of configured provider clients, keyed by provider name.
///
/// Symbol universes refer to providers by name; dispatch goes through this
/// registry so adding a provider means registering it here rather than
/// branching on strings at each call site.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn MarketDataProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from provider settings.
    ///
    /// Settings naming a provider this build does not implement are skipped
    /// with a warning; lookups for them fail at use time.
    pub fn from_settings(settings: &[ProviderSetting]) -> Self {
        let mut registry = Self::new();
        for setting in settings {
            match setting.name.as_str() {
                PROVIDER_ALPHA_VANTAGE => {
                    registry.register(Arc::new(AlphaVantageProvider::new(
                        setting.api_key.clone(),
                    )));
                }
                other => {
                    warn!("Skipping unsupported provider in settings: {}", other);
                }
            }
        }
        registry
    }

    /// Register a provider under its own id.
    pub fn register(&mut self, provider: Arc<dyn MarketDataProvider>) {
        self.providers.insert(provider.id().to_string(), provider);
    }

    /// Look up a provider by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn MarketDataProvider>, MarketDataError> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| MarketDataError::UnknownProvider(name.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
