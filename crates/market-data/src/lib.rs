//! Market data provider layer.
//!
//! This crate contains everything needed to talk to upstream price-data
//! providers: the `MarketDataProvider` trait, concrete provider clients
//! (currently Alpha Vantage), the fetch models they return, and a registry
//! that maps provider names to clients at runtime.
//!
//! It has no database dependencies; persistence lives behind the store
//! trait defined in `securitydb-core`.

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

pub use errors::MarketDataError;
pub use models::{FetchMode, ProviderBar, Sampling};
pub use provider::{AlphaVantageProvider, MarketDataProvider, PROVIDER_ALPHA_VANTAGE};
pub use registry::{ProviderRegistry, ProviderSetting};
