//! Provider clients and the trait they implement.

pub mod alpha_vantage;
mod traits;

pub use alpha_vantage::{AlphaVantageProvider, PROVIDER_ALPHA_VANTAGE};
pub use traits::MarketDataProvider;
