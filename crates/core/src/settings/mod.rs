//! Settings loading.

mod settings_model;

pub use settings_model::{DatabaseSettings, ProviderSettings, Settings};
