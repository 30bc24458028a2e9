//! Update run orchestration.

mod sync_model;
mod update_service;

pub use sync_model::{FailedSymbol, SymbolOutcome, UpdateOptions, UpdateReport};
pub use update_service::UpdateService;
