//! The update service: reconciles the persisted symbol set against a
//! desired universe and brings every remaining symbol's history up to the
//! update cutoff.

use chrono::{Local, NaiveDateTime};
use log::{debug, info, warn};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use securitydb_market_data::{FetchMode, MarketDataProvider, ProviderBar, ProviderRegistry};

use crate::errors::{Error, Result};
use crate::store::{ObservationRow, PriceStore, SecurityProfile};
use crate::sync::sync_model::{FailedSymbol, SymbolOutcome, UpdateOptions, UpdateReport};
use crate::utils::time_utils::update_cutoff;

struct QueuedSymbol {
    symbol: String,
    provider: String,
    attempts: u32,
}

/// Drives one full update run against a store and a set of providers.
pub struct UpdateService {
    store: Arc<dyn PriceStore>,
    registry: Arc<ProviderRegistry>,
    /// Provider name to base URL, persisted with new data-source rows.
    source_urls: BTreeMap<String, String>,
}

impl UpdateService {
    pub fn new(
        store: Arc<dyn PriceStore>,
        registry: Arc<ProviderRegistry>,
        source_urls: BTreeMap<String, String>,
    ) -> Self {
        Self {
            store,
            registry,
            source_urls,
        }
    }

    /// Run a full update for the desired universe.
    ///
    /// First removes persisted symbols absent from the universe, then walks
    /// the universe with a retry queue: a symbol whose fetch fails goes to
    /// the back of the queue so other symbols progress while a transient
    /// upstream condition clears. A symbol is dropped into the failure list
    /// after `max_attempts` attempts. Structural failures, a failed stale
    /// delete or an unknown provider name, abort the run.
    pub async fn run(
        &self,
        desired: &BTreeMap<String, String>,
        options: &UpdateOptions,
    ) -> Result<UpdateReport> {
        let started_at = Local::now().naive_local();
        let clock = Instant::now();

        let removed = self.reconcile_removed(desired).await?;

        let cutoff = update_cutoff(started_at, options.cutoff_hour);
        info!(
            "Updating {} symbols through {}",
            desired.len(),
            cutoff
        );

        let mut queue: VecDeque<QueuedSymbol> = desired
            .iter()
            .map(|(symbol, provider)| QueuedSymbol {
                symbol: symbol.clone(),
                provider: provider.clone(),
                attempts: 0,
            })
            .collect();

        let mut processed = 0usize;
        let mut up_to_date = 0usize;
        let mut rows_inserted = 0usize;
        let mut failed: Vec<FailedSymbol> = Vec::new();

        while let Some(mut item) = queue.pop_front() {
            let provider = self.registry.get(&item.provider)?;

            // The inter-symbol pause exists to pace provider requests, so
            // an up-to-date symbol that fetched nothing does not pay it.
            let mut made_request = true;

            match self
                .sync_symbol(&item.symbol, provider.as_ref(), cutoff, options)
                .await
            {
                Ok(outcome) => {
                    processed += 1;
                    match outcome {
                        SymbolOutcome::UpToDate => {
                            debug!("{}: already up to date", item.symbol);
                            up_to_date += 1;
                            made_request = false;
                        }
                        SymbolOutcome::Inserted(count) => {
                            info!("{}: inserted {} rows", item.symbol, count);
                            rows_inserted += count;
                        }
                    }
                }
                // Provider and storage-write failures while processing one
                // symbol are transient; the rest of the queue keeps moving.
                Err(err @ (Error::MarketData(_) | Error::Database(_))) => {
                    item.attempts += 1;
                    if item.attempts >= options.max_attempts {
                        warn!(
                            "{}: giving up after {} attempts: {}",
                            item.symbol, item.attempts, err
                        );
                        failed.push(FailedSymbol {
                            symbol: item.symbol,
                            error: err.to_string(),
                        });
                    } else {
                        warn!(
                            "{}: attempt {} failed, requeueing: {}",
                            item.symbol, item.attempts, err
                        );
                        queue.push_back(item);
                    }
                }
                Err(other) => return Err(other),
            }

            if made_request && !queue.is_empty() && !options.delay.is_zero() {
                tokio::time::sleep(options.delay).await;
            }
        }

        let duration_secs = clock.elapsed().as_secs_f64();
        info!(
            "Update run finished in {:.2} minutes: {} processed, {} up to date, {} rows, {} removed, {} failed",
            duration_secs / 60.0,
            processed,
            up_to_date,
            rows_inserted,
            removed.len(),
            failed.len()
        );

        Ok(UpdateReport {
            started_at,
            duration_secs,
            processed,
            up_to_date,
            rows_inserted,
            removed,
            failed,
        })
    }

    /// Delete persisted symbols that are absent from the desired universe.
    ///
    /// Errors here are fatal: continuing a run after a failed delete would
    /// keep feeding history to a symbol the universe no longer wants.
    async fn reconcile_removed(&self, desired: &BTreeMap<String, String>) -> Result<Vec<String>> {
        let persisted = self.store.list_symbols()?;
        let mut removed = Vec::new();

        for symbol in persisted.keys() {
            if !desired.contains_key(symbol) {
                info!("Removing stale symbol {}", symbol);
                self.store.delete_security_cascade(symbol).await?;
                removed.push(symbol.clone());
            }
        }

        Ok(removed)
    }

    /// Bring one symbol's history up to the cutoff.
    async fn sync_symbol(
        &self,
        symbol: &str,
        provider: &dyn MarketDataProvider,
        cutoff: NaiveDateTime,
        options: &UpdateOptions,
    ) -> Result<SymbolOutcome> {
        let data_source_id = self.ensure_data_source(provider.id()).await?;
        self.ensure_security(symbol, &options.default_profile, data_source_id)
            .await?;

        let last = self.store.last_observed_timestamp(symbol)?;

        if let Some(last) = last {
            if last.date() == cutoff.date() {
                return Ok(SymbolOutcome::UpToDate);
            }
        }

        let mode = match last {
            None => FetchMode::Seed,
            Some(_) => FetchMode::Incremental,
        };

        let bars = provider
            .fetch_history(symbol, mode, options.sampling)
            .await
            .map_err(Error::MarketData)?;

        let rows: Vec<ObservationRow> = bars
            .into_iter()
            .filter(|bar| {
                bar.timestamp <= cutoff && last.map_or(true, |l| bar.timestamp > l)
            })
            .map(|bar| Self::to_row(bar, data_source_id))
            .collect();

        if rows.is_empty() {
            return Ok(SymbolOutcome::Inserted(0));
        }

        let inserted = self.store.bulk_insert_observations(symbol, &rows).await?;
        Ok(SymbolOutcome::Inserted(inserted))
    }

    /// Resolve a data source id, creating the row when absent.
    ///
    /// Creation tolerates a concurrent duplicate, so the id is always
    /// re-resolved by lookup afterwards. The persisted URL comes from
    /// settings; a provider with no configured URL is a configuration
    /// error, not something to paper over with an empty row.
    async fn ensure_data_source(&self, provider_name: &str) -> Result<i32> {
        if let Some(id) = self.store.lookup_data_source_id(provider_name)? {
            return Ok(id);
        }

        let url = self.source_urls.get(provider_name).ok_or_else(|| {
            Error::MissingConfigKey(format!("providers.{}.url", provider_name))
        })?;
        self.store.create_data_source(provider_name, url).await?;

        self.store
            .lookup_data_source_id(provider_name)?
            .ok_or_else(|| {
                Error::Unexpected(format!(
                    "Data source {} missing after create",
                    provider_name
                ))
            })
    }

    /// Make sure a security row exists for the symbol.
    async fn ensure_security(
        &self,
        symbol: &str,
        profile: &SecurityProfile,
        data_source_id: i32,
    ) -> Result<()> {
        if self.store.lookup_security_id(symbol)?.is_some() {
            return Ok(());
        }

        self.store
            .create_security(symbol, profile, data_source_id)
            .await?;

        if self.store.lookup_security_id(symbol)?.is_none() {
            return Err(Error::Unexpected(format!(
                "Security {} missing after create",
                symbol
            )));
        }
        Ok(())
    }

    fn to_row(bar: ProviderBar, data_source_id: i32) -> ObservationRow {
        ObservationRow {
            sample_time: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            adjusted_close: bar.adjusted_close,
            volume: bar.volume,
            dividend_amount: bar.dividend_amount,
            split_coefficient: bar.split_coefficient,
            data_source_id,
        }
    }
}
