use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;

use securitydb_core::errors::{DatabaseError, Error, Result};
use securitydb_core::reports::{
    AverageRelation, CloseExtremesRow, RangeSummaryRow, RelativeAverageRow, ReportingStore,
};
use securitydb_core::store::{ObservationRow, PriceStore, SecurityProfile};

use super::model::{NewDataSourceDB, NewPriceObservationDB, NewSecurityDB};
use crate::db::{get_connection, DbPool};
use crate::errors::IntoCore;
use crate::schema::data_sources::dsl as data_sources_dsl;
use crate::schema::price_observations::dsl as price_observations_dsl;
use crate::schema::securities::dsl as securities_dsl;

/// SQLite-backed implementation of the price store.
pub struct SqlitePriceStore {
    pool: Arc<DbPool>,
}

impl SqlitePriceStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Treat a unique violation as success. Create operations race against
    /// other writers; the table's unique constraint arbitrates and the
    /// loser re-resolves by lookup.
    fn tolerate_duplicate(result: std::result::Result<usize, DieselError>) -> Result<()> {
        match result {
            Ok(_) => Ok(()),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => Ok(()),
            Err(e) => Err(e).into_core(),
        }
    }

    fn security_id(conn: &mut SqliteConnection, symbol: &str) -> Result<Option<i32>> {
        securities_dsl::securities
            .filter(securities_dsl::symbol.eq(symbol))
            .select(securities_dsl::id)
            .first::<i32>(conn)
            .optional()
            .into_core()
    }
}

#[async_trait]
impl PriceStore for SqlitePriceStore {
    fn lookup_data_source_id(&self, name: &str) -> Result<Option<i32>> {
        let mut conn = get_connection(&self.pool)?;
        data_sources_dsl::data_sources
            .filter(data_sources_dsl::name.eq(name))
            .select(data_sources_dsl::id)
            .first::<i32>(&mut conn)
            .optional()
            .into_core()
    }

    fn lookup_security_id(&self, symbol: &str) -> Result<Option<i32>> {
        let mut conn = get_connection(&self.pool)?;
        Self::security_id(&mut conn, symbol)
    }

    fn last_observed_timestamp(&self, symbol: &str) -> Result<Option<NaiveDateTime>> {
        let mut conn = get_connection(&self.pool)?;

        let Some(security_id) = Self::security_id(&mut conn, symbol)? else {
            return Ok(None);
        };

        price_observations_dsl::price_observations
            .filter(price_observations_dsl::security_id.eq(security_id))
            .select(diesel::dsl::max(price_observations_dsl::sample_time))
            .first::<Option<NaiveDateTime>>(&mut conn)
            .into_core()
    }

    fn list_symbols(&self) -> Result<BTreeMap<String, String>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = securities_dsl::securities
            .inner_join(data_sources_dsl::data_sources)
            .select((securities_dsl::symbol, data_sources_dsl::name))
            .order(securities_dsl::symbol.asc())
            .load::<(String, String)>(&mut conn)
            .into_core()?;

        Ok(rows.into_iter().collect())
    }

    async fn create_data_source(&self, name: &str, url: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let row = NewDataSourceDB { name, url };

        Self::tolerate_duplicate(
            diesel::insert_into(data_sources_dsl::data_sources)
                .values(&row)
                .execute(&mut conn),
        )
    }

    async fn create_security(
        &self,
        symbol: &str,
        profile: &SecurityProfile,
        data_source_id: i32,
    ) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let row = NewSecurityDB::from_profile(symbol, profile, data_source_id);

        Self::tolerate_duplicate(
            diesel::insert_into(securities_dsl::securities)
                .values(&row)
                .execute(&mut conn),
        )
    }

    async fn bulk_insert_observations(
        &self,
        symbol: &str,
        rows: &[ObservationRow],
    ) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut conn = get_connection(&self.pool)?;

        let security_id = Self::security_id(&mut conn, symbol)?.ok_or_else(|| {
            Error::Database(DatabaseError::NotFound(format!(
                "No security row for symbol {}",
                symbol
            )))
        })?;

        let db_rows: Vec<NewPriceObservationDB> = rows
            .iter()
            .map(|row| NewPriceObservationDB::from_row(row, security_id))
            .collect();

        let inserted = conn
            .transaction::<usize, DieselError, _>(|conn| {
                let mut total = 0;
                for chunk in db_rows.chunks(1_000) {
                    // Rows whose (security, sample time) pair already exists
                    // are skipped, so replays never duplicate history.
                    total += diesel::insert_or_ignore_into(
                        price_observations_dsl::price_observations,
                    )
                    .values(chunk)
                    .execute(conn)?;
                }
                Ok(total)
            })
            .into_core()?;

        debug!("{}: persisted {} of {} rows", symbol, inserted, rows.len());
        Ok(inserted)
    }

    async fn delete_security_cascade(&self, symbol: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;

        // Observations go with the security via ON DELETE CASCADE.
        let deleted =
            diesel::delete(securities_dsl::securities.filter(securities_dsl::symbol.eq(symbol)))
                .execute(&mut conn)
                .into_core()?;

        Ok(deleted > 0)
    }
}

impl ReportingStore for SqlitePriceStore {
    fn closes_relative_to_average(
        &self,
        window_start: NaiveDateTime,
        relation: AverageRelation,
    ) -> Result<Vec<RelativeAverageRow>> {
        let mut conn = get_connection(&self.pool)?;

        let symbols = securities_dsl::securities
            .select((securities_dsl::id, securities_dsl::symbol))
            .order(securities_dsl::symbol.asc())
            .load::<(i32, String)>(&mut conn)
            .into_core()?;

        let mut rows = Vec::new();
        for (security_id, symbol) in symbols {
            let average = price_observations_dsl::price_observations
                .filter(price_observations_dsl::security_id.eq(security_id))
                .filter(price_observations_dsl::sample_time.ge(window_start))
                .select(diesel::dsl::avg(price_observations_dsl::close))
                .first::<Option<f64>>(&mut conn)
                .into_core()?;

            let latest = price_observations_dsl::price_observations
                .filter(price_observations_dsl::security_id.eq(security_id))
                .filter(price_observations_dsl::close.is_not_null())
                .order(price_observations_dsl::sample_time.desc())
                .select(price_observations_dsl::close)
                .first::<Option<f64>>(&mut conn)
                .optional()
                .into_core()?
                .flatten();

            let (Some(average_close), Some(latest_close)) = (average, latest) else {
                continue;
            };

            let matches = match relation {
                AverageRelation::Above => latest_close > average_close,
                AverageRelation::Below => latest_close < average_close,
            };
            if matches {
                rows.push(RelativeAverageRow {
                    symbol,
                    latest_close,
                    average_close,
                });
            }
        }

        Ok(rows)
    }

    fn range_summary(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<RangeSummaryRow>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = price_observations_dsl::price_observations
            .inner_join(securities_dsl::securities)
            .filter(price_observations_dsl::sample_time.ge(start))
            .filter(price_observations_dsl::sample_time.le(end))
            .group_by(securities_dsl::symbol)
            .select((
                securities_dsl::symbol,
                diesel::dsl::max(price_observations_dsl::high),
                diesel::dsl::min(price_observations_dsl::low),
            ))
            .order(securities_dsl::symbol.asc())
            .load::<(String, Option<f64>, Option<f64>)>(&mut conn)
            .into_core()?;

        Ok(rows
            .into_iter()
            .filter_map(|(symbol, highest, lowest)| {
                Some(RangeSummaryRow {
                    symbol,
                    highest: highest?,
                    lowest: lowest?,
                })
            })
            .collect())
    }

    fn close_extremes(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CloseExtremesRow>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = price_observations_dsl::price_observations
            .inner_join(securities_dsl::securities)
            .filter(price_observations_dsl::sample_time.ge(start))
            .filter(price_observations_dsl::sample_time.le(end))
            .group_by(securities_dsl::symbol)
            .select((
                securities_dsl::symbol,
                diesel::dsl::max(price_observations_dsl::close),
                diesel::dsl::min(price_observations_dsl::close),
            ))
            .order(securities_dsl::symbol.asc())
            .load::<(String, Option<f64>, Option<f64>)>(&mut conn)
            .into_core()?;

        Ok(rows
            .into_iter()
            .filter_map(|(symbol, highest_close, lowest_close)| {
                Some(CloseExtremesRow {
                    symbol,
                    highest_close: highest_close?,
                    lowest_close: lowest_close?,
                })
            })
            .collect())
    }
}
