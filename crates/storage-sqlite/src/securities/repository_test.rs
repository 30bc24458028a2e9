use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use std::sync::Arc;

use securitydb_core::reports::{AverageRelation, ReportingStore};
use securitydb_core::store::{ObservationRow, PriceStore, SecurityProfile};

use super::repository::SqlitePriceStore;
use crate::db::{create_pool, get_connection, init, run_migrations, DbPool};
use crate::schema::price_observations::dsl as price_observations_dsl;

fn open_store() -> (tempfile::TempDir, Arc<DbPool>, SqlitePriceStore) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("prices.db");
    let db_path = db_path.to_str().unwrap();

    init(db_path).unwrap();
    let pool = create_pool(db_path).unwrap();
    run_migrations(&pool).unwrap();

    let store = SqlitePriceStore::new(pool.clone());
    (dir, pool, store)
}

fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn row(sample_time: NaiveDateTime, data_source_id: i32) -> ObservationRow {
    ObservationRow {
        sample_time,
        open: Some(10.0),
        high: Some(11.0),
        low: None,
        close: Some(10.5),
        adjusted_close: Some(10.4),
        volume: Some(1000.0),
        dividend_amount: Some(0.0),
        split_coefficient: Some(1.0),
        data_source_id,
    }
}

fn priced_row(
    sample_time: NaiveDateTime,
    data_source_id: i32,
    close: f64,
    high: f64,
    low: f64,
) -> ObservationRow {
    ObservationRow {
        close: Some(close),
        high: Some(high),
        low: Some(low),
        ..row(sample_time, data_source_id)
    }
}

async fn seed_security(store: &SqlitePriceStore, symbol: &str) -> i32 {
    store
        .create_data_source("AlphaVantage", "https://www.alphavantage.co")
        .await
        .unwrap();
    let ds_id = store.lookup_data_source_id("AlphaVantage").unwrap().unwrap();
    store
        .create_security(symbol, &SecurityProfile::default(), ds_id)
        .await
        .unwrap();
    ds_id
}

fn observation_count(pool: &DbPool) -> i64 {
    let mut conn = get_connection(pool).unwrap();
    price_observations_dsl::price_observations
        .count()
        .get_result(&mut conn)
        .unwrap()
}

#[tokio::test]
async fn test_create_and_lookup() {
    let (_dir, _pool, store) = open_store();

    assert_eq!(store.lookup_data_source_id("AlphaVantage").unwrap(), None);
    assert_eq!(store.lookup_security_id("SPY").unwrap(), None);

    let ds_id = seed_security(&store, "SPY").await;
    assert_eq!(store.lookup_data_source_id("AlphaVantage").unwrap(), Some(ds_id));
    assert!(store.lookup_security_id("SPY").unwrap().is_some());
}

#[tokio::test]
async fn test_duplicate_create_is_tolerated() {
    let (_dir, _pool, store) = open_store();

    let ds_id = seed_security(&store, "SPY").await;

    // Second creates hit the unique constraints and succeed silently.
    store
        .create_data_source("AlphaVantage", "https://elsewhere.example")
        .await
        .unwrap();
    store
        .create_security("SPY", &SecurityProfile::default(), ds_id)
        .await
        .unwrap();

    assert_eq!(store.lookup_data_source_id("AlphaVantage").unwrap(), Some(ds_id));
    assert_eq!(store.list_symbols().unwrap().len(), 1);
}

#[tokio::test]
async fn test_bulk_insert_is_idempotent() {
    let (_dir, _pool, store) = open_store();
    let ds_id = seed_security(&store, "SPY").await;

    let rows = vec![row(ts(2024, 1, 2), ds_id), row(ts(2024, 1, 3), ds_id)];
    assert_eq!(store.bulk_insert_observations("SPY", &rows).await.unwrap(), 2);

    // Replaying the same rows inserts nothing.
    assert_eq!(store.bulk_insert_observations("SPY", &rows).await.unwrap(), 0);

    // Overlapping batch inserts only the new row.
    let rows = vec![row(ts(2024, 1, 3), ds_id), row(ts(2024, 1, 4), ds_id)];
    assert_eq!(store.bulk_insert_observations("SPY", &rows).await.unwrap(), 1);
}

#[tokio::test]
async fn test_insert_without_security_fails() {
    let (_dir, _pool, store) = open_store();

    let err = store
        .bulk_insert_observations("GHOST", &[row(ts(2024, 1, 2), 1)])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("GHOST"));
}

#[tokio::test]
async fn test_last_observed_timestamp() {
    let (_dir, _pool, store) = open_store();
    let ds_id = seed_security(&store, "SPY").await;

    assert_eq!(store.last_observed_timestamp("SPY").unwrap(), None);
    assert_eq!(store.last_observed_timestamp("GHOST").unwrap(), None);

    let rows = vec![
        row(ts(2024, 1, 3), ds_id),
        row(ts(2024, 1, 2), ds_id),
        row(ts(2024, 1, 4), ds_id),
    ];
    store.bulk_insert_observations("SPY", &rows).await.unwrap();

    assert_eq!(
        store.last_observed_timestamp("SPY").unwrap(),
        Some(ts(2024, 1, 4))
    );
}

#[tokio::test]
async fn test_list_symbols_ordered_with_source() {
    let (_dir, _pool, store) = open_store();
    let ds_id = seed_security(&store, "SPY").await;
    store
        .create_security("AGG", &SecurityProfile::default(), ds_id)
        .await
        .unwrap();

    let symbols = store.list_symbols().unwrap();
    let listed: Vec<(&str, &str)> = symbols
        .iter()
        .map(|(s, d)| (s.as_str(), d.as_str()))
        .collect();
    assert_eq!(
        listed,
        vec![("AGG", "AlphaVantage"), ("SPY", "AlphaVantage")]
    );
}

#[tokio::test]
async fn test_close_extremes_and_range_summary_over_window() {
    let (_dir, _pool, store) = open_store();
    let ds_id = seed_security(&store, "SPY").await;
    store
        .create_security("AGG", &SecurityProfile::default(), ds_id)
        .await
        .unwrap();

    let spy = vec![
        priced_row(ts(2024, 1, 2), ds_id, 100.0, 105.0, 99.0),
        priced_row(ts(2024, 1, 3), ds_id, 110.0, 112.0, 101.0),
        // Outside the queried window, must not influence the extremes.
        priced_row(ts(2023, 6, 1), ds_id, 500.0, 600.0, 1.0),
    ];
    store.bulk_insert_observations("SPY", &spy).await.unwrap();
    let agg = vec![priced_row(ts(2024, 1, 2), ds_id, 50.0, 51.0, 49.0)];
    store.bulk_insert_observations("AGG", &agg).await.unwrap();

    let extremes = store.close_extremes(ts(2024, 1, 1), ts(2024, 12, 31)).unwrap();
    assert_eq!(extremes.len(), 2);
    assert_eq!(extremes[0].symbol, "AGG");
    assert_eq!(extremes[1].symbol, "SPY");
    assert_eq!(extremes[1].highest_close, 110.0);
    assert_eq!(extremes[1].lowest_close, 100.0);

    let ranges = store.range_summary(ts(2024, 1, 1), ts(2024, 12, 31)).unwrap();
    assert_eq!(ranges[1].symbol, "SPY");
    assert_eq!(ranges[1].highest, 112.0);
    assert_eq!(ranges[1].lowest, 99.0);
    // AGG has a single row; its range collapses to that row's high and low.
    assert_eq!(ranges[0].highest, 51.0);
    assert_eq!(ranges[0].lowest, 49.0);
}

#[tokio::test]
async fn test_closes_relative_to_average() {
    let (_dir, _pool, store) = open_store();
    let ds_id = seed_security(&store, "SPY").await;
    store
        .create_security("AGG", &SecurityProfile::default(), ds_id)
        .await
        .unwrap();
    store
        .create_security("EMPTY", &SecurityProfile::default(), ds_id)
        .await
        .unwrap();

    // SPY rises: latest close 120 against an average of 110.
    let spy = vec![
        priced_row(ts(2024, 1, 2), ds_id, 100.0, 101.0, 99.0),
        priced_row(ts(2024, 1, 3), ds_id, 110.0, 111.0, 109.0),
        priced_row(ts(2024, 1, 4), ds_id, 120.0, 121.0, 119.0),
    ];
    store.bulk_insert_observations("SPY", &spy).await.unwrap();

    // AGG falls: latest close 40 against an average of 45.
    let agg = vec![
        priced_row(ts(2024, 1, 2), ds_id, 50.0, 51.0, 49.0),
        priced_row(ts(2024, 1, 3), ds_id, 40.0, 41.0, 39.0),
    ];
    store.bulk_insert_observations("AGG", &agg).await.unwrap();

    let window = ts(2024, 1, 1);

    let above = store
        .closes_relative_to_average(window, AverageRelation::Above)
        .unwrap();
    assert_eq!(above.len(), 1);
    assert_eq!(above[0].symbol, "SPY");
    assert_eq!(above[0].latest_close, 120.0);
    assert_eq!(above[0].average_close, 110.0);

    let below = store
        .closes_relative_to_average(window, AverageRelation::Below)
        .unwrap();
    assert_eq!(below.len(), 1);
    assert_eq!(below[0].symbol, "AGG");
    assert_eq!(below[0].latest_close, 40.0);
    assert_eq!(below[0].average_close, 45.0);
}

#[tokio::test]
async fn test_delete_cascades_to_observations() {
    let (_dir, pool, store) = open_store();
    let ds_id = seed_security(&store, "SPY").await;

    let rows = vec![row(ts(2024, 1, 2), ds_id), row(ts(2024, 1, 3), ds_id)];
    store.bulk_insert_observations("SPY", &rows).await.unwrap();
    assert_eq!(observation_count(&pool), 2);

    assert!(store.delete_security_cascade("SPY").await.unwrap());
    assert_eq!(store.lookup_security_id("SPY").unwrap(), None);
    assert_eq!(observation_count(&pool), 0);

    // Deleting an absent symbol reports false.
    assert!(!store.delete_security_cascade("SPY").await.unwrap());
}
