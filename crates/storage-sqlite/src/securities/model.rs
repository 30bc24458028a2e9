//! Database row shapes for the price store tables.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use securitydb_core::store::{ObservationRow, SecurityProfile};

use crate::schema::{data_sources, price_observations, securities};

#[derive(Insertable, Debug)]
#[diesel(table_name = data_sources)]
pub struct NewDataSourceDB<'a> {
    pub name: &'a str,
    pub url: &'a str,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = securities)]
pub struct NewSecurityDB<'a> {
    pub symbol: &'a str,
    pub security_type: &'a str,
    pub timezone: &'a str,
    pub contract_size: f64,
    pub currency: &'a str,
    pub data_source_id: i32,
}

impl<'a> NewSecurityDB<'a> {
    pub fn from_profile(
        symbol: &'a str,
        profile: &'a SecurityProfile,
        data_source_id: i32,
    ) -> Self {
        Self {
            symbol,
            security_type: &profile.security_type,
            timezone: &profile.timezone,
            contract_size: profile.contract_size,
            currency: &profile.currency,
            data_source_id,
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = price_observations)]
pub struct NewPriceObservationDB {
    pub security_id: i32,
    pub data_source_id: i32,
    pub sample_time: NaiveDateTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adjusted_close: Option<f64>,
    pub volume: Option<f64>,
    pub dividend_amount: Option<f64>,
    pub split_coefficient: Option<f64>,
}

impl NewPriceObservationDB {
    pub fn from_row(row: &ObservationRow, security_id: i32) -> Self {
        Self {
            security_id,
            data_source_id: row.data_source_id,
            sample_time: row.sample_time,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            adjusted_close: row.adjusted_close,
            volume: row.volume,
            dividend_amount: row.dividend_amount,
            split_coefficient: row.split_coefficient,
        }
    }
}
