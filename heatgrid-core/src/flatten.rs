use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    model::{Field, GridTimeseries},
};

/// One observation with its coordinates spelled out as plain fields.
///
/// Keys match the provider's column names so a record reads the same as a row
/// of the raw payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    #[serde(rename = "validdate")]
    pub valid_time: String,
    #[serde(rename = "t_2m:C")]
    pub temperature_c: f64,
    #[serde(rename = "precip_1h:mm", default, skip_serializing_if = "Option::is_none")]
    pub precipitation_mm_1h: Option<f64>,
}

/// Project every observation into a [`FlatRecord`], keeping grid order.
pub fn flatten(grid: &GridTimeseries) -> Result<Vec<FlatRecord>> {
    grid.iter()
        .map(|obs| {
            Ok(FlatRecord {
                latitude: obs.latitude,
                longitude: obs.longitude,
                valid_time: format_valid_time(obs.valid_time),
                temperature_c: obs.require(Field::Temperature)?,
                precipitation_mm_1h: obs.precipitation_mm_1h,
            })
        })
        .collect()
}

pub fn format_valid_time(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
