//! Reader for the provider's semicolon-separated grid timeseries payload.
//!
//! ```text
//! lat;lon;validdate;t_2m:C;precip_1h:mm
//! 47;7;2024-06-01T00:00:00Z;14.2;0.00
//! ```

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::model::{Field, GridObservation};

/// Sentinels the provider writes for values it could not compute.
const INVALID_SENTINELS: &[f64] = &[-666.0, -999.0];

/// Decode a payload into observations, in payload order.
///
/// Coordinate uniqueness is not checked here; that happens when the rows are
/// assembled into a [`GridTimeseries`](crate::model::GridTimeseries).
pub fn parse_grid_csv(body: &str) -> Result<Vec<GridObservation>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .trim(Trim::All)
        .has_headers(true)
        .from_reader(body.as_bytes());

    let headers = reader.headers().context("Failed to read grid payload header")?;
    let columns = Columns::from_header(headers)?;

    let mut observations = Vec::new();
    for result in reader.records() {
        let record = result.context("Failed to read grid payload record")?;
        let obs = columns.parse_row(&record).with_context(|| match record.position() {
            Some(pos) => format!("Failed to parse grid payload line {}", pos.line()),
            None => "Failed to parse grid payload record".to_string(),
        })?;
        observations.push(obs);
    }

    Ok(observations)
}

struct Columns {
    lat: usize,
    lon: usize,
    valid_time: usize,
    fields: Vec<(usize, Field)>,
}

impl Columns {
    fn from_header(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                anyhow!(
                    "grid payload header has no '{name}' column: {}",
                    headers.iter().collect::<Vec<_>>().join(";")
                )
            })
        };

        let fields = headers
            .iter()
            .enumerate()
            .filter_map(|(i, h)| Field::from_parameter(h).map(|f| (i, f)))
            .collect();

        Ok(Self {
            lat: find("lat")?,
            lon: find("lon")?,
            valid_time: find("validdate")?,
            fields,
        })
    }

    fn parse_row(&self, record: &StringRecord) -> Result<GridObservation> {
        let cell = |i: usize| record.get(i).unwrap_or_default();

        let mut obs = GridObservation {
            latitude: parse_coordinate(cell(self.lat), "lat")?,
            longitude: parse_coordinate(cell(self.lon), "lon")?,
            valid_time: parse_valid_time(cell(self.valid_time))?,
            temperature_c: None,
            precipitation_mm_1h: None,
        };

        for &(i, field) in &self.fields {
            let value = parse_value(cell(i), field)?;
            match field {
                Field::Temperature => obs.temperature_c = value,
                Field::Precipitation => obs.precipitation_mm_1h = value,
            }
        }

        Ok(obs)
    }
}

fn parse_coordinate(cell: &str, name: &str) -> Result<f64> {
    cell.parse::<f64>().with_context(|| format!("invalid {name} value '{cell}'"))
}

fn parse_value(cell: &str, field: Field) -> Result<Option<f64>> {
    if cell.is_empty() {
        return Ok(None);
    }

    let value = cell.parse::<f64>().with_context(|| format!("invalid {field} value '{cell}'"))?;
    if INVALID_SENTINELS.contains(&value) || !value.is_finite() {
        Ok(None)
    } else {
        Ok(Some(value))
    }
}

fn parse_valid_time(cell: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(cell) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(cell, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .with_context(|| format!("invalid validdate value '{cell}'"))
}
