use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A measured quantity carried by each grid observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Temperature,
    Precipitation,
}

impl Field {
    /// Provider parameter name, also used as the serialized column name.
    pub fn parameter(&self) -> &'static str {
        match self {
            Field::Temperature => "t_2m:C",
            Field::Precipitation => "precip_1h:mm",
        }
    }

    pub fn from_parameter(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|f| f.parameter() == name)
    }

    pub const fn all() -> &'static [Field] {
        &[Field::Temperature, Field::Precipitation]
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.parameter())
    }
}

/// One measurement at a (latitude, longitude, valid time) coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct GridObservation {
    pub latitude: f64,
    pub longitude: f64,
    pub valid_time: DateTime<Utc>,
    pub temperature_c: Option<f64>,
    pub precipitation_mm_1h: Option<f64>,
}

impl GridObservation {
    pub fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Temperature => self.temperature_c,
            Field::Precipitation => self.precipitation_mm_1h,
        }
    }

    /// Like [`value`](Self::value), but a missing value is a malformed grid.
    pub fn require(&self, field: Field) -> Result<f64> {
        self.value(field).ok_or_else(|| self.malformed(format!("missing {field} value")))
    }

    pub fn date(&self) -> NaiveDate {
        self.valid_time.date_naive()
    }

    pub(crate) fn malformed(&self, reason: String) -> EngineError {
        EngineError::MalformedGrid {
            latitude: self.latitude,
            longitude: self.longitude,
            valid_time: self.valid_time,
            reason,
        }
    }
}

/// Observations of a bounding box sampled over time, in provider order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridTimeseries {
    observations: Vec<GridObservation>,
}

impl GridTimeseries {
    /// Build a grid, rejecting repeated (latitude, longitude, valid time) keys.
    pub fn new(observations: Vec<GridObservation>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(observations.len());
        for obs in &observations {
            // `+ 0.0` folds -0.0 into 0.0 so both signs name the same cell.
            let key = ((obs.latitude + 0.0).to_bits(), (obs.longitude + 0.0).to_bits(), obs.valid_time);
            if !seen.insert(key) {
                return Err(obs.malformed("duplicate grid coordinate".to_string()));
            }
        }

        Ok(Self { observations })
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GridObservation> {
        self.observations.iter()
    }

    /// All values of `field`, failing on the first observation that lacks it.
    pub fn values(&self, field: Field) -> Result<Vec<f64>> {
        self.observations.iter().map(|obs| obs.require(field)).collect()
    }

    /// Group observations by a projected key, keys ascending.
    pub fn group_by<K, F>(&self, key: F) -> BTreeMap<K, Vec<&GridObservation>>
    where
        K: Ord,
        F: Fn(&GridObservation) -> K,
    {
        let mut groups: BTreeMap<K, Vec<&GridObservation>> = BTreeMap::new();
        for obs in &self.observations {
            groups.entry(key(obs)).or_default().push(obs);
        }
        groups
    }
}

impl<'a> IntoIterator for &'a GridTimeseries {
    type Item = &'a GridObservation;
    type IntoIter = std::slice::Iter<'a, GridObservation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Geographic box in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub west: f64,
    pub south: f64,
    pub east: f64,
}

/// Grid spacing in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub lat: f64,
    pub lon: f64,
}

/// Parameters of one grid query, as handed over by the request layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridQuery {
    pub start_date: NaiveDate,
    pub interval_hours: u32,
    pub span_days: u32,
    pub bbox: BoundingBox,
    pub resolution: Resolution,
}

impl GridQuery {
    /// Midnight UTC of the start date.
    pub fn start(&self) -> DateTime<Utc> {
        self.start_date.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start() + Duration::days(i64::from(self.span_days))
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(EngineError::InvalidQuery(msg.to_string()));

        if self.interval_hours == 0 {
            return invalid("interval_hours must be at least 1");
        }
        if self.span_days == 0 {
            return invalid("span_days must be at least 1");
        }
        if !(self.resolution.lat > 0.0 && self.resolution.lon > 0.0) {
            return invalid("resolution must be positive");
        }
        let BoundingBox { north, west, south, east } = self.bbox;
        if !(-90.0..=90.0).contains(&north) || !(-90.0..=90.0).contains(&south) {
            return invalid("latitudes must lie within [-90, 90]");
        }
        if !(-180.0..=180.0).contains(&west) || !(-180.0..=180.0).contains(&east) {
            return invalid("longitudes must lie within [-180, 180]");
        }
        if south > north {
            return invalid("south latitude lies above north latitude");
        }

        Ok(())
    }
}
