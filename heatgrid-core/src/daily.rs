use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    model::{Field, GridObservation, GridTimeseries},
};

/// Hottest and coolest temperature seen anywhere in the grid on one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayExtremes {
    pub max_temperature_c: f64,
    pub min_temperature_c: f64,
}

/// Per-day temperature extremes, ascending by UTC calendar date.
///
/// Days without observations are absent rather than zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyExtremes {
    days: BTreeMap<NaiveDate, DayExtremes>,
}

impl DailyExtremes {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &DayExtremes)> {
        self.days.iter()
    }

    pub fn daily_max(&self) -> BTreeMap<NaiveDate, f64> {
        self.days.iter().map(|(d, e)| (*d, e.max_temperature_c)).collect()
    }

    pub fn daily_min(&self) -> BTreeMap<NaiveDate, f64> {
        self.days.iter().map(|(d, e)| (*d, e.min_temperature_c)).collect()
    }
}

impl FromIterator<(NaiveDate, DayExtremes)> for DailyExtremes {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, DayExtremes)>>(iter: I) -> Self {
        Self { days: iter.into_iter().collect() }
    }
}

/// Bucket the whole grid by the UTC date of each valid time.
///
/// Every cell contributes to its day's bucket, so the result is a spatial
/// extremum over the domain, not a per-location one.
pub fn daily_extremes(grid: &GridTimeseries) -> Result<DailyExtremes> {
    grid.group_by(GridObservation::date)
        .into_iter()
        .map(|(date, observations)| {
            let mut max = f64::NEG_INFINITY;
            let mut min = f64::INFINITY;
            for obs in observations {
                let t = obs.require(Field::Temperature)?;
                max = max.max(t);
                min = min.min(t);
            }
            Ok((date, DayExtremes { max_temperature_c: max, min_temperature_c: min }))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::EngineError, model::tests::obs};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn extremes_span_all_cells_of_a_day() {
        let grid = GridTimeseries::new(vec![
            obs(1.0, 1.0, (2024, 6, 2, 0), 18.0),
            obs(1.0, 2.0, (2024, 6, 2, 0), 24.0),
            obs(1.0, 1.0, (2024, 6, 2, 12), 31.0),
            obs(1.0, 1.0, (2024, 6, 1, 12), 29.0),
            obs(1.0, 2.0, (2024, 6, 1, 23), 16.5),
        ])
        .unwrap();

        let daily = daily_extremes(&grid).unwrap();
        assert_eq!(daily.len(), 2);
        let days: Vec<_> = daily.iter().map(|(d, e)| (*d, *e)).collect();
        assert_eq!(
            days,
            vec![
                (date(2024, 6, 1), DayExtremes { max_temperature_c: 29.0, min_temperature_c: 16.5 }),
                (date(2024, 6, 2), DayExtremes { max_temperature_c: 31.0, min_temperature_c: 18.0 }),
            ]
        );

        for (d, e) in daily.iter() {
            assert!(e.max_temperature_c >= e.min_temperature_c, "inverted extremes on {d}");
        }
    }

    #[test]
    fn gaps_are_not_zero_filled() {
        let grid = GridTimeseries::new(vec![
            obs(1.0, 1.0, (2024, 6, 1, 0), 20.0),
            obs(1.0, 1.0, (2024, 6, 4, 0), 21.0),
        ])
        .unwrap();

        let daily = daily_extremes(&grid).unwrap();
        assert_eq!(daily.len(), 2);
        assert!(!daily.daily_max().contains_key(&date(2024, 6, 2)));
    }

    #[test]
    fn max_and_min_projections() {
        let grid = GridTimeseries::new(vec![
            obs(1.0, 1.0, (2024, 6, 1, 0), 20.0),
            obs(1.0, 1.0, (2024, 6, 1, 12), 36.0),
        ])
        .unwrap();

        let daily = daily_extremes(&grid).unwrap();
        assert_eq!(daily.daily_max()[&date(2024, 6, 1)], 36.0);
        assert_eq!(daily.daily_min()[&date(2024, 6, 1)], 20.0);

        let json = serde_json::to_value(daily.daily_max()).unwrap();
        assert_eq!(json, serde_json::json!({ "2024-06-01": 36.0 }));
    }

    #[test]
    fn missing_temperature_is_malformed() {
        let mut broken = obs(1.0, 1.0, (2024, 6, 1, 0), 0.0);
        broken.temperature_c = None;
        let grid = GridTimeseries::new(vec![broken]).unwrap();

        assert!(matches!(daily_extremes(&grid), Err(EngineError::MalformedGrid { .. })));
    }
}
