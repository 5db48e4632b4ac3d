//! Heat-wave detection over daily temperature extremes.
//!
//! A heat wave is a run of consecutive qualifying days, each with a maximum above
//! [`MAX_TEMP_THRESHOLD_C`] and a minimum above [`MIN_TEMP_THRESHOLD_C`], reaching
//! [`CONSECUTIVE_DAYS_THRESHOLD`] days. Scanning stops at the first such run, so a
//! second heat wave later in the same window is never reported.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    daily::{DailyExtremes, DayExtremes},
    flatten::FlatRecord,
};

pub const MAX_TEMP_THRESHOLD_C: f64 = 35.0;
pub const MIN_TEMP_THRESHOLD_C: f64 = 20.0;
pub const CONSECUTIVE_DAYS_THRESHOLD: usize = 3;

/// Whether the detector wants more days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Detected,
}

/// Run-length state machine fed one day at a time, in ascending date order.
#[derive(Debug, Clone, Default)]
pub struct HeatWaveDetector {
    running_count: usize,
    collected_days: Vec<NaiveDate>,
    last_examined: Option<NaiveDate>,
}

impl HeatWaveDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn qualifies(day: &DayExtremes) -> bool {
        day.max_temperature_c > MAX_TEMP_THRESHOLD_C && day.min_temperature_c > MIN_TEMP_THRESHOLD_C
    }

    pub fn running_count(&self) -> usize {
        self.running_count
    }

    pub fn step(&mut self, date: NaiveDate, day: &DayExtremes) -> Step {
        self.last_examined = Some(date);

        if Self::qualifies(day) {
            self.running_count += 1;
            self.collected_days.push(date);
        } else {
            // A broken run leaves nothing worth reporting.
            self.running_count = 0;
            self.collected_days.clear();
        }

        if self.running_count >= CONSECUTIVE_DAYS_THRESHOLD {
            Step::Detected
        } else {
            Step::Continue
        }
    }

    pub fn finish(self) -> HeatWaveOutcome {
        let detected = self.running_count >= CONSECUTIVE_DAYS_THRESHOLD;
        HeatWaveOutcome {
            detected,
            days: if detected { self.collected_days } else { Vec::new() },
            last_examined: self.last_examined,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatWaveOutcome {
    pub detected: bool,
    /// Days of the detected run; empty when nothing was detected.
    pub days: Vec<NaiveDate>,
    /// Last date fed to the detector before it stopped.
    pub last_examined: Option<NaiveDate>,
}

pub fn detect_heat_wave(daily: &DailyExtremes) -> HeatWaveOutcome {
    let mut detector = HeatWaveDetector::new();
    for (date, day) in daily.iter() {
        if detector.step(*date, day) == Step::Detected {
            debug!(%date, run = detector.running_count(), "heat-wave run reached threshold; stopping scan");
            break;
        }
    }
    detector.finish()
}

/// Response of a heat-wave query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatWaveResult {
    pub flat_records: Vec<FlatRecord>,
    pub daily_max_temperatures: BTreeMap<NaiveDate, f64>,
    pub daily_min_temperatures: BTreeMap<NaiveDate, f64>,
    pub potential_heat_wave: Vec<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn daily(days: &[(u32, f64, f64)]) -> DailyExtremes {
        days.iter()
            .map(|&(d, max, min)| {
                (date(d), DayExtremes { max_temperature_c: max, min_temperature_c: min })
            })
            .collect()
    }

    #[test]
    fn three_hot_days_are_a_heat_wave() {
        let outcome = detect_heat_wave(&daily(&[(1, 36.0, 21.0), (2, 36.0, 22.0), (3, 37.0, 25.0)]));

        assert!(outcome.detected);
        assert_eq!(outcome.days, vec![date(1), date(2), date(3)]);
    }

    #[test]
    fn a_cool_day_breaks_the_run() {
        let outcome = detect_heat_wave(&daily(&[(1, 36.0, 21.0), (2, 30.0, 15.0), (3, 40.0, 30.0)]));

        assert!(!outcome.detected);
        assert!(outcome.days.is_empty());
        assert_eq!(outcome.last_examined, Some(date(3)));
    }

    #[test]
    fn thresholds_are_strict() {
        assert!(!HeatWaveDetector::qualifies(&DayExtremes { max_temperature_c: 35.0, min_temperature_c: 25.0 }));
        assert!(!HeatWaveDetector::qualifies(&DayExtremes { max_temperature_c: 38.0, min_temperature_c: 20.0 }));
        assert!(HeatWaveDetector::qualifies(&DayExtremes { max_temperature_c: 35.1, min_temperature_c: 20.1 }));
    }

    #[test]
    fn failing_day_resets_count_and_days() {
        let mut detector = HeatWaveDetector::new();
        let hot = DayExtremes { max_temperature_c: 40.0, min_temperature_c: 25.0 };
        let mild = DayExtremes { max_temperature_c: 36.0, min_temperature_c: 19.0 };

        assert_eq!(detector.step(date(1), &hot), Step::Continue);
        assert_eq!(detector.step(date(2), &hot), Step::Continue);
        assert_eq!(detector.running_count(), 2);
        assert_eq!(detector.step(date(3), &mild), Step::Continue);
        assert_eq!(detector.running_count(), 0);

        let outcome = detector.finish();
        assert!(!outcome.detected);
        assert!(outcome.days.is_empty());
    }

    #[test]
    fn reported_run_excludes_days_before_a_break() {
        let outcome = detect_heat_wave(&daily(&[
            (1, 36.0, 21.0),
            (2, 36.0, 21.0),
            (3, 30.0, 18.0),
            (4, 36.0, 21.0),
            (5, 37.0, 22.0),
            (6, 38.0, 23.0),
        ]));

        assert!(outcome.detected);
        assert_eq!(outcome.days, vec![date(4), date(5), date(6)]);
    }

    #[test]
    fn scan_stops_at_the_triggering_day() {
        let outcome = detect_heat_wave(&daily(&[
            (1, 36.0, 21.0),
            (2, 36.0, 21.0),
            (3, 36.0, 21.0),
            (4, 39.0, 26.0),
            (10, 36.0, 21.0),
            (11, 36.0, 21.0),
            (12, 36.0, 21.0),
        ]));

        assert!(outcome.detected);
        assert_eq!(outcome.days, vec![date(1), date(2), date(3)]);
        assert_eq!(outcome.last_examined, Some(date(3)));
    }

    #[test]
    fn gap_days_do_not_break_a_run() {
        // Only days present in the aggregation are examined.
        let outcome = detect_heat_wave(&daily(&[(1, 36.0, 21.0), (3, 36.0, 21.0), (5, 36.0, 21.0)]));
        assert!(outcome.detected);
    }

    #[test]
    fn no_days_no_heat_wave() {
        let outcome = detect_heat_wave(&DailyExtremes::default());
        assert!(!outcome.detected);
        assert_eq!(outcome.last_examined, None);
    }
}
