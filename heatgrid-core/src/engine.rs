//! Query orchestration: one provider fetch, then the pure pipeline.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    daily::daily_extremes,
    error::{EngineError, Result},
    flatten::{FlatRecord, flatten},
    heatwave::{HeatWaveResult, detect_heat_wave},
    model::{Field, GridQuery, GridTimeseries},
    provider::{GridRequest, WeatherProvider},
    stats::{TemperatureStats, temperature_stats},
};

pub const STATISTICS_FIELDS: &[Field] = &[Field::Temperature, Field::Precipitation];
pub const HEAT_WAVE_FIELDS: &[Field] = &[Field::Temperature];

/// Response of a statistics query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub temperature_stats: TemperatureStats,
    pub grid_timeseries: Vec<FlatRecord>,
}

#[derive(Debug)]
pub struct GridEngine {
    provider: Box<dyn WeatherProvider>,
}

impl GridEngine {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    pub async fn compute_statistics(&self, query: &GridQuery) -> Result<StatisticsReport> {
        let grid = self.fetch(query, STATISTICS_FIELDS).await?;

        let grid_timeseries = flatten(&grid)?;
        let temperature_stats = temperature_stats(&grid)?;
        info!(
            observations = grid.len(),
            max = temperature_stats.maximum,
            min = temperature_stats.minimum,
            mean = temperature_stats.mean,
            "computed temperature statistics"
        );

        Ok(StatisticsReport { temperature_stats, grid_timeseries })
    }

    pub async fn detect_heat_wave(&self, query: &GridQuery) -> Result<HeatWaveResult> {
        let grid = self.fetch(query, HEAT_WAVE_FIELDS).await?;

        let flat_records = flatten(&grid)?;
        let daily = daily_extremes(&grid)?;
        let outcome = detect_heat_wave(&daily);

        if outcome.detected {
            warn!(days = ?outcome.days, "potential heat wave detected");
        } else {
            info!(days_examined = daily.len(), "no heat wave detected");
        }

        Ok(HeatWaveResult {
            flat_records,
            daily_max_temperatures: daily.daily_max(),
            daily_min_temperatures: daily.daily_min(),
            potential_heat_wave: outcome.days,
        })
    }

    async fn fetch(&self, query: &GridQuery, fields: &[Field]) -> Result<GridTimeseries> {
        query.validate()?;

        let request = GridRequest::new(query.clone(), fields);
        let rows = self.provider.fetch_grid(&request).await.map_err(EngineError::Provider)?;
        GridTimeseries::new(rows)
    }
}
