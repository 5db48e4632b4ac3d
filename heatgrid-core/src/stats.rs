use serde::{Deserialize, Serialize};

use crate::{
    error::{EngineError, Result},
    model::{Field, GridTimeseries},
};

/// Extrema and plain mean of one field over every observation of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub maximum: f64,
    pub minimum: f64,
    pub mean: f64,
}

pub type TemperatureStats = FieldStats;

/// Aggregate `field` across all cells and all times. No area weighting.
pub fn field_stats(grid: &GridTimeseries, field: Field) -> Result<FieldStats> {
    if grid.is_empty() {
        return Err(EngineError::EmptyGrid);
    }

    let values = grid.values(field)?;
    let maximum = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let minimum = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mean = values.iter().sum::<f64>() / values.len() as f64;

    Ok(FieldStats { maximum, minimum, mean })
}

pub fn temperature_stats(grid: &GridTimeseries) -> Result<TemperatureStats> {
    field_stats(grid, Field::Temperature)
}
