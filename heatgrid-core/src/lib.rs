//! Core library for the `heatgrid` CLI.
//!
//! This crate defines:
//! - The grid timeseries model and its flattening into serializable records
//! - Temperature statistics and per-day extremes over a whole grid
//! - Heat-wave detection over the daily extremes
//! - Abstraction over weather data providers, plus configuration & credentials
//!
//! [`GridEngine`] ties these together: one provider fetch per query, then a
//! synchronous pipeline over the returned grid.

pub mod config;
pub mod daily;
pub mod engine;
pub mod error;
pub mod flatten;
pub mod grid_csv;
pub mod heatwave;
pub mod model;
pub mod provider;
pub mod stats;

pub use config::{Config, Credentials};
pub use daily::{DailyExtremes, DayExtremes};
pub use engine::{GridEngine, StatisticsReport};
pub use error::EngineError;
pub use flatten::FlatRecord;
pub use heatwave::{HeatWaveOutcome, HeatWaveResult};
pub use model::{BoundingBox, Field, GridObservation, GridQuery, GridTimeseries, Resolution};
pub use provider::{GridRequest, WeatherProvider};
pub use stats::{FieldStats, TemperatureStats};
