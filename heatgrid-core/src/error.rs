use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failures surfaced by the engine to its caller.
///
/// Provider I/O keeps its `anyhow` context chain as the source, so the request
/// layer can print the full cause while still matching on the variant.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("weather data provider request failed")]
    Provider(#[source] anyhow::Error),

    #[error("grid timeseries contains no observations")]
    EmptyGrid,

    #[error("malformed observation at lat={latitude}, lon={longitude}, valid_time={valid_time}: {reason}")]
    MalformedGrid {
        latitude: f64,
        longitude: f64,
        valid_time: DateTime<Utc>,
        reason: String,
    },

    #[error("invalid grid query: {0}")]
    InvalidQuery(String),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
