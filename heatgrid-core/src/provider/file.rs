use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::{grid_csv::parse_grid_csv, model::GridObservation};

use super::{GridRequest, WeatherProvider};

/// Serves a previously saved grid payload from disk.
///
/// The query is not applied to the file contents; the saved grid is returned
/// as-is, the same way the network provider returns whatever it was sent.
#[derive(Debug, Clone)]
pub struct CsvFileProvider {
    path: PathBuf,
}

impl CsvFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl WeatherProvider for CsvFileProvider {
    async fn fetch_grid(&self, request: &GridRequest) -> Result<Vec<GridObservation>> {
        debug!(path = %self.path.display(), fields = %request.parameter_list(), "reading saved grid payload");

        let body = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read grid payload: {}", self.path.display()))?;

        parse_grid_csv(&body)
            .with_context(|| format!("Failed to parse grid payload: {}", self.path.display()))
    }
}
