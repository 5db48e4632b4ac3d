use crate::{
    Config,
    model::{Field, GridObservation, GridQuery},
    provider::meteomatics::MeteomaticsProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod file;
pub mod meteomatics;

/// What the engine asks a provider for: a query plus the fields to fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRequest {
    pub query: GridQuery,
    pub fields: Vec<Field>,
}

impl GridRequest {
    pub fn new(query: GridQuery, fields: &[Field]) -> Self {
        Self { query, fields: fields.to_vec() }
    }

    /// Comma-joined provider parameter names, e.g. `t_2m:C,precip_1h:mm`.
    pub fn parameter_list(&self) -> String {
        self.fields.iter().map(Field::parameter).collect::<Vec<_>>().join(",")
    }
}

/// Source of raw grid rows. Rows come back in provider order; assembling them
/// into a grid (and rejecting repeated coordinates) is the engine's job.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_grid(&self, request: &GridRequest) -> anyhow::Result<Vec<GridObservation>>;
}

/// Construct the network provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let credentials = config.credentials().ok_or_else(|| {
        anyhow::anyhow!(
            "No Meteomatics credentials configured.\n\
                 Hint: run `heatgrid configure` or set METEOMATICS_USERNAME and METEOMATICS_PASSWORD."
        )
    })?;

    let provider = MeteomaticsProvider::new(credentials.clone()).with_base_url(config.base_url());
    Ok(Box::new(provider))
}
