use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use tracing::debug;

use crate::{config::Credentials, grid_csv::parse_grid_csv, model::GridObservation};

use super::{GridRequest, WeatherProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.meteomatics.com";

/// Client for the Meteomatics grid timeseries endpoint.
#[derive(Clone)]
pub struct MeteomaticsProvider {
    credentials: Credentials,
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for MeteomaticsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeteomaticsProvider")
            .field("username", &self.credentials.username)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl MeteomaticsProvider {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// `{base}/{start}--{end}:PT{h}H/{params}/{N},{W}_{S},{E}:{res_lat},{res_lon}/csv`
    pub fn grid_url(&self, request: &GridRequest) -> String {
        let q = &request.query;
        format!(
            "{}/{}--{}:PT{}H/{}/{},{}_{},{}:{},{}/csv",
            self.base_url,
            format_instant(q.start()),
            format_instant(q.end()),
            q.interval_hours,
            request.parameter_list(),
            q.bbox.north,
            q.bbox.west,
            q.bbox.south,
            q.bbox.east,
            q.resolution.lat,
            q.resolution.lon,
        )
    }
}

#[async_trait]
impl WeatherProvider for MeteomaticsProvider {
    async fn fetch_grid(&self, request: &GridRequest) -> Result<Vec<GridObservation>> {
        let url = self.grid_url(request);
        debug!(%url, "requesting grid timeseries");

        let res = self
            .http
            .get(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await
            .context("Failed to send request to Meteomatics (grid timeseries)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Meteomatics grid timeseries response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Meteomatics grid timeseries request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let rows = parse_grid_csv(&body).context("Failed to parse Meteomatics grid timeseries CSV")?;
        debug!(observations = rows.len(), bytes = body.len(), "received grid timeseries");

        Ok(rows)
    }
}

fn format_instant(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
