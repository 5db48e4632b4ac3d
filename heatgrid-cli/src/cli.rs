use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use heatgrid_core::{
    BoundingBox, Config, Credentials, GridEngine, GridQuery, HeatWaveResult, Resolution,
    StatisticsReport, WeatherProvider,
    heatwave::{CONSECUTIVE_DAYS_THRESHOLD, MAX_TEMP_THRESHOLD_C, MIN_TEMP_THRESHOLD_C},
    provider::{file::CsvFileProvider, provider_from_config},
};
use inquire::{Password, Text};
use std::path::PathBuf;
use tracing::info;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "heatgrid", version, about = "Grid temperature statistics and heat-wave detection")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store Meteomatics credentials in the config file.
    Configure,

    /// Temperature statistics over a grid, plus the flattened grid.
    Stats(QueryArgs),

    /// Daily extremes over a grid and the first potential heat wave.
    HeatWave(QueryArgs),
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// First day of the window (UTC), e.g. 2024-06-01.
    #[arg(long)]
    pub start_date: NaiveDate,

    /// Hours between samples.
    #[arg(long, default_value_t = 1)]
    pub interval_hours: u32,

    /// Length of the window in days.
    #[arg(long, default_value_t = 1)]
    pub days: u32,

    #[arg(long, allow_negative_numbers = true)]
    pub north: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub west: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub south: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub east: f64,

    /// Latitude spacing in degrees.
    #[arg(long, default_value_t = 0.1)]
    pub lat_res: f64,

    /// Longitude spacing in degrees.
    #[arg(long, default_value_t = 0.1)]
    pub lon_res: f64,

    /// Read a saved grid payload instead of querying the provider.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Print the full response as JSON.
    #[arg(long)]
    pub json: bool,
}

impl QueryArgs {
    fn query(&self) -> GridQuery {
        GridQuery {
            start_date: self.start_date,
            interval_hours: self.interval_hours,
            span_days: self.days,
            bbox: BoundingBox { north: self.north, west: self.west, south: self.south, east: self.east },
            resolution: Resolution { lat: self.lat_res, lon: self.lon_res },
        }
    }

    fn engine(&self) -> anyhow::Result<GridEngine> {
        let provider: Box<dyn WeatherProvider> = match &self.input {
            Some(path) => Box::new(CsvFileProvider::new(path)),
            None => {
                let config = Config::load()?.with_env_overrides();
                provider_from_config(&config)?
            }
        };
        Ok(GridEngine::new(provider))
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Stats(args) => {
                let report = args.engine()?.compute_statistics(&args.query()).await?;
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print_stats(&report);
                }
                Ok(())
            }
            Command::HeatWave(args) => {
                let result = args.engine()?.detect_heat_wave(&args.query()).await?;
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    print_heat_wave(&result);
                }
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if config.is_configured() {
        info!("existing credentials will be replaced");
    }

    let mut username_prompt = Text::new("Meteomatics username:");
    if let Some(existing) = config.credentials() {
        username_prompt = username_prompt.with_default(&existing.username);
    }
    let username = username_prompt.prompt().context("Failed to read username")?;

    let password = Password::new("Meteomatics password:")
        .without_confirmation()
        .prompt()
        .context("Failed to read password")?;

    config.set_credentials(Credentials { username, password });
    config.save()?;

    let path = Config::config_file_path()?;
    info!(path = %path.display(), "saved credentials");
    println!("Credentials saved to {}", path.display());

    Ok(())
}

fn print_stats(report: &StatisticsReport) {
    let stats = &report.temperature_stats;
    println!("Observations: {}", report.grid_timeseries.len());
    println!("Maximum temperature: {:.1} °C", stats.maximum);
    println!("Minimum temperature: {:.1} °C", stats.minimum);
    println!("Mean temperature:    {:.1} °C", stats.mean);
}

fn print_heat_wave(result: &HeatWaveResult) {
    println!("Observations: {}", result.flat_records.len());
    println!("{:<12} {:>8} {:>8}", "date", "max °C", "min °C");
    for (date, max) in &result.daily_max_temperatures {
        let min = result.daily_min_temperatures.get(date).copied().unwrap_or(f64::NAN);
        let marker = if result.potential_heat_wave.contains(date) { " *" } else { "" };
        println!("{:<12} {:>8.1} {:>8.1}{}", date.to_string(), max, min, marker);
    }

    if result.potential_heat_wave.is_empty() {
        println!(
            "No heat wave: fewer than {CONSECUTIVE_DAYS_THRESHOLD} consecutive days above \
             {MAX_TEMP_THRESHOLD_C} °C max and {MIN_TEMP_THRESHOLD_C} °C min."
        );
    } else {
        let days: Vec<String> = result.potential_heat_wave.iter().map(ToString::to_string).collect();
        println!("Potential heat wave: {}", days.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_heat_wave_query_with_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "heatgrid",
            "heat-wave",
            "--start-date",
            "2024-06-01",
            "--days",
            "7",
            "--north",
            "40.5",
            "--west",
            "-4.0",
            "--south",
            "-1.5",
            "--east",
            "3",
        ])
        .unwrap();

        let Command::HeatWave(args) = cli.command else {
            panic!("expected heat-wave command");
        };
        let query = args.query();
        assert_eq!(query.start_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(query.span_days, 7);
        assert_eq!(query.interval_hours, 1);
        assert_eq!(query.bbox.west, -4.0);
        assert_eq!(query.bbox.south, -1.5);
        assert_eq!(query.resolution, Resolution { lat: 0.1, lon: 0.1 });
        assert!(!args.json);
    }

    #[test]
    fn rejects_bad_start_date() {
        let err = Cli::try_parse_from([
            "heatgrid", "stats", "--start-date", "01/06/2024", "--north", "1", "--west", "1",
            "--south", "0", "--east", "2",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("start-date"));
    }

    #[test]
    fn input_file_selects_file_provider() {
        let cli = Cli::try_parse_from([
            "heatgrid", "stats", "--start-date", "2024-06-01", "--north", "1", "--west", "1",
            "--south", "0", "--east", "2", "--input", "grid.csv", "--json",
        ])
        .unwrap();

        let Command::Stats(args) = cli.command else {
            panic!("expected stats command");
        };
        assert!(args.json);
        assert!(args.engine().is_ok());
    }
}
