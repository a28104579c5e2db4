use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode, Text};
use raintrack_core::{Config, FileStore, Location, OpenWeatherSource, RainService, RefreshTask};
use std::{sync::Arc, time::Duration};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "raintrack", version, about = "Days since last rain")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API key and tracked location.
    Configure,

    /// Show current conditions.
    Weather {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Update and show the days-since-rain counter.
    Status {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Refresh now and then on an interval until interrupted.
    Watch {
        /// Seconds between refreshes; defaults to the configured interval.
        #[arg(long)]
        interval: Option<u64>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Weather { json } => {
                let service = build_service(&Config::load()?)?;
                let reading = service.get_current_weather().await;
                if json {
                    println!("{}", serde_json::to_string_pretty(&reading.snapshot())?);
                } else {
                    println!("{}", render::weather(&reading, chrono::Utc::now()));
                }
                Ok(())
            }
            Command::Status { json } => {
                let service = build_service(&Config::load()?)?;
                let status = service.check_rain_status().await;
                if json {
                    println!("{}", serde_json::to_string_pretty(&status)?);
                } else {
                    println!("{}", render::status(&status));
                }
                Ok(())
            }
            Command::Watch { interval } => {
                let config = Config::load()?;
                let interval = interval
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .unwrap_or_else(|| config.refresh_interval());
                watch(Arc::new(build_service(&config)?), interval).await
            }
        }
    }
}

fn build_service(config: &Config) -> Result<RainService> {
    let source = OpenWeatherSource::new(config.effective_api_key(), config.location.clone())
        .context("Failed to build HTTP client")?;
    let store = FileStore::new(config.state_file_path()?);

    Ok(RainService::new(
        Arc::new(source),
        Arc::new(store),
        &config.location.id,
    ))
}

async fn watch(service: Arc<RainService>, interval: Duration) -> Result<()> {
    let task = RefreshTask::start(interval, move || {
        let service = Arc::clone(&service);
        async move {
            let report = service.refresh().await;
            println!("{}", render::report(&report, chrono::Utc::now()));
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("Interrupted, stopping refresh");

    task.join().await;
    Ok(())
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key (leave empty to keep current):")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let current = config.location.clone();
    let name = Text::new("Location name:")
        .with_default(&current.name)
        .prompt()?;
    let latitude = CustomType::<f64>::new("Latitude:")
        .with_default(current.latitude)
        .with_error_message("Please enter a number")
        .prompt()?;
    let longitude = CustomType::<f64>::new("Longitude:")
        .with_default(current.longitude)
        .with_error_message("Please enter a number")
        .prompt()?;

    config.location = Location {
        id: location_id(&name),
        name,
        latitude,
        longitude,
    };
    let interval = CustomType::<u64>::new("Refresh interval in seconds:")
        .with_default(config.refresh_interval_secs)
        .with_error_message("Please enter a whole number of seconds")
        .prompt()?;
    config.refresh_interval_secs = interval.max(1);

    config.save()?;
    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

/// Lowercase, dash-separated id derived from a display name.
fn location_id(name: &str) -> String {
    let id = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");

    if id.is_empty() { "default".to_string() } else { id }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_id_slugifies_name() {
        assert_eq!(location_id("Armonk"), "armonk");
        assert_eq!(location_id("New York, NY"), "new-york-ny");
        assert_eq!(location_id("  "), "default");
    }

    #[test]
    fn parses_watch_interval() {
        let cli = Cli::try_parse_from(["raintrack", "watch", "--interval", "60"]).unwrap();
        assert!(matches!(cli.command, Command::Watch { interval: Some(60) }));
    }

    #[test]
    fn parses_status_json_flag() {
        let cli = Cli::try_parse_from(["raintrack", "status", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Status { json: true }));
    }
}
