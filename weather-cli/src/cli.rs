use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::Password;
use weather_core::{Config, LookupOutcome, RenderOptions, WeatherApp, provider_from_config};

use crate::session;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather and 5-day forecast lookup")]
pub struct Cli {
    /// Disable ANSI colours in the output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Defaults to `interactive`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Show current weather and forecast for one city, then exit.
    Show {
        /// City name, e.g. "London" or "Paris,FR".
        city: String,
    },

    /// Search repeatedly, starting with the configured default city.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => configure(),
            Command::Show { city } => {
                let (app, options) = build_app(self.no_color)?;
                show(&app, &options, &city).await
            }
            Command::Interactive => {
                let (app, options) = build_app(self.no_color)?;
                session::run(&app, &options).await
            }
        }
    }
}

fn build_app(no_color: bool) -> anyhow::Result<(WeatherApp, RenderOptions)> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;

    let app = WeatherApp::new(Arc::new(provider), config.default_city.clone());
    let options = RenderOptions { icon_base_url: config.icon_base_url, color: !no_color };

    Ok((app, options))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load_stored()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Get one at https://home.openweathermap.org/api_keys")
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(api_key.to_string());
    config.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(app: &WeatherApp, options: &RenderOptions, city: &str) -> anyhow::Result<()> {
    match app.lookup(city).await {
        LookupOutcome::Applied => {
            print!("{}", session::screen(app, options));
            Ok(())
        }
        LookupOutcome::Failed(err) => {
            Err(anyhow::Error::new(err).context(format!("Lookup for '{}' failed", city.trim())))
        }
        LookupOutcome::Skipped => bail!("City name must not be empty"),
        LookupOutcome::Superseded => bail!("Lookup for '{}' was superseded", city.trim()),
    }
}
