use crate::{
    Config,
    error::ProviderError,
    model::{ForecastEntry, WeatherSnapshot},
    provider::openweather::OpenWeatherProvider,
};
use anyhow::Context;
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of current conditions and 3-hour forecast records for a city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, city: &str) -> Result<WeatherSnapshot, ProviderError>;

    /// Every 3-hour record the provider returns, in chronological order.
    async fn forecast(&self, city: &str) -> Result<Vec<ForecastEntry>, ProviderError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.require_api_key()?;

    OpenWeatherProvider::new(api_key.to_owned(), config.base_url.clone(), config.timeout_secs)
        .context("Failed to initialise HTTP client")
}
