use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    error::ProviderError,
    model::{ForecastEntry, WeatherSnapshot},
};

use super::WeatherProvider;

const UNITS: &str = "metric";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(
        api_key: String,
        base_url: String,
        timeout_secs: Option<u64>,
    ) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: builder.build()?,
        })
    }

    /// GET `{base_url}/{endpoint}` for a city and decode the body once its
    /// status checks out.
    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        city: &str,
    ) -> Result<T, ProviderError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%url, city, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", UNITS)])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        let value: Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(_) if !status.is_success() => {
                let message = if body.trim().is_empty() {
                    format!("OpenWeather request failed with status {}", status.as_u16())
                } else {
                    truncate_body(&body)
                };
                return Err(ProviderError::Api { code: status.as_u16(), message });
            }
            Err(e) => return Err(ProviderError::Malformed(e.to_string())),
        };

        check_status(status, &value)?;

        serde_json::from_value(value).map_err(|e| ProviderError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self))]
    async fn current(&self, city: &str) -> Result<WeatherSnapshot, ProviderError> {
        let parsed: OwCurrentResponse = self.fetch("weather", city).await?;
        let (condition_icon, condition_description) = first_condition(&parsed.weather);

        Ok(WeatherSnapshot {
            location_name: parsed.name,
            country_code: parsed.sys.country.unwrap_or_default(),
            temperature_c: parsed.main.temp,
            humidity_pct: parsed.main.humidity,
            wind_speed_ms: parsed.wind.speed,
            condition_icon,
            condition_description,
        })
    }

    #[instrument(skip(self))]
    async fn forecast(&self, city: &str) -> Result<Vec<ForecastEntry>, ProviderError> {
        let parsed: OwForecastResponse = self.fetch("forecast", city).await?;

        Ok(parsed
            .list
            .into_iter()
            .map(|item| {
                let (condition_icon, condition_description) = first_condition(&item.weather);
                ForecastEntry {
                    timestamp_unix: item.dt,
                    temperature_c: item.main.temp,
                    condition_icon,
                    condition_description,
                }
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    icon: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastItem {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastItem>,
}

fn first_condition(weather: &[OwWeather]) -> (String, String) {
    weather
        .first()
        .map(|w| (w.icon.clone(), w.description.clone()))
        .unwrap_or_else(|| (String::new(), "Unknown".to_string()))
}

/// OpenWeather reports its own status in `cod`, as a number on the current
/// endpoint and as a string on the forecast endpoint and in error bodies.
fn response_code(value: &Value) -> Option<u16> {
    match value.get("cod")? {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn check_status(status: StatusCode, value: &Value) -> Result<(), ProviderError> {
    let code = response_code(value).unwrap_or_else(|| status.as_u16());
    if code == 200 && status.is_success() {
        return Ok(());
    }

    let code = if code == 200 { status.as_u16() } else { code };
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("OpenWeather request failed with status {code}"));

    Err(ProviderError::Api { code, message })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
