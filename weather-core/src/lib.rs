//! Core library for the `weather` lookup app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client behind the [`WeatherProvider`] trait
//! - Shared domain models and the recent-search history
//! - The query coordinator ([`WeatherApp`]) and its state
//! - Terminal rendering of that state
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod app;
pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod provider;
pub mod render;

pub use app::{AppState, LookupOutcome, WeatherApp};
pub use config::Config;
pub use error::{ProviderError, QueryError};
pub use history::SearchHistory;
pub use model::{ForecastEntry, Theme, WeatherSnapshot};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use render::{RenderOptions, render};
