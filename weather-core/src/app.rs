//! Query coordination and application state.
//!
//! [`WeatherApp`] owns the [`AppState`] and is the only thing that mutates
//! it. A lookup cycle fetches current conditions and then the forecast for
//! one city; the pair is applied together only when both calls succeed.
//!
//! Lookups may overlap. Each one takes a sequence number when it starts and
//! its result is applied only if no later-numbered lookup has completed
//! before it, so the most recently started lookup always wins.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::{
    error::{ProviderError, QueryError},
    history::SearchHistory,
    model::{ForecastEntry, Theme, WeatherSnapshot, downsample_daily},
    provider::WeatherProvider,
};

/// Everything the presentation layer needs to draw the screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub weather: Option<WeatherSnapshot>,
    /// Daily forecast, already downsampled.
    pub forecast: Option<Vec<ForecastEntry>>,
    pub history: SearchHistory,
    pub error: Option<QueryError>,
    pub busy: bool,
    pub theme: Theme,
}

/// What happened to a call to [`WeatherApp::lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Blank input, or nothing to refresh; no request was made.
    Skipped,
    /// Weather and forecast were replaced.
    Applied,
    /// The cycle failed and its error is now shown.
    Failed(QueryError),
    /// A newer lookup finished first; this result was dropped.
    Superseded,
}

#[derive(Debug, Default)]
struct Shared {
    state: AppState,
    /// Highest sequence number handed out.
    issued: u64,
    /// Highest sequence number whose result was applied.
    completed: u64,
}

#[derive(Debug, Clone)]
pub struct WeatherApp {
    provider: Arc<dyn WeatherProvider>,
    shared: Arc<Mutex<Shared>>,
    default_city: String,
}

impl WeatherApp {
    pub fn new(provider: Arc<dyn WeatherProvider>, default_city: impl Into<String>) -> Self {
        Self {
            provider,
            shared: Arc::new(Mutex::new(Shared::default())),
            default_city: default_city.into(),
        }
    }

    /// Copy of the current state.
    pub fn state(&self) -> AppState {
        self.lock().state.clone()
    }

    /// Look up the configured default city.
    pub async fn startup(&self) -> LookupOutcome {
        let city = self.default_city.clone();
        self.lookup(&city).await
    }

    /// Run one lookup cycle for `city`.
    pub async fn lookup(&self, city: &str) -> LookupOutcome {
        let city = city.trim();
        if city.is_empty() {
            return LookupOutcome::Skipped;
        }

        let seq = self.begin();
        debug!(seq, city, "lookup started");

        let result = self.fetch_cycle(city).await;
        self.finish(seq, city, result)
    }

    /// Re-run the lookup for the location currently displayed.
    pub async fn refresh(&self) -> LookupOutcome {
        let name = self.lock().state.weather.as_ref().map(|w| w.location_name.clone());
        match name {
            Some(name) => self.lookup(&name).await,
            None => LookupOutcome::Skipped,
        }
    }

    /// Re-run the lookup for a recent search.
    pub async fn select_history(&self, index: usize) -> LookupOutcome {
        let city = self.lock().state.history.get(index).map(str::to_string);
        match city {
            Some(city) => self.lookup(&city).await,
            None => LookupOutcome::Skipped,
        }
    }

    pub fn dismiss_error(&self) {
        self.lock().state.error = None;
    }

    pub fn toggle_theme(&self) -> Theme {
        let mut shared = self.lock();
        shared.state.theme = shared.state.theme.toggled();
        shared.state.theme
    }

    async fn fetch_cycle(
        &self,
        city: &str,
    ) -> Result<(WeatherSnapshot, Vec<ForecastEntry>), QueryError> {
        let snapshot = self
            .provider
            .current(city)
            .await
            .map_err(|e| provider_failure(city, "current", e))?;
        let forecast = self
            .provider
            .forecast(city)
            .await
            .map_err(|e| provider_failure(city, "forecast", e))?;
        Ok((snapshot, downsample_daily(forecast)))
    }

    fn begin(&self) -> u64 {
        let mut shared = self.lock();
        shared.issued += 1;
        shared.state.busy = true;
        shared.state.error = None;
        shared.issued
    }

    fn finish(
        &self,
        seq: u64,
        city: &str,
        result: Result<(WeatherSnapshot, Vec<ForecastEntry>), QueryError>,
    ) -> LookupOutcome {
        let mut shared = self.lock();

        if seq <= shared.completed {
            debug!(seq, completed = shared.completed, city, "discarding stale lookup result");
            return LookupOutcome::Superseded;
        }

        shared.completed = seq;
        shared.state.busy = shared.completed < shared.issued;

        match result {
            Ok((snapshot, forecast)) => {
                info!(seq, city, location = %snapshot.location_name, "lookup applied");
                // an older lookup may have failed after this one started
                shared.state.error = None;
                shared.state.weather = Some(snapshot);
                shared.state.forecast = Some(forecast);
                shared.state.history.push(city);
                LookupOutcome::Applied
            }
            Err(err) => {
                debug!(seq, city, error = %err, "lookup failed");
                shared.state.error = Some(err.clone());
                LookupOutcome::Failed(err)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn provider_failure(city: &str, stage: &'static str, err: ProviderError) -> QueryError {
    warn!(city, stage, status = err.status_code(), error = %err, "provider call failed");
    err.into()
}
