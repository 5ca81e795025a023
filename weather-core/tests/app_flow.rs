//! Lookup cycles driven through `WeatherApp` with a scripted provider.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tokio::sync::oneshot;
use weather_core::{
    ForecastEntry, LookupOutcome, ProviderError, QueryError, Theme, WeatherApp, WeatherProvider,
    WeatherSnapshot,
};

/// Answers for any city except the ones marked unknown; records every call.
#[derive(Debug, Default)]
struct ScriptedProvider {
    unknown: Mutex<HashSet<String>>,
    broken_forecast: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn unknown_city(&self, city: &str) {
        self.unknown.lock().unwrap().insert(city.to_lowercase());
    }

    fn break_forecast(&self, city: &str) {
        self.broken_forecast.lock().unwrap().insert(city.to_lowercase());
    }

    /// Hold the next current-conditions call for `city` until the sender fires.
    fn gate(&self, city: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(city.to_lowercase(), rx);
        tx
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn snapshot_for(city: &str) -> WeatherSnapshot {
    WeatherSnapshot {
        location_name: city.to_string(),
        country_code: "XX".into(),
        temperature_c: 20.0,
        humidity_pct: 50,
        wind_speed_ms: 3.5,
        condition_icon: "01d".into(),
        condition_description: format!("clear over {city}"),
    }
}

#[async_trait]
impl WeatherProvider for ScriptedProvider {
    async fn current(&self, city: &str) -> Result<WeatherSnapshot, ProviderError> {
        self.calls.lock().unwrap().push(format!("current:{city}"));

        let gate = self.gates.lock().unwrap().remove(&city.to_lowercase());
        if let Some(rx) = gate {
            let _ = rx.await;
        }

        if self.unknown.lock().unwrap().contains(&city.to_lowercase()) {
            return Err(ProviderError::Api { code: 404, message: "city not found".into() });
        }
        Ok(snapshot_for(city))
    }

    async fn forecast(&self, city: &str) -> Result<Vec<ForecastEntry>, ProviderError> {
        self.calls.lock().unwrap().push(format!("forecast:{city}"));

        if self.broken_forecast.lock().unwrap().contains(&city.to_lowercase()) {
            return Err(ProviderError::Malformed("missing field `list`".into()));
        }

        Ok((0..40)
            .map(|i| ForecastEntry {
                timestamp_unix: 1_705_320_000 + i * 10_800,
                temperature_c: i as f64,
                condition_icon: "02d".into(),
                condition_description: format!("{city} record {i}"),
            })
            .collect())
    }
}

fn app_with(provider: &Arc<ScriptedProvider>) -> WeatherApp {
    WeatherApp::new(provider.clone(), "Bhubaneswar")
}

#[tokio::test]
async fn successful_lookup_populates_state() {
    let provider = Arc::new(ScriptedProvider::default());
    let app = app_with(&provider);

    let outcome = app.lookup("London").await;

    assert_eq!(outcome, LookupOutcome::Applied);
    let state = app.state();
    assert_eq!(state.weather.as_ref().unwrap().location_name, "London");
    assert_eq!(state.history.entries(), ["London"]);
    assert!(state.error.is_none());
    assert!(!state.busy);

    let forecast = state.forecast.unwrap();
    let picked: Vec<i64> = forecast.iter().map(|e| (e.timestamp_unix - 1_705_320_000) / 10_800).collect();
    assert_eq!(picked, vec![0, 8, 16, 24, 32]);

    assert_eq!(provider.calls(), ["current:London", "forecast:London"]);
}

#[tokio::test]
async fn blank_input_changes_nothing_and_sends_nothing() {
    let provider = Arc::new(ScriptedProvider::default());
    let app = app_with(&provider);
    app.lookup("Paris").await;
    provider.unknown_city("Nowhere");
    app.lookup("Nowhere").await;
    let before = app.state();

    assert_eq!(app.lookup("").await, LookupOutcome::Skipped);
    assert_eq!(app.lookup("   \t").await, LookupOutcome::Skipped);

    assert_eq!(app.state(), before);
    assert_eq!(provider.calls().len(), 3);
}

#[tokio::test]
async fn unknown_city_keeps_previous_result() {
    let provider = Arc::new(ScriptedProvider::default());
    provider.unknown_city("Zzzznotacity");
    let app = app_with(&provider);
    app.lookup("London").await;

    let outcome = app.lookup("Zzzznotacity").await;

    assert_eq!(outcome, LookupOutcome::Failed(QueryError::new("city not found")));
    let state = app.state();
    assert_eq!(state.error.as_ref().map(QueryError::message), Some("city not found"));
    assert_eq!(state.weather.as_ref().unwrap().location_name, "London");
    assert_eq!(state.history.entries(), ["London"]);
    assert!(!state.busy);
    // forecast is never requested after current conditions fail
    assert!(!provider.calls().contains(&"forecast:Zzzznotacity".to_string()));
}

#[tokio::test]
async fn forecast_failure_is_reported_and_applies_nothing() {
    let provider = Arc::new(ScriptedProvider::default());
    provider.break_forecast("Oslo");
    let app = app_with(&provider);
    app.lookup("London").await;

    let outcome = app.lookup("Oslo").await;

    assert!(matches!(outcome, LookupOutcome::Failed(_)));
    let state = app.state();
    assert!(state.error.unwrap().message().contains("missing field `list`"));
    assert_eq!(state.weather.unwrap().location_name, "London");
    assert_eq!(state.forecast.unwrap()[0].condition_description, "London record 0");
    assert_eq!(state.history.entries(), ["London"]);
}

#[tokio::test]
async fn next_successful_lookup_clears_error() {
    let provider = Arc::new(ScriptedProvider::default());
    provider.unknown_city("Atlantis");
    let app = app_with(&provider);

    app.lookup("Atlantis").await;
    assert!(app.state().error.is_some());

    app.lookup("Lima").await;
    assert!(app.state().error.is_none());
}

#[tokio::test]
async fn dismiss_error_does_not_retry() {
    let provider = Arc::new(ScriptedProvider::default());
    provider.unknown_city("Atlantis");
    let app = app_with(&provider);
    app.lookup("Atlantis").await;

    app.dismiss_error();

    assert!(app.state().error.is_none());
    assert_eq!(provider.calls(), ["current:Atlantis"]);
}

#[tokio::test]
async fn history_dedups_case_insensitively_and_caps_at_five() {
    let provider = Arc::new(ScriptedProvider::default());
    let app = app_with(&provider);

    app.lookup("Paris").await;
    app.lookup("paris").await;
    assert_eq!(app.state().history.entries(), ["paris"]);

    for city in ["Rome", "Oslo", "Lima", "Kyiv", "Baku", "Doha"] {
        app.lookup(city).await;
    }
    assert_eq!(app.state().history.entries(), ["Doha", "Baku", "Kyiv", "Lima", "Oslo"]);

    app.lookup("lima").await;
    assert_eq!(app.state().history.entries(), ["lima", "Doha", "Baku", "Kyiv", "Oslo"]);
}

#[tokio::test]
async fn refresh_and_history_selection_rerun_lookups() {
    let provider = Arc::new(ScriptedProvider::default());
    let app = app_with(&provider);

    assert_eq!(app.refresh().await, LookupOutcome::Skipped);
    assert_eq!(app.select_history(0).await, LookupOutcome::Skipped);

    app.lookup("Paris").await;
    app.lookup("Rome").await;

    assert_eq!(app.refresh().await, LookupOutcome::Applied);
    assert_eq!(app.state().weather.unwrap().location_name, "Rome");

    assert_eq!(app.select_history(1).await, LookupOutcome::Applied);
    let state = app.state();
    assert_eq!(state.weather.unwrap().location_name, "Paris");
    assert_eq!(state.history.entries(), ["Paris", "Rome"]);

    assert_eq!(app.select_history(7).await, LookupOutcome::Skipped);
}

#[tokio::test]
async fn startup_looks_up_default_city() {
    let provider = Arc::new(ScriptedProvider::default());
    let app = app_with(&provider);

    assert_eq!(app.startup().await, LookupOutcome::Applied);
    assert_eq!(app.state().history.entries(), ["Bhubaneswar"]);
}

#[tokio::test]
async fn toggle_theme_flips() {
    let provider = Arc::new(ScriptedProvider::default());
    let app = app_with(&provider);

    assert_eq!(app.state().theme, Theme::Light);
    assert_eq!(app.toggle_theme(), Theme::Dark);
    assert_eq!(app.toggle_theme(), Theme::Light);
}

#[tokio::test]
async fn older_lookup_finishing_last_is_discarded() {
    let provider = Arc::new(ScriptedProvider::default());
    let app = app_with(&provider);
    let release_paris = provider.gate("Paris");

    let slow = app.lookup("Paris");
    let fast = async {
        let outcome = app.lookup("Rome").await;
        let _ = release_paris.send(());
        outcome
    };
    let (slow_outcome, fast_outcome) = tokio::join!(slow, fast);

    assert_eq!(fast_outcome, LookupOutcome::Applied);
    assert_eq!(slow_outcome, LookupOutcome::Superseded);

    let state = app.state();
    assert_eq!(state.weather.unwrap().location_name, "Rome");
    assert_eq!(state.history.entries(), ["Rome"]);
    assert!(!state.busy);
}

#[tokio::test]
async fn busy_stays_set_until_latest_lookup_finishes() {
    let provider = Arc::new(ScriptedProvider::default());
    let app = app_with(&provider);
    let release_paris = provider.gate("Paris");
    let release_rome = provider.gate("Rome");

    let driver = async {
        while provider.calls().len() < 2 {
            tokio::task::yield_now().await;
        }
        let _ = release_paris.send(());
        while app.state().weather.is_none() {
            tokio::task::yield_now().await;
        }

        let mid = app.state();
        assert_eq!(mid.weather.as_ref().unwrap().location_name, "Paris");
        assert!(mid.busy, "the newer lookup is still in flight");

        let _ = release_rome.send(());
    };

    let (first, second, ()) = tokio::join!(app.lookup("Paris"), app.lookup("Rome"), driver);

    assert_eq!(first, LookupOutcome::Applied);
    assert_eq!(second, LookupOutcome::Applied);
    let state = app.state();
    assert_eq!(state.weather.unwrap().location_name, "Rome");
    assert_eq!(state.history.entries(), ["Rome", "Paris"]);
    assert!(!state.busy);
}

#[tokio::test]
async fn older_failure_landing_first_is_cleared_by_newer_success() {
    let provider = Arc::new(ScriptedProvider::default());
    provider.unknown_city("Atlantis");
    let app = app_with(&provider);
    let release_atlantis = provider.gate("Atlantis");
    let release_rome = provider.gate("Rome");

    let driver = async {
        while provider.calls().len() < 2 {
            tokio::task::yield_now().await;
        }
        let _ = release_atlantis.send(());
        while app.state().error.is_none() {
            tokio::task::yield_now().await;
        }
        let _ = release_rome.send(());
    };

    let (first, second, ()) = tokio::join!(app.lookup("Atlantis"), app.lookup("Rome"), driver);

    assert_eq!(first, LookupOutcome::Failed(QueryError::new("city not found")));
    assert_eq!(second, LookupOutcome::Applied);
    let state = app.state();
    assert_eq!(state.weather.unwrap().location_name, "Rome");
    assert!(state.error.is_none(), "error from the older lookup still shown: {:?}", state.error);
    assert!(!state.busy);
}
