//! Plain-text rendering of [`AppState`] for a terminal.

use std::fmt;

use chrono::{DateTime, NaiveDate};

use crate::{
    app::AppState,
    config::DEFAULT_ICON_BASE_URL,
    model::{ForecastEntry, Theme, WeatherSnapshot},
};

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub icon_base_url: String,
    /// Emit ANSI colours for the active theme.
    pub color: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { icon_base_url: DEFAULT_ICON_BASE_URL.to_string(), color: true }
    }
}

impl RenderOptions {
    pub fn icon_url(&self, icon: &str) -> String {
        format!("{}/{icon}@2x.png", self.icon_base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Copy)]
struct Palette {
    accent: &'static str,
    error: &'static str,
    muted: &'static str,
    reset: &'static str,
}

impl Palette {
    const PLAIN: Palette = Palette { accent: "", error: "", muted: "", reset: "" };

    fn for_theme(theme: Theme, color: bool) -> Self {
        if !color {
            return Self::PLAIN;
        }
        match theme {
            Theme::Light => Palette {
                accent: "\x1b[34m",
                error: "\x1b[31m",
                muted: "\x1b[90m",
                reset: "\x1b[0m",
            },
            Theme::Dark => Palette {
                accent: "\x1b[96m",
                error: "\x1b[91m",
                muted: "\x1b[37m",
                reset: "\x1b[0m",
            },
        }
    }
}

/// Render the whole screen. `today` is the date shown on the weather card.
pub fn render(state: &AppState, today: NaiveDate, options: &RenderOptions) -> String {
    Screen { state, today, options, p: Palette::for_theme(state.theme, options.color) }
        .to_string()
}

struct Screen<'a> {
    state: &'a AppState,
    today: NaiveDate,
    options: &'a RenderOptions,
    p: Palette,
}

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { state, p, .. } = self;

        let mode = match state.theme {
            Theme::Light => "dark mode: :theme",
            Theme::Dark => "light mode: :theme",
        };
        writeln!(f, "{}Weather App{}  {}({mode}){}", p.accent, p.reset, p.muted, p.reset)?;

        if !state.history.is_empty() {
            write!(f, "Recent Searches:")?;
            for (i, city) in state.history.entries().iter().enumerate() {
                write!(f, "  [{}] {city}", i + 1)?;
            }
            writeln!(f)?;
        }

        if state.busy {
            writeln!(f, "{}Loading...{}", p.muted, p.reset)?;
        } else if let Some(err) = &state.error {
            writeln!(f, "{}Error: {err}{}  (:dismiss to close)", p.error, p.reset)?;
        }

        if let Some(weather) = &state.weather {
            writeln!(f)?;
            self.current(f, weather)?;
        }

        if let Some(forecast) = state.forecast.as_deref().filter(|list| !list.is_empty()) {
            writeln!(f)?;
            self.forecast(f, forecast)?;
        }

        Ok(())
    }
}

impl Screen<'_> {
    fn current(&self, f: &mut fmt::Formatter<'_>, weather: &WeatherSnapshot) -> fmt::Result {
        let p = &self.p;

        writeln!(f, "{}{}, {}{}", p.accent, weather.location_name, weather.country_code, p.reset)?;
        writeln!(f, "{}", format_long_date(self.today))?;
        writeln!(
            f,
            "  {}°C  {}",
            round_temp(weather.temperature_c),
            weather.condition_description
        )?;
        if !weather.condition_icon.is_empty() {
            let icon = self.options.icon_url(&weather.condition_icon);
            writeln!(f, "  {}{icon}{}", p.muted, p.reset)?;
        }
        writeln!(f, "  Humidity    {}%", weather.humidity_pct)?;
        writeln!(f, "  Wind Speed  {} m/s", weather.wind_speed_ms)
    }

    fn forecast(&self, f: &mut fmt::Formatter<'_>, forecast: &[ForecastEntry]) -> fmt::Result {
        let p = &self.p;
        writeln!(f, "{}Weather Forecast{}", p.accent, p.reset)?;

        let days: Vec<String> =
            forecast.iter().map(|e| format!("{:<6}", short_weekday(e.timestamp_unix))).collect();
        let temps: Vec<String> = forecast
            .iter()
            .map(|e| {
                let temp = format!("{}°C", round_temp(e.temperature_c));
                format!("{temp:<6}")
            })
            .collect();

        writeln!(f, "  {}", days.concat().trim_end())?;
        writeln!(f, "  {}", temps.concat().trim_end())?;

        for entry in forecast {
            let day = short_weekday(entry.timestamp_unix);
            write!(f, "  {}{day}  {}", p.muted, entry.condition_description)?;
            if !entry.condition_icon.is_empty() {
                write!(f, "  {}", self.options.icon_url(&entry.condition_icon))?;
            }
            writeln!(f, "{}", p.reset)?;
        }
        Ok(())
    }
}

/// e.g. "Monday, January 15, 2024".
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Short weekday of a UNIX timestamp (UTC), e.g. "Tue".
pub fn short_weekday(timestamp_unix: i64) -> String {
    DateTime::from_timestamp(timestamp_unix, 0)
        .map(|dt| dt.format("%a").to_string())
        .unwrap_or_else(|| "?".to_string())
}

/// Nearest whole degree, halves rounded away from zero.
pub fn round_temp(celsius: f64) -> i64 {
    celsius.round() as i64
}
