use serde::{Deserialize, Serialize};

/// Number of 3-hour forecast records per calendar day.
pub const RECORDS_PER_DAY: usize = 8;

/// Maximum number of daily forecast entries kept for display.
pub const FORECAST_DAYS: usize = 5;

/// Current conditions for one location, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub country_code: String,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_ms: f64,
    pub condition_icon: String,
    pub condition_description: String,
}

/// One forecast record. The provider emits one per 3-hour interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp_unix: i64,
    pub temperature_c: f64,
    pub condition_icon: String,
    pub condition_description: String,
}

/// Keep one record per day: every 8th record starting at the first, at most 5.
pub fn downsample_daily(entries: Vec<ForecastEntry>) -> Vec<ForecastEntry> {
    entries
        .into_iter()
        .step_by(RECORDS_PER_DAY)
        .take(FORECAST_DAYS)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ts: i64) -> ForecastEntry {
        ForecastEntry {
            timestamp_unix: ts,
            temperature_c: 10.0,
            condition_icon: "01d".into(),
            condition_description: "clear sky".into(),
        }
    }

    #[test]
    fn downsample_keeps_one_record_per_day() {
        let entries: Vec<_> = (0..40).map(entry).collect();

        let daily = downsample_daily(entries);

        let picked: Vec<i64> = daily.iter().map(|e| e.timestamp_unix).collect();
        assert_eq!(picked, vec![0, 8, 16, 24, 32]);
    }

    #[test]
    fn downsample_caps_at_five_days() {
        let entries: Vec<_> = (0..60).map(entry).collect();
        assert_eq!(downsample_daily(entries).len(), FORECAST_DAYS);
    }

    #[test]
    fn downsample_short_list() {
        let entries: Vec<_> = (0..10).map(entry).collect();
        let picked: Vec<i64> = downsample_daily(entries).iter().map(|e| e.timestamp_unix).collect();
        assert_eq!(picked, vec![0, 8]);

        assert!(downsample_daily(Vec::new()).is_empty());
    }

    #[test]
    fn theme_toggles_back_and_forth() {
        let theme = Theme::default();
        assert_eq!(theme, Theme::Light);
        assert_eq!(theme.toggled(), Theme::Dark);
        assert_eq!(theme.toggled().toggled(), Theme::Light);
    }
}
