use std::env;
use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUT_DIR: &str = "out";
pub const DEFAULT_WEATHER_API_BASE: &str = "http://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherSettings {
    pub api_key: Option<String>,
    pub api_base: String,
}

impl WeatherSettings {
    pub fn from_env() -> Self {
        Self {
            api_key: non_empty_env("OPENWEATHER_API_KEY").or_else(|| non_empty_env("API_KEY")),
            api_base: non_empty_env("OPENWEATHER_API_BASE")
                .map(|value| value.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_WEATHER_API_BASE.to_string()),
        }
    }
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_WEATHER_API_BASE.to_string(),
        }
    }
}

/// Process-wide settings shared read-only with every routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
    pub weather: WeatherSettings,
}

impl Settings {
    pub fn new(data_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            out_dir: out_dir.into(),
            weather: WeatherSettings::default(),
        }
    }

    pub fn from_env(data_dir: Option<PathBuf>, out_dir: Option<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            out_dir: out_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR)),
            weather: WeatherSettings::from_env(),
        }
    }

    pub fn data_file(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Directory where a project writes its chart files.
    pub fn chart_dir(&self, project_slug: &str) -> PathBuf {
        self.out_dir.join("charts").join(project_slug)
    }

    pub fn events_path(&self) -> PathBuf {
        self.out_dir.join("events.jsonl")
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR, DEFAULT_OUT_DIR)
    }
}

pub fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
