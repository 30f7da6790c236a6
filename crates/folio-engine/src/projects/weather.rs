use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use folio_contracts::console::{format_plain, ConsoleExt};
use folio_contracts::projects::RenderContext;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;

use crate::charts::bar_chart;

use super::{publish_chart, Project};

const NAMESPACE: &str = Project::Weather.slug();
const REQUEST_TIMEOUT_S: u64 = 10;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeatherReport {
    pub name: String,
    pub main: MainReadings,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Condition {
    pub description: String,
}

impl WeatherReport {
    /// First condition with its first letter upper-cased and the rest lowered.
    pub fn condition(&self) -> String {
        let Some(first) = self.weather.first() else {
            return String::new();
        };
        let mut chars = first.description.chars();
        match chars.next() {
            Some(head) => head.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
            None => String::new(),
        }
    }
}

/// Turns an HTTP status and body into a report, or into an
/// `Error {status}: {message}` error for anything but 200.
pub fn parse_weather_response(status: u16, body: &str) -> Result<WeatherReport> {
    if status != 200 {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|payload| payload.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(anyhow!("Error {status}: {message}"));
    }
    serde_json::from_str(body).context("failed parsing weather response")
}

pub struct WeatherClient {
    http: HttpClient,
    api_base: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            api_base: api_base.into(),
            api_key: api_key.into(),
        }
    }

    pub fn current(&self, city: &str, country: &str) -> Result<WeatherReport> {
        let location = format!("{city},{country}");
        let response = self
            .http
            .get(&self.api_base)
            .query(&[
                ("q", location.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", "en"),
            ])
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_S))
            .send()
            .with_context(|| format!("weather request failed ({})", self.api_base))?;
        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        parse_weather_response(status, &body)
    }
}

pub(super) fn show(ctx: &mut RenderContext<'_>) -> Result<()> {
    ctx.console.title("Weather Forecast")?;

    let city = ctx.console.text_input("Enter the city name", "")?;
    let country = ctx.console.text_input(
        "Enter the country code (e.g., 'us' for the United States)",
        "",
    )?;
    if !ctx.console.button("Search")? {
        return Ok(());
    }

    let Some(api_key) = ctx.settings.weather.api_key.clone() else {
        return ctx
            .console
            .error("Missing API key. Set OPENWEATHER_API_KEY or API_KEY.");
    };
    let client = WeatherClient::new(ctx.settings.weather.api_base.clone(), api_key);
    let report = match client.current(&city, &country) {
        Ok(report) => report,
        Err(err) => return ctx.console.error(&format!("{err:#}")),
    };

    ctx.console.subheader(&format!(
        "Weather in {}, {}",
        report.name,
        country.to_uppercase()
    ))?;
    let readings = &report.main;
    ctx.console
        .metric("Current Temperature", &format!("{}°C", format_plain(readings.temp)))?;
    ctx.console
        .metric("Minimum Temperature", &format!("{}°C", format_plain(readings.temp_min)))?;
    ctx.console
        .metric("Maximum Temperature", &format!("{}°C", format_plain(readings.temp_max)))?;
    ctx.console
        .metric("Humidity", &format!("{}%", format_plain(readings.humidity)))?;
    ctx.console
        .write(&format!("Condition: {}", report.condition()))?;

    let values = [
        readings.temp,
        readings.temp_min,
        readings.temp_max,
        readings.humidity,
    ];
    publish_chart(
        ctx,
        NAMESPACE,
        "weather_metrics.png",
        "Weather Metrics (Current Temperature, Min Temp, Max Temp, Humidity)",
        |path| bar_chart(path, &values),
    )
}
