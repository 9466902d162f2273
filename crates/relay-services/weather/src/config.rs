//! Weather service settings, read from the `[weather]` section.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Settings for [`WeatherService`](crate::WeatherService).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// API key for the conditions, alerts and forecast endpoints. Required.
    #[serde(default, deserialize_with = "text_or_number")]
    pub api_key: Option<String>,

    /// Location autocomplete endpoint.
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Base URL of the weather data API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Maximum number of forecast periods sent after the header.
    #[serde(default = "default_forecast_days", deserialize_with = "number_or_text")]
    pub forecast_days: usize,

    /// Maximum number of characters of an alert message.
    #[serde(
        default = "default_alert_message_limit",
        deserialize_with = "number_or_text"
    )]
    pub alert_message_limit: usize,
}

impl WeatherConfig {
    /// Default settings with `api_key` set.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            search_url: default_search_url(),
            api_url: default_api_url(),
            forecast_days: default_forecast_days(),
            alert_message_limit: default_alert_message_limit(),
        }
    }
}

fn default_search_url() -> String {
    "http://autocomplete.wunderground.com/aq".to_string()
}

fn default_api_url() -> String {
    "http://api.wunderground.com/api".to_string()
}

fn default_forecast_days() -> usize {
    7
}

fn default_alert_message_limit() -> usize {
    600
}

/// Settings from environment variables arrive as text; files may use numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(u64),
    Text(String),
}

fn number_or_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    match Scalar::deserialize(deserializer)? {
        Scalar::Number(n) => usize::try_from(n).map_err(de::Error::custom),
        Scalar::Text(text) => text
            .trim()
            .parse()
            .map_err(|e| de::Error::custom(format!("expected a number, got {text:?}: {e}"))),
    }
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|value| match value {
        Scalar::Number(n) => n.to_string(),
        Scalar::Text(text) => text,
    }))
}
