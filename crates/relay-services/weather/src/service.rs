//! Weather command handlers.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use relay_core::{BoxedFetch, FetchOutcome, FetchRequest};
use relay_framework::{Captures, HandlerError, HandlerResult, RegistryBuilder, Responder};

use crate::config::WeatherConfig;
use crate::document;
use crate::error::ServiceError;
use crate::filters::{LOCATION, WeatherFilter};

pub(crate) const UNKNOWN_LOCATION: &str = "Unknown location.";
pub(crate) const NO_ALERTS: &str = "No alerts.";

const HELP_TEXT: &str = "\
Relay Weather:
All commands are direct messages with the bot
weather <zip or city> - current weather conditions
weather alerts <zip or city> - current advisories and alerts
forecast <zip or city> - forecast for the next few days";

/// A location resolved by the autocomplete endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Query path for the data API, e.g. `/q/zmw:97201.1.99999`.
    pub query: String,
    /// Display name.
    pub name: String,
}

/// Answers weather commands from a provider reached through [`Fetch`](relay_core::Fetch).
pub struct WeatherService {
    config: WeatherConfig,
    api_key: String,
    fetch: BoxedFetch,
}

impl std::fmt::Debug for WeatherService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherService")
            .field("api_url", &self.config.api_url)
            .field("search_url", &self.config.search_url)
            .finish_non_exhaustive()
    }
}

impl WeatherService {
    /// Validates `config` and creates the service.
    ///
    /// Fails if no API key is configured. URL shapes are checked when the
    /// configuration is loaded.
    pub fn new(config: WeatherConfig, fetch: BoxedFetch) -> Result<Self, ServiceError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ServiceError::MissingCredential("weather.api_key"))?
            .to_string();

        if config.forecast_days == 0 {
            return Err(ServiceError::invalid("weather.forecast_days", "must be at least 1"));
        }

        Ok(Self {
            config,
            api_key,
            fetch,
        })
    }

    /// The active settings.
    pub fn config(&self) -> &WeatherConfig {
        &self.config
    }

    /// Registers every weather filter with its handler.
    pub fn register(self: Arc<Self>, builder: RegistryBuilder) -> RegistryBuilder {
        let alerts = Arc::clone(&self);
        let current = Arc::clone(&self);
        let forecast = self;

        builder
            .route(
                WeatherFilter::Alerts.spec(),
                move |captures: Captures, responder: Responder| {
                    let service = Arc::clone(&alerts);
                    async move {
                        service
                            .weather_alerts(captures.require(LOCATION)?, &responder)
                            .await
                    }
                },
            )
            .route(
                WeatherFilter::Current.spec(),
                move |captures: Captures, responder: Responder| {
                    let service = Arc::clone(&current);
                    async move {
                        service
                            .current_weather(captures.require(LOCATION)?, &responder)
                            .await
                    }
                },
            )
            .route(
                WeatherFilter::Forecast.spec(),
                move |captures: Captures, responder: Responder| {
                    let service = Arc::clone(&forecast);
                    async move {
                        service
                            .forecast(captures.require(LOCATION)?, &responder)
                            .await
                    }
                },
            )
            .route(WeatherFilter::Help.spec(), help)
    }

    /// Resolves free-form text to a location.
    ///
    /// `Ok(None)` when the provider knows no such place.
    pub async fn lookup_location(&self, query: &str) -> Result<Option<Location>, HandlerError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let request = FetchRequest::get(&self.config.search_url).query("query", query);
        let Some(doc) = document_of(self.fetch.fetch(&request).await)? else {
            return Ok(None);
        };
        let Some(first) = document::list(&doc, "/RESULTS").and_then(<[Value]>::first) else {
            debug!(query, "Location search returned no results");
            return Ok(None);
        };

        Ok(Some(Location {
            query: document::text(first, "/l")?.to_string(),
            name: document::text(first, "/name")?.to_string(),
        }))
    }

    fn data_url(&self, feature: &str, location: &Location) -> String {
        format!(
            "{}/{}/{}{}.json",
            self.config.api_url.trim_end_matches('/'),
            self.api_key,
            feature,
            location.query
        )
    }

    async fn fetch_data(
        &self,
        feature: &str,
        location: &Location,
    ) -> Result<Option<Value>, HandlerError> {
        let url = self.data_url(feature, location);
        let doc = document_of(self.fetch.fetch(&FetchRequest::get(url)).await)?;
        if doc.is_none() {
            debug!(feature, location = %location.name, "Provider has no data");
        }
        Ok(doc)
    }

    /// Resolves `query`, or tells the user it is unknown.
    async fn resolve(
        &self,
        query: &str,
        responder: &Responder,
    ) -> Result<Option<Location>, HandlerError> {
        let location = self.lookup_location(query).await?;
        if location.is_none() {
            responder.send(UNKNOWN_LOCATION).await?;
        }
        Ok(location)
    }

    /// Sends one line describing current conditions.
    #[instrument(level = "debug", skip(self, responder))]
    pub async fn current_weather(&self, query: &str, responder: &Responder) -> HandlerResult {
        let Some(location) = self.resolve(query, responder).await? else {
            return Ok(());
        };
        let Some(doc) = self.fetch_data("conditions", &location).await? else {
            return Ok(());
        };

        responder.send(format_conditions(&doc)?).await?;
        Ok(())
    }

    /// Sends the most relevant alert, or [`NO_ALERTS`].
    #[instrument(level = "debug", skip(self, responder))]
    pub async fn weather_alerts(&self, query: &str, responder: &Responder) -> HandlerResult {
        let Some(location) = self.resolve(query, responder).await? else {
            return Ok(());
        };
        let doc = self.fetch_data("alerts", &location).await?;

        let top = doc
            .as_ref()
            .and_then(|doc| document::list(doc, "/alerts"))
            .and_then(<[Value]>::first);
        let line = match top {
            Some(alert) => format_alert(alert, self.config.alert_message_limit)?,
            None => NO_ALERTS.to_string(),
        };

        responder.send(line).await?;
        Ok(())
    }

    /// Sends a header line followed by up to `forecast_days` periods.
    #[instrument(level = "debug", skip(self, responder))]
    pub async fn forecast(&self, query: &str, responder: &Responder) -> HandlerResult {
        let Some(location) = self.resolve(query, responder).await? else {
            return Ok(());
        };
        let Some(doc) = self.fetch_data("forecast", &location).await? else {
            return Ok(());
        };

        let days = document::list(&doc, "/forecast/txt_forecast/forecastday")
            .ok_or_else(|| HandlerError::malformed("forecast has no forecastday list"))?;
        let lines = days
            .iter()
            .take(self.config.forecast_days)
            .map(|day| -> Result<String, HandlerError> {
                Ok(format!(
                    "{} - {}",
                    document::text(day, "/title")?,
                    document::text(day, "/fcttext")?
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        responder
            .send(format!("Here is your forecast for {}:", location.name))
            .await?;
        responder.send_all(lines).await?;
        Ok(())
    }
}

async fn help(responder: Responder) -> HandlerResult {
    responder.send_all(HELP_TEXT.lines()).await?;
    Ok(())
}

fn document_of(outcome: FetchOutcome) -> Result<Option<Value>, HandlerError> {
    match outcome {
        FetchOutcome::Found(doc) => Ok(Some(doc)),
        FetchOutcome::NotFound => Ok(None),
        FetchOutcome::TransientError(reason) => Err(HandlerError::fetch(reason)),
    }
}

fn format_conditions(doc: &Value) -> Result<String, HandlerError> {
    let field = |name: &str| document::text(doc, &format!("/current_observation/{name}"));
    Ok(format!(
        "{} is {} and {}; windchill is {}; winds are {}",
        field("display_location/full")?,
        field("temperature_string")?,
        field("weather")?,
        field("windchill_string")?,
        field("wind_string")?,
    ))
}

fn format_alert(alert: &Value, limit: usize) -> Result<String, HandlerError> {
    let message: String = document::text(alert, "/message")?
        .chars()
        .take(limit)
        .filter(|c| *c != '\n')
        .collect();
    Ok(format!("{} - {}", document::text(alert, "/description")?, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{BoxedTransport, InboundEvent, ReplyContext};
    use relay_framework::testing::{RecordingTransport, StaticFetch};
    use relay_framework::{Dispatcher, HandlerExecutor};
    use serde_json::json;

    const SEARCH: &str = "http://search.test/aq";
    const API: &str = "http://api.test/api";
    const PORTLAND: &str = "/q/zmw:97201.1.99999";

    fn config() -> WeatherConfig {
        WeatherConfig {
            search_url: SEARCH.into(),
            api_url: API.into(),
            ..WeatherConfig::with_api_key("KEY")
        }
    }

    fn data(feature: &str) -> String {
        format!("{API}/KEY/{feature}{PORTLAND}.json")
    }

    fn portland() -> StaticFetch {
        StaticFetch::new().found(
            SEARCH,
            json!({"RESULTS": [
                {"name": "Portland, Oregon", "l": PORTLAND},
                {"name": "Portland, Maine", "l": "/q/zmw:04101.1.99999"}
            ]}),
        )
    }

    fn service(fetch: StaticFetch) -> (Arc<WeatherService>, Arc<StaticFetch>) {
        let fetch = Arc::new(fetch);
        let service = WeatherService::new(config(), fetch.clone()).unwrap();
        (Arc::new(service), fetch)
    }

    fn responder() -> (Responder, Arc<RecordingTransport>) {
        let transport = RecordingTransport::new();
        let ctx = ReplyContext {
            sender_id: "alice".into(),
            conversation_id: "alice".into(),
        };
        (Responder::new(transport.clone(), ctx), transport)
    }

    fn dispatcher(service: Arc<WeatherService>) -> Dispatcher {
        let registry = service.register(RegistryBuilder::new()).build().unwrap();
        Dispatcher::new(Arc::new(registry))
    }

    /// Runs `event` through a registry holding only the weather service,
    /// dispatching to every matching filter.
    async fn run(service: Arc<WeatherService>, event: InboundEvent) -> Vec<String> {
        let dispatcher = dispatcher(service);
        let recording = RecordingTransport::new();
        let transport: BoxedTransport = recording.clone();
        let executor = HandlerExecutor::new();

        for dispatch in dispatcher.dispatch(&event) {
            executor
                .spawn_dispatch(dispatch, &event, &transport)
                .await
                .unwrap();
        }
        recording.texts()
    }

    #[tokio::test]
    async fn test_alerts_without_alerts_replies_once() {
        let (service, _) = service(portland().found(data("alerts"), json!({"alerts": []})));

        let texts = run(service, InboundEvent::direct("weather alerts Portland", "alice")).await;
        assert_eq!(texts, vec![NO_ALERTS.to_string()]);
    }

    #[test]
    fn test_alert_command_has_a_single_match() {
        let (service, _) = service(portland());
        let event = InboundEvent::direct("weather alerts Portland", "alice");

        let matches = dispatcher(service).match_event(&event);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].filter_name(), WeatherFilter::Alerts.name());
        assert_eq!(matches[0].captures().get(LOCATION), Some("Portland"));
    }

    #[tokio::test]
    async fn test_alert_command_does_not_report_conditions() {
        let conditions = json!({"current_observation": {
            "display_location": {"full": "Portland, OR"},
            "weather": "Rain",
            "temperature_string": "50 F (10 C)",
            "windchill_string": "NA",
            "wind_string": "Calm"
        }});
        let (service, fetch) = service(
            portland()
                .found(data("alerts"), json!({"alerts": []}))
                .found(data("conditions"), conditions),
        );

        let texts = run(service, InboundEvent::direct("weather alerts Portland", "alice")).await;
        assert_eq!(texts, vec![NO_ALERTS.to_string()]);
        assert!(fetch.requests().iter().all(|r| r.url != data("conditions")));
    }

    #[tokio::test]
    async fn test_alerts_not_found_replies_no_alerts() {
        let (service, _) = service(portland());
        let (responder, transport) = responder();

        tokio_test::assert_ok!(service.weather_alerts("Portland", &responder).await);
        assert_eq!(transport.texts(), vec![NO_ALERTS.to_string()]);
    }

    #[tokio::test]
    async fn test_alert_is_truncated_and_single_line() {
        let message = format!("Heat\nadvisory {}", "x".repeat(700));
        let (service, _) = service(portland().found(
            data("alerts"),
            json!({"alerts": [
                {"description": "Heat Advisory", "message": message},
                {"description": "Air Quality", "message": "ignored"}
            ]}),
        ));
        let (responder, transport) = responder();

        service.weather_alerts("Portland", &responder).await.unwrap();

        let texts = transport.texts();
        assert_eq!(texts.len(), 1);
        let expected_message: String = message.chars().take(600).filter(|c| *c != '\n').collect();
        assert_eq!(
            texts[0],
            format!("Heat Advisory - {expected_message}")
        );
        assert!(!texts[0].contains('\n'));
    }

    #[tokio::test]
    async fn test_transient_alert_failure_is_silent() {
        let (service, _) = service(portland().route(
            data("alerts"),
            FetchOutcome::TransientError("HTTP 503".into()),
        ));
        let (responder, transport) = responder();

        let err = service.weather_alerts("Portland", &responder).await.unwrap_err();
        assert!(matches!(err, HandlerError::Fetch(_)));
        assert!(transport.texts().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_location() {
        let (service, fetch) = service(StaticFetch::new().found(SEARCH, json!({"RESULTS": []})));
        let (responder, transport) = responder();

        service.current_weather("Atlantis", &responder).await.unwrap();
        assert_eq!(transport.texts(), vec![UNKNOWN_LOCATION.to_string()]);

        let requests = fetch.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query, vec![("query".to_string(), "Atlantis".to_string())]);
    }

    #[tokio::test]
    async fn test_current_weather() {
        let (service, fetch) = service(portland().found(
            data("conditions"),
            json!({"current_observation": {
                "display_location": {"full": "Portland, OR"},
                "weather": "Overcast",
                "temperature_string": "56.1 F (13.4 C)",
                "windchill_string": "NA",
                "wind_string": "Calm"
            }}),
        ));

        let texts = run(service, InboundEvent::direct("current weather for Portland", "alice")).await;
        assert_eq!(
            texts,
            vec![
                "Portland, OR is 56.1 F (13.4 C) and Overcast; windchill is NA; winds are Calm"
                    .to_string()
            ]
        );
        assert_eq!(fetch.requests()[1].url, data("conditions"));
    }

    #[tokio::test]
    async fn test_malformed_conditions_send_nothing() {
        let (service, _) = service(portland().found(
            data("conditions"),
            json!({"current_observation": {"weather": "Overcast"}}),
        ));
        let (responder, transport) = responder();

        let err = service.current_weather("Portland", &responder).await.unwrap_err();
        assert!(matches!(err, HandlerError::Malformed(_)));
        assert!(transport.texts().is_empty());
    }

    #[tokio::test]
    async fn test_forecast_is_limited() {
        let days: Vec<_> = (1..=10)
            .map(|n| json!({"title": format!("Day {n}"), "fcttext": format!("Text {n}")}))
            .collect();
        let (service, _) = service(portland().found(
            data("forecast"),
            json!({"forecast": {"txt_forecast": {"forecastday": days}}}),
        ));

        let texts = run(service, InboundEvent::direct("forecast Portland", "alice")).await;
        assert_eq!(texts.len(), 8);
        assert_eq!(texts[0], "Here is your forecast for Portland, Oregon:");
        assert_eq!(texts[1], "Day 1 - Text 1");
        assert_eq!(texts[7], "Day 7 - Text 7");
    }

    #[tokio::test]
    async fn test_public_messages_are_ignored() {
        let (service, fetch) = service(portland());

        let texts = run(
            service,
            InboundEvent::public("weather Portland", "alice", "#general"),
        )
        .await;
        assert!(texts.is_empty());
        assert!(fetch.requests().is_empty());
    }

    #[tokio::test]
    async fn test_help() {
        let (service, _) = service(StaticFetch::new());

        let texts = run(service, InboundEvent::direct("help weather", "alice")).await;
        assert_eq!(texts.len(), 5);
        assert_eq!(texts[0], "Relay Weather:");
        assert!(texts[4].starts_with("forecast <zip or city>"));
    }

    #[test]
    fn test_requires_api_key() {
        let fetch: BoxedFetch = Arc::new(StaticFetch::new());

        let err = WeatherService::new(WeatherConfig::default(), fetch.clone()).unwrap_err();
        assert!(matches!(err, ServiceError::MissingCredential("weather.api_key")));

        let blank = WeatherConfig::with_api_key("  ");
        assert!(WeatherService::new(blank, fetch.clone()).is_err());

        let no_days = WeatherConfig {
            forecast_days: 0,
            ..WeatherConfig::with_api_key("KEY")
        };
        assert!(matches!(
            WeatherService::new(no_days, fetch).unwrap_err(),
            ServiceError::InvalidSetting { field: "weather.forecast_days", .. }
        ));
    }
}
