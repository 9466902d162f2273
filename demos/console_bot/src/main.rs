//! Console Bot
//!
//! Runs the bundled services against stdin/stdout. Every input line is a
//! direct message from `--user`, except lines starting with `#channel`,
//! which are public messages in that channel:
//!
//! ```text
//! weather 97201
//! forecast Portland, OR
//! #links have you seen https://example.com/post
//! ```
//!
//! # Usage
//!
//! ```bash
//! RELAY_WEATHER__API_KEY=... cargo run --package console-bot -- --config demos/console_bot/relay.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use relay::linkscraper::{LinkScraperConfig, LinkScraperService};
use relay::prelude::*;
use relay::transport::{ConsoleTransport, HttpClient, HttpClientConfig, console};
use relay::weather::{WeatherConfig, WeatherService};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file; defaults to relay.toml in the current or user config directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Profile selecting relay.<profile>.toml
    #[arg(short, long)]
    profile: Option<String>,

    /// Sender id for console input
    #[arg(short, long, default_value = "console")]
    user: String,
}

fn load_config(args: &Args) -> Result<RelayConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(profile) = &args.profile {
        loader = loader.profile(profile);
    }
    loader = match &args.config {
        Some(path) => loader.file(path),
        None => loader.with_current_dir().with_user_config_dir(),
    };
    Ok(loader.load()?)
}

fn register_services(
    weather: WeatherConfig,
    links: LinkScraperConfig,
    http: HttpClient,
) -> Result<RegistryBuilder> {
    let weather = WeatherService::new(weather, Arc::new(http.clone()))
        .context("failed to start the weather service")?;
    let registry = Arc::new(weather).register(RegistryBuilder::new());
    Ok(Arc::new(LinkScraperService::new(links, Arc::new(http))).register(registry))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args).context("failed to load configuration")?;
    init_from_config(&config.logging);

    let http = HttpClient::with_config(HttpClientConfig {
        timeout: Duration::from_secs(config.http.timeout_secs),
        user_agent: config.http.user_agent.clone(),
    })?;

    // ========================================================================
    // Services
    // ========================================================================

    if !config.has_section("link_scraper") {
        warn!("No [link_scraper] section, links are only logged");
    }
    let registry = register_services(
        config.section::<WeatherConfig>("weather")?,
        config.section::<LinkScraperConfig>("link_scraper")?,
        http,
    )?;

    info!(filters = registry.filter_count(), "Services registered");

    // ========================================================================
    // Runtime
    // ========================================================================

    let runtime = RelayRuntime::builder()
        .dispatch_config(&config.dispatch)
        .registry(registry)
        .transport(Arc::new(ConsoleTransport::stdout()))
        .build()?;

    let (tx, rx) = mpsc::channel(64);
    let user = args.user.clone();
    tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        if let Err(e) = console::read_events(stdin, &user, tx).await {
            warn!(error = %e, "Console input failed");
        }
    });

    let stats = runtime.run(rx).await?;
    info!(
        received = stats.events_received,
        matched = stats.events_matched,
        invocations = stats.invocations,
        "Console bot stopped"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> RelayConfig {
        ConfigLoader::new()
            .without_env()
            .file(concat!(env!("CARGO_MANIFEST_DIR"), "/relay.toml"))
            .load()
            .unwrap()
    }

    #[tokio::test]
    async fn test_sample_config_runs_every_matching_service() {
        let config = sample_config();
        assert_eq!(config.dispatch.mode, DispatchMode::All);

        let registry = register_services(
            WeatherConfig::with_api_key("KEY"),
            config.section::<LinkScraperConfig>("link_scraper").unwrap(),
            HttpClient::new().unwrap(),
        )
        .unwrap();
        let runtime = RelayRuntime::builder()
            .dispatch_config(&config.dispatch)
            .registry(registry)
            .transport(Arc::new(ConsoleTransport::stdout()))
            .build()
            .unwrap();

        let names = |text: &str| -> Vec<String> {
            runtime
                .dispatcher()
                .match_event(&InboundEvent::direct(text, "console"))
                .iter()
                .map(|m| m.filter_name().to_string())
                .collect()
        };
        assert_eq!(names("weather http://x"), ["current_weather", "link_posted"]);
        assert_eq!(names("weather alerts Portland"), ["weather_alerts"]);
    }
}
