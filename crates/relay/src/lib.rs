//! # Relay
//!
//! A pattern-driven dispatch core for chat bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   InboundEvent   ┌────────────┐  matches  ┌──────────────────────────┐
//! │ Transport │─────────────────▶│ Dispatcher │──────────▶│ handler (own task)       │──▶ Fetch / Publish
//! │           │◀─────────────────│ (registry) │──────────▶│ handler (own task)       │
//! └───────────┘   send(text)     └────────────┘           └──────────────────────────┘
//! ```
//!
//! - **Filters**: named patterns with an eligibility rule (direct-only or not),
//!   compiled once at startup
//! - **Registry**: a static table from filter name to matchers and handler;
//!   unbound filters are startup errors
//! - **Dispatcher**: matches each event against every filter in registration
//!   order
//! - **Executor**: runs each invocation on its own task; a failing handler
//!   never affects another
//! - **Responder**: sends reply lines back to the originating conversation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use relay::prelude::*;
//!
//! async fn ping(responder: Responder) -> HandlerResult {
//!     responder.send("pong").await?;
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().load()?;
//!     init_from_config(&config.logging);
//!
//!     let runtime = RelayRuntime::builder()
//!         .dispatch_config(&config.dispatch)
//!         .registry(RegistryBuilder::new().route(FilterSpec::new("ping", ["^ping$"]), ping))
//!         .transport(my_transport)
//!         .build()?;
//!
//!     runtime.run(events).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` / `yaml-config`: configuration file formats (TOML default)
//! - `json-log`: JSON log lines
//! - `http-client`: `reqwest`-backed [`Fetch`](relay_core::Fetch) and
//!   [`Publish`](relay_core::Publish) (default)
//! - `console`: stdin/stdout transport
//! - `weather`, `link-scraper`: bundled services (default)

pub use relay_core as core;
pub use relay_framework as framework;
pub use relay_runtime as runtime;
pub use relay_transport as transport;

#[cfg(feature = "link-scraper")]
pub use relay_service_linkscraper as linkscraper;
#[cfg(feature = "weather")]
pub use relay_service_weather as weather;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use relay::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use relay_runtime::logging::init_from_config;
    pub use relay_runtime::{ConfigLoader, RelayConfig, RelayRuntime};

    // Filters and dispatch
    pub use relay_framework::{DispatchMode, FilterSpec, RegistryBuilder};

    // Handler building blocks
    pub use relay_framework::{
        Captures, FromContext, HandlerContext, HandlerError, HandlerResult, MatchResult,
        Responder,
    };

    // Collaborator traits for custom implementations
    pub use relay_core::{
        BoxedFetch, BoxedPublish, BoxedTransport, Fetch, FetchOutcome, FetchRequest,
        InboundEvent, Publish, ReplyContext, Transport,
    };
}
