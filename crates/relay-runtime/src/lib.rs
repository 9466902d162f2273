//! Relay Runtime - configuration, logging and event intake.
//!
//! This crate provides:
//! - Layered configuration loading ([`ConfigLoader`], [`RelayConfig`])
//! - Logging initialization ([`LoggingBuilder`], [`logging::init_from_config`])
//! - The event intake loop ([`RelayRuntime`]), which dispatches every
//!   [`InboundEvent`](relay_core::InboundEvent) received from the transport
//!   and hands matches to the handler executor
//!
//! ```rust,ignore
//! use relay_runtime::{ConfigLoader, RelayRuntime, logging};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().load()?;
//!     logging::init_from_config(&config.logging);
//!
//!     let runtime = RelayRuntime::builder()
//!         .dispatch_config(&config.dispatch)
//!         .registry(my_registry())
//!         .transport(my_transport)
//!         .build()?;
//!
//!     // Runs until the channel closes or Ctrl+C / SIGTERM.
//!     let stats = runtime.run(events_rx).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{
    ConfigError, ConfigLoader, ConfigResult, DispatchConfig, HttpConfig, LoggingConfig,
    RelayConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{RelayRuntime, RuntimeBuilder, RuntimeStats};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
