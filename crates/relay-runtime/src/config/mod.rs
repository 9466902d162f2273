//! Configuration for the Relay runtime.
//!
//! Settings are layered with figment from defaults, TOML/YAML files and
//! `RELAY_*` environment variables, then checked by [`validate_config`].
//! Service sections are carried opaquely and read with
//! [`RelayConfig::section`].

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    DispatchConfig, HttpConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, RelayConfig,
    SpanEventConfig,
};
pub use validation::{validate_config, validate_url};
