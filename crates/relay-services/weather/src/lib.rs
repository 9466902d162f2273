//! # Relay Weather
//!
//! Direct-message weather commands backed by a JSON weather API:
//!
//! - `weather <location>` - current conditions
//! - `weather alerts <location>` - the most relevant active alert
//! - `forecast <location>` - the next few forecast periods
//! - `help` - command summary
//!
//! ```rust,ignore
//! let service = Arc::new(WeatherService::new(config.section("weather")?, fetch)?);
//! let builder = service.register(RegistryBuilder::new());
//! ```

pub mod config;
mod document;
pub mod error;
pub mod filters;
pub mod service;

pub use config::WeatherConfig;
pub use error::ServiceError;
pub use filters::WeatherFilter;
pub use service::{Location, WeatherService};
