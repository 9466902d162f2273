//! # Relay Transport
//!
//! Concrete collaborators for the Relay framework.
//!
//! ## Features
//!
//! - `http-client` *(default)*: [`HttpClient`], a `reqwest`-backed
//!   implementation of [`Fetch`](relay_core::Fetch) and
//!   [`Publish`](relay_core::Publish)
//! - `console`: [`ConsoleTransport`] and a stdin-style line reader, used by
//!   the console demo
//! - `full`: everything
//!
//! ## HTTP outcome mapping
//!
//! | Response                             | Outcome           |
//! |--------------------------------------|-------------------|
//! | 2xx with a JSON body                 | `Found(document)` |
//! | 404                                  | `NotFound`        |
//! | any other status                     | `TransientError`  |
//! | timeout, connection error, bad body  | `TransientError`  |
//!
//! ```rust,ignore
//! use relay_transport::{HttpClient, HttpClientConfig};
//!
//! let http = Arc::new(HttpClient::with_config(HttpClientConfig {
//!     timeout: Duration::from_secs(config.http.timeout_secs),
//!     user_agent: config.http.user_agent.clone(),
//! })?);
//! let outcome = http.fetch(&FetchRequest::get(url).query("query", "Portland")).await;
//! ```

#[cfg(feature = "http-client")]
pub mod http;

#[cfg(feature = "console")]
pub mod console;

#[cfg(feature = "http-client")]
pub use http::{HttpClient, HttpClientConfig};

#[cfg(feature = "console")]
pub use console::ConsoleTransport;
