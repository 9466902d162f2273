//! # Relay Framework
//!
//! Pattern-driven dispatch for chat events.
//!
//! This layer provides:
//! - The pattern compiler turning declarative [`FilterSpec`]s into
//!   [`CompiledFilter`]s
//! - The [`FilterRegistry`], a static table from filter name to compiled
//!   matchers and bound handler, assembled with a [`RegistryBuilder`]
//! - The [`Dispatcher`], which matches an [`InboundEvent`](relay_core::InboundEvent)
//!   against the registry in registration order
//! - The [`Handler`] trait for Axum-style handler functions with
//!   [`FromContext`] extractors
//! - The [`HandlerExecutor`], which runs every invocation on its own task and
//!   isolates failures
//! - The [`Responder`] response sink and the [`SerializedTransport`] wrapper
//!
//! ```rust,ignore
//! use relay_framework::{Captures, FilterSpec, HandlerResult, RegistryBuilder, Responder};
//!
//! async fn greet(captures: Captures, responder: Responder) -> HandlerResult {
//!     let name = captures.require("name")?;
//!     responder.send(format!("Hello, {name}!")).await?;
//!     Ok(())
//! }
//!
//! let registry = RegistryBuilder::new()
//!     .route(FilterSpec::new("greet", [r"^hello (?P<name>\w+)$"]), greet)
//!     .build()?;
//! ```

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod extractor;
pub mod filter;
pub mod handler;
pub mod matched;
pub mod registry;
pub mod sink;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use context::HandlerContext;
pub use dispatcher::{Dispatch, DispatchMode, Dispatcher};
pub use error::{
    ExtractError, FilterError, FilterResult, HandlerError, HandlerResult, RegistryError,
    RegistryResult,
};
pub use executor::HandlerExecutor;
pub use extractor::FromContext;
pub use filter::{CompiledFilter, FilterSpec, compile};
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, HandlerFn, into_handler};
pub use matched::{Captures, MatchResult};
pub use registry::{FilterRegistry, RegistryBuilder};
pub use sink::{Responder, SerializedTransport};
