//! # Relay Core
//!
//! The fundamental building blocks shared by every Relay crate.
//!
//! This crate has no opinion on how events are matched or dispatched. It only
//! fixes the shapes exchanged with the outside world:
//!
//! - **Events**: [`InboundEvent`] as delivered by a chat transport, and the
//!   [`ReplyContext`] needed to answer it.
//! - **Transport**: the [`Transport`] trait exposing the `send(text, context)`
//!   primitive.
//! - **Fetch**: the [`Fetch`] trait, a request/response capability returning a
//!   loosely typed document as a [`FetchOutcome`].
//! - **Publish**: the [`Publish`] trait for posting JSON payloads to an
//!   outbound endpoint.
//!
//! ```text
//! ┌─────────────┐  InboundEvent   ┌────────────┐     ┌───────────┐
//! │  Transport  │────────────────▶│ Dispatcher │────▶│  Handler  │──▶ Fetch / Publish
//! │             │◀────────────────│            │     │           │
//! └─────────────┘ send(text, ctx) └────────────┘     └───────────┘
//! ```

pub mod error;
pub mod event;
pub mod fetch;
pub mod transport;

pub use error::{TransportError, TransportResult};
pub use event::{InboundEvent, ReplyContext};
pub use fetch::{BoxedFetch, BoxedPublish, Fetch, FetchOutcome, FetchRequest, Publish};
pub use transport::{BoxedTransport, Transport};

/// Prelude for common imports.
pub mod prelude {
    pub use super::error::{TransportError, TransportResult};
    pub use super::event::{InboundEvent, ReplyContext};
    pub use super::fetch::{Fetch, FetchOutcome, FetchRequest, Publish};
    pub use super::transport::Transport;
}
