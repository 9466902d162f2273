//! The chat transport seam.
//!
//! The transport owns the network connection to the chat service. The core
//! only ever needs one thing from it: deliver a line of text to the
//! conversation described by a [`ReplyContext`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportResult;
use crate::event::ReplyContext;

/// Outbound half of a chat transport.
///
/// Implementations need not be safe for concurrent writes into the same
/// conversation; wrap them in the framework's `SerializedTransport` when
/// handlers run concurrently.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends one line of text to the conversation in `ctx`.
    ///
    /// A rejected send is reported as an error; the caller decides whether to
    /// retry.
    async fn send(&self, text: &str, ctx: &ReplyContext) -> TransportResult<()>;
}

/// A shared Transport trait object.
pub type BoxedTransport = Arc<dyn Transport>;
