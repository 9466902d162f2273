//! The per-invocation handler context.
//!
//! One [`HandlerContext`] is created for each `(event, match)` pair the
//! dispatcher produces. It is wrapped in an `Arc` and handed to the handler;
//! parameters are pulled out of it by [`FromContext`](crate::FromContext)
//! extractors. Nothing in it outlives the invocation.

use relay_core::{InboundEvent, ReplyContext};

use crate::matched::{Captures, MatchResult};
use crate::sink::Responder;

/// Everything a handler invocation can see.
#[derive(Debug)]
pub struct HandlerContext {
    event: InboundEvent,
    matched: MatchResult,
    responder: Responder,
}

impl HandlerContext {
    /// Creates a context for one invocation.
    pub fn new(event: InboundEvent, matched: MatchResult, responder: Responder) -> Self {
        Self {
            event,
            matched,
            responder,
        }
    }

    /// The event that triggered the invocation.
    pub fn event(&self) -> &InboundEvent {
        &self.event
    }

    /// The match that selected this handler.
    pub fn matched(&self) -> &MatchResult {
        &self.matched
    }

    /// Shorthand for `matched().captures()`.
    pub fn captures(&self) -> &Captures {
        self.matched.captures()
    }

    /// The response sink bound to the originating conversation.
    pub fn responder(&self) -> &Responder {
        &self.responder
    }

    /// Routing information of the originating conversation.
    pub fn reply_context(&self) -> &ReplyContext {
        self.responder.context()
    }
}
