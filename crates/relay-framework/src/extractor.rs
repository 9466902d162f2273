//! Extractor system for the Relay framework.
//!
//! This module provides the [`FromContext`] trait, which defines how types
//! can be extracted from a [`HandlerContext`] for use as handler parameters.

use relay_core::{InboundEvent, ReplyContext};

use crate::context::HandlerContext;
use crate::error::ExtractError;
use crate::matched::{Captures, MatchResult};
use crate::sink::Responder;

/// A trait for types that can be extracted from a [`HandlerContext`].
///
/// Types implementing this trait can be used directly as handler function
/// parameters. If extraction fails the invocation ends with
/// [`HandlerError::Extract`](crate::HandlerError::Extract) before the handler
/// body runs.
///
/// ```rust,ignore
/// struct Location(String);
///
/// impl FromContext for Location {
///     fn from_context(ctx: &HandlerContext) -> Result<Self, ExtractError> {
///         ctx.captures()
///             .get("loc")
///             .map(|loc| Location(loc.trim().to_string()))
///             .ok_or_else(|| ExtractError::custom("pattern has no 'loc' group"))
///     }
/// }
/// ```
pub trait FromContext: Sized {
    /// Attempts to extract this type from the given context.
    fn from_context(ctx: &HandlerContext) -> Result<Self, ExtractError>;
}

impl FromContext for InboundEvent {
    fn from_context(ctx: &HandlerContext) -> Result<Self, ExtractError> {
        Ok(ctx.event().clone())
    }
}

impl FromContext for MatchResult {
    fn from_context(ctx: &HandlerContext) -> Result<Self, ExtractError> {
        Ok(ctx.matched().clone())
    }
}

impl FromContext for Captures {
    fn from_context(ctx: &HandlerContext) -> Result<Self, ExtractError> {
        Ok(ctx.captures().clone())
    }
}

impl FromContext for Responder {
    fn from_context(ctx: &HandlerContext) -> Result<Self, ExtractError> {
        Ok(ctx.responder().clone())
    }
}

impl FromContext for ReplyContext {
    fn from_context(ctx: &HandlerContext) -> Result<Self, ExtractError> {
        Ok(ctx.reply_context().clone())
    }
}

/// Optional parameters never fail extraction.
impl<T: FromContext> FromContext for Option<T> {
    fn from_context(ctx: &HandlerContext) -> Result<Self, ExtractError> {
        Ok(T::from_context(ctx).ok())
    }
}
