//! External data collaborators.
//!
//! Handlers that need third-party data talk to a [`Fetch`] capability: a pure
//! request/response call returning a loosely typed JSON document. The result
//! is modelled as a [`FetchOutcome`] so that "the provider has nothing for
//! this" and "the provider could not be reached" are never conflated.
//!
//! Handlers that push data outwards use [`Publish`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportResult;

/// A request for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Endpoint URL, without query string.
    pub url: String,
    /// Query parameters, encoded by the collaborator.
    pub query: Vec<(String, String)>,
}

impl FetchRequest {
    /// Creates a request for `url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
        }
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// The result of a [`Fetch`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The provider returned a document.
    Found(Value),
    /// The provider answered, but has nothing for this request.
    NotFound,
    /// The provider could not be reached, timed out, or answered with
    /// something that is not a document.
    TransientError(String),
}

impl FetchOutcome {
    /// Returns `true` for [`FetchOutcome::Found`].
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Returns the document, if any.
    pub fn document(&self) -> Option<&Value> {
        match self {
            Self::Found(doc) => Some(doc),
            _ => None,
        }
    }
}

/// A request/response document provider.
#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    /// Performs the request. Never panics on provider failure; failures are
    /// reported as [`FetchOutcome::TransientError`].
    async fn fetch(&self, request: &FetchRequest) -> FetchOutcome;
}

/// Posts JSON payloads to an outbound endpoint.
#[async_trait]
pub trait Publish: Send + Sync + 'static {
    /// Posts `body` to `url` and returns the HTTP status code.
    async fn post_json(&self, url: &str, body: Value) -> TransportResult<u16>;
}

/// A shared Fetch trait object.
pub type BoxedFetch = Arc<dyn Fetch>;

/// A shared Publish trait object.
pub type BoxedPublish = Arc<dyn Publish>;
