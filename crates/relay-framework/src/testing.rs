//! In-memory collaborators for tests.
//!
//! Available with the `test-util` feature.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use relay_core::{
    Fetch, FetchOutcome, FetchRequest, Publish, ReplyContext, Transport, TransportError,
    TransportResult,
};

/// A [`Transport`] that records every line it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(ReplyContext, String)>>,
    reject: bool,
}

impl RecordingTransport {
    /// Creates a transport accepting every send.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a transport rejecting every send.
    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self {
            reject: true,
            ..Default::default()
        })
    }

    /// The texts sent so far, in order.
    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(_, t)| t.clone()).collect()
    }

    /// Every send with its reply context, in order.
    pub fn sent(&self) -> Vec<(ReplyContext, String)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, text: &str, ctx: &ReplyContext) -> TransportResult<()> {
        if self.reject {
            return Err(TransportError::rejected(&ctx.conversation_id, "rejected by test"));
        }
        self.sent.lock().push((ctx.clone(), text.to_string()));
        Ok(())
    }
}

/// A [`Fetch`] answering from a fixed table keyed by request URL.
///
/// Unknown URLs answer [`FetchOutcome::NotFound`].
#[derive(Debug, Default)]
pub struct StaticFetch {
    routes: HashMap<String, FetchOutcome>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl StaticFetch {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `url` with `outcome`.
    pub fn route(mut self, url: impl Into<String>, outcome: FetchOutcome) -> Self {
        self.routes.insert(url.into(), outcome);
        self
    }

    /// Answers `url` with a document.
    pub fn found(self, url: impl Into<String>, document: Value) -> Self {
        self.route(url, FetchOutcome::Found(document))
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Fetch for StaticFetch {
    async fn fetch(&self, request: &FetchRequest) -> FetchOutcome {
        self.requests.lock().push(request.clone());
        self.routes
            .get(&request.url)
            .cloned()
            .unwrap_or(FetchOutcome::NotFound)
    }
}

/// A [`Publish`] that records payloads and answers with a fixed status.
#[derive(Debug)]
pub struct RecordingPublish {
    status: u16,
    posts: Mutex<Vec<(String, Value)>>,
}

impl RecordingPublish {
    /// Creates a publisher answering `status`.
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            posts: Mutex::new(Vec::new()),
        }
    }

    /// Every post received, in order.
    pub fn posts(&self) -> Vec<(String, Value)> {
        self.posts.lock().clone()
    }
}

impl Default for RecordingPublish {
    fn default() -> Self {
        Self::with_status(200)
    }
}

#[async_trait]
impl Publish for RecordingPublish {
    async fn post_json(&self, url: &str, body: Value) -> TransportResult<u16> {
        self.posts.lock().push((url.to_string(), body));
        Ok(self.status)
    }
}
