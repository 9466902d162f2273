//! The response sink.
//!
//! A [`Responder`] is bound to the conversation an event came from. Each call
//! to [`Responder::send`] is one outbound line and completes only once the
//! transport has accepted (or rejected) it, so several sends issued by one
//! handler invocation reach the transport in the order they were issued.
//!
//! Handlers of different events run concurrently. When the transport is not
//! safe for concurrent writes, wrap it in a [`SerializedTransport`], which
//! admits one write per conversation at a time in arrival order.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tracing::trace;

use relay_core::{BoxedTransport, ReplyContext, Transport, TransportResult};

/// Sends text back to the conversation that triggered a handler.
#[derive(Clone)]
pub struct Responder {
    transport: BoxedTransport,
    ctx: ReplyContext,
}

impl Responder {
    /// Creates a responder writing to `ctx` through `transport`.
    pub fn new(transport: BoxedTransport, ctx: ReplyContext) -> Self {
        Self { transport, ctx }
    }

    /// The conversation this responder writes to.
    pub fn context(&self) -> &ReplyContext {
        &self.ctx
    }

    /// Sends one line.
    ///
    /// Transport failures are returned; nothing is retried.
    pub async fn send(&self, text: impl AsRef<str>) -> TransportResult<()> {
        let text = text.as_ref();
        trace!(
            conversation = %self.ctx.conversation_id,
            len = text.len(),
            "Sending response line"
        );
        self.transport.send(text, &self.ctx).await
    }

    /// Sends each line in order, stopping at the first failure.
    pub async fn send_all<I, S>(&self, lines: I) -> TransportResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.send(line).await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

/// A [`Transport`] wrapper serializing writes per conversation.
pub struct SerializedTransport {
    inner: BoxedTransport,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SerializedTransport {
    /// Wraps `inner`.
    pub fn new(inner: BoxedTransport) -> Self {
        Self {
            inner,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, conversation_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(conversation_id.to_string()).or_default())
    }

    // Drops the lock entry once nobody else holds or waits on it.
    fn release(&self, conversation_id: &str) {
        let mut locks = self.locks.lock();
        if let Some(lock) = locks.get(conversation_id)
            && Arc::strong_count(lock) == 1
        {
            locks.remove(conversation_id);
        }
    }

    /// Number of conversations with a write in progress or queued.
    pub fn active_conversations(&self) -> usize {
        self.locks.lock().len()
    }
}

/// Releases a conversation's lock entry when dropped, including when the
/// send future is cancelled mid-write.
struct ReleaseOnDrop<'a> {
    transport: &'a SerializedTransport,
    conversation_id: &'a str,
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        self.transport.release(self.conversation_id);
    }
}

#[async_trait]
impl Transport for SerializedTransport {
    async fn send(&self, text: &str, ctx: &ReplyContext) -> TransportResult<()> {
        // Declared first so it drops after the guard and the lock handle.
        let _release = ReleaseOnDrop {
            transport: self,
            conversation_id: &ctx.conversation_id,
        };
        let lock = self.lock_for(&ctx.conversation_id);
        let _guard = lock.lock().await;
        self.inner.send(text, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use relay_core::TransportError;
    use tokio::sync::Notify;

    /// Records every line; optionally sleeps to widen interleaving windows and
    /// tracks the peak number of concurrent writes per call.
    #[derive(Default)]
    struct RecordingTransport {
        lines: Mutex<Vec<(String, String)>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        delay: Option<Duration>,
        reject: bool,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, text: &str, ctx: &ReplyContext) -> TransportResult<()> {
            if self.reject {
                return Err(TransportError::rejected(&ctx.conversation_id, "muted"));
            }
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.lines
                .lock()
                .push((ctx.conversation_id.clone(), text.to_string()));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn ctx(conversation: &str) -> ReplyContext {
        ReplyContext {
            sender_id: "tester".into(),
            conversation_id: conversation.into(),
        }
    }

    #[tokio::test]
    async fn test_send_all_preserves_order() {
        let transport = Arc::new(RecordingTransport::default());
        let responder = Responder::new(transport.clone(), ctx("#weather"));

        responder
            .send_all(["Here is your forecast:", "Monday - Sunny", "Tuesday - Rain"])
            .await
            .unwrap();

        let lines: Vec<String> = transport.lines.lock().iter().map(|(_, t)| t.clone()).collect();
        assert_eq!(
            lines,
            vec!["Here is your forecast:", "Monday - Sunny", "Tuesday - Rain"]
        );
    }

    #[tokio::test]
    async fn test_rejected_send_is_reported() {
        let transport = Arc::new(RecordingTransport {
            reject: true,
            ..Default::default()
        });
        let responder = Responder::new(transport, ctx("#quiet"));
        let err = responder.send("hello").await.unwrap_err();
        assert!(matches!(err, TransportError::SendRejected { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_serialized_transport_one_write_per_conversation() {
        let inner = Arc::new(RecordingTransport {
            delay: Some(Duration::from_millis(5)),
            ..Default::default()
        });
        let serialized = Arc::new(SerializedTransport::new(inner.clone()));

        let mut tasks = Vec::new();
        for task in 0..4 {
            let responder = Responder::new(serialized.clone(), ctx("#shared"));
            tasks.push(tokio::spawn(async move {
                for line in 0..3 {
                    responder.send(format!("{task}-{line}")).await.unwrap();
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(inner.peak.load(Ordering::SeqCst), 1);
        let lines = inner.lines.lock().clone();
        assert_eq!(lines.len(), 12);
        // Each invocation's lines keep their relative order.
        for task in 0..4 {
            let own: Vec<&str> = lines
                .iter()
                .map(|(_, t)| t.as_str())
                .filter(|t| t.starts_with(&format!("{task}-")))
                .collect();
            assert_eq!(own, vec![format!("{task}-0"), format!("{task}-1"), format!("{task}-2")]);
        }
        assert_eq!(serialized.active_conversations(), 0);
    }

    /// Never completes a write; signals once one has started.
    #[derive(Default)]
    struct StalledTransport {
        entered: Notify,
    }

    #[async_trait]
    impl Transport for StalledTransport {
        async fn send(&self, _text: &str, _ctx: &ReplyContext) -> TransportResult<()> {
            self.entered.notify_one();
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_cancelled_send_releases_conversation() {
        let inner = Arc::new(StalledTransport::default());
        let serialized = Arc::new(SerializedTransport::new(inner.clone()));

        let sender = Arc::clone(&serialized);
        let task = tokio::spawn(async move { sender.send("stuck", &ctx("#stalled")).await });
        inner.entered.notified().await;
        assert_eq!(serialized.active_conversations(), 1);

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert_eq!(serialized.active_conversations(), 0);
    }

    #[tokio::test]
    async fn test_queued_send_dropped_while_waiting() {
        let inner = Arc::new(StalledTransport::default());
        let serialized = Arc::new(SerializedTransport::new(inner.clone()));

        let sender = Arc::clone(&serialized);
        let writing = tokio::spawn(async move { sender.send("first", &ctx("#busy")).await });
        inner.entered.notified().await;

        let queued = tokio::time::timeout(
            Duration::from_millis(10),
            serialized.send("second", &ctx("#busy")),
        )
        .await;
        assert!(queued.is_err());
        assert_eq!(serialized.active_conversations(), 1);

        writing.abort();
        assert!(writing.await.unwrap_err().is_cancelled());
        assert_eq!(serialized.active_conversations(), 0);
    }
}
