//! Handler execution.
//!
//! Every handler invocation runs on its own tokio task. A failing or panicking
//! invocation is logged and discarded; it never affects other invocations or
//! the intake loop. An optional limit bounds how many invocations run at once;
//! invocations over the limit wait for a permit on their own task, so
//! [`HandlerExecutor::invoke`] never blocks the caller.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, Level, debug, error, span, warn};

use relay_core::{BoxedTransport, InboundEvent};

use crate::context::HandlerContext;
use crate::dispatcher::Dispatch;
use crate::handler::BoxedHandler;
use crate::sink::Responder;

/// Spawns handler invocations and tracks them until they finish.
#[derive(Debug, Clone, Default)]
pub struct HandlerExecutor {
    tracker: TaskTracker,
    permits: Option<Arc<Semaphore>>,
}

impl HandlerExecutor {
    /// Creates an executor without a concurrency limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an executor running at most `max` invocations at once.
    ///
    /// `0` means unbounded.
    pub fn bounded(max: usize) -> Self {
        Self {
            tracker: TaskTracker::new(),
            permits: (max > 0).then(|| Arc::new(Semaphore::new(max))),
        }
    }

    /// Spawns one invocation of `handler` with `ctx`.
    pub fn invoke(&self, handler: BoxedHandler, ctx: Arc<HandlerContext>) -> JoinHandle<()> {
        let span = span!(
            Level::DEBUG,
            "handler",
            filter = %ctx.matched().filter_name(),
            sender = %ctx.reply_context().sender_id,
            conversation = %ctx.reply_context().conversation_id
        );
        let permits = self.permits.clone();

        self.tracker.spawn(
            async move {
                let _permit = match permits {
                    Some(semaphore) => match semaphore.acquire_owned().await {
                        Ok(permit) => Some(permit),
                        Err(_) => {
                            warn!("Executor closed, invocation dropped");
                            return;
                        }
                    },
                    None => None,
                };

                match AssertUnwindSafe(handler.call(ctx)).catch_unwind().await {
                    Ok(Ok(())) => debug!("Handler completed"),
                    Ok(Err(e)) => error!(error = %e, "Handler failed"),
                    Err(payload) => {
                        error!(panic = %panic_message(payload.as_ref()), "Handler panicked")
                    }
                }
            }
            .instrument(span),
        )
    }

    /// Builds the context for a dispatch and spawns its invocation.
    pub fn spawn_dispatch(
        &self,
        dispatch: Dispatch,
        event: &InboundEvent,
        transport: &BoxedTransport,
    ) -> JoinHandle<()> {
        let responder = Responder::new(Arc::clone(transport), event.reply_context());
        let ctx = Arc::new(HandlerContext::new(
            event.clone(),
            dispatch.matched,
            responder,
        ));
        self.invoke(dispatch.handler, ctx)
    }

    /// Number of invocations spawned and not yet finished.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Waits for every invocation spawned so far to finish.
    pub async fn shutdown(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        debug!("All handler invocations finished");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use relay_core::{ReplyContext, Transport, TransportResult};
    use tokio_test::assert_ok;

    use crate::error::{HandlerError, HandlerResult};
    use crate::handler::into_handler;
    use crate::matched::{Captures, MatchResult};

    #[derive(Default)]
    struct RecordingTransport {
        lines: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, text: &str, _ctx: &ReplyContext) -> TransportResult<()> {
            self.lines.lock().push(text.to_string());
            Ok(())
        }
    }

    fn context(transport: Arc<RecordingTransport>, filter: &str) -> Arc<HandlerContext> {
        let event = InboundEvent::direct("ping", "alice");
        let matched = MatchResult::new(filter, 0, Captures::default(), "ping");
        let responder = Responder::new(transport, event.reply_context());
        Arc::new(HandlerContext::new(event, matched, responder))
    }

    #[tokio::test]
    async fn test_failure_does_not_block_other_invocations() {
        let transport = Arc::new(RecordingTransport::default());
        let executor = HandlerExecutor::new();

        let failing = into_handler(|| async { Err::<(), _>(HandlerError::fetch("timeout")) });
        let replying = into_handler(|responder: Responder| async move {
            responder.send("pong").await?;
            Ok::<(), HandlerError>(())
        });

        let a = executor.invoke(failing, context(transport.clone(), "failing"));
        let b = executor.invoke(replying, context(transport.clone(), "replying"));
        assert_ok!(a.await);
        assert_ok!(b.await);

        assert_eq!(*transport.lines.lock(), vec!["pong".to_string()]);
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let transport = Arc::new(RecordingTransport::default());
        let executor = HandlerExecutor::new();

        async fn boom() -> HandlerResult {
            panic!("handler exploded");
        }
        let handle = executor.invoke(into_handler(boom), context(transport.clone(), "boom"));

        // The task itself completes normally: the panic was caught inside it.
        assert_ok!(handle.await);

        let after = into_handler(|responder: Responder| async move {
            responder.send("still alive").await?;
            Ok::<(), HandlerError>(())
        });
        executor
            .invoke(after, context(transport.clone(), "after"))
            .await
            .unwrap();
        assert_eq!(*transport.lines.lock(), vec!["still alive".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_bounded_executor_respects_limit() {
        let transport = Arc::new(RecordingTransport::default());
        let executor = HandlerExecutor::bounded(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handler = {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            into_handler(move || {
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok::<(), HandlerError>(())
                }
            })
        };

        for _ in 0..8 {
            let _ = executor.invoke(Arc::clone(&handler), context(transport.clone(), "slow"));
        }
        executor.shutdown().await;

        assert_eq!(executor.in_flight(), 0);
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_zero_limit_is_unbounded() {
        let executor = HandlerExecutor::bounded(0);
        assert!(executor.permits.is_none());
        executor.shutdown().await;
        assert_eq!(executor.in_flight(), 0);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
