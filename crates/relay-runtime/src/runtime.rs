//! The event intake loop.
//!
//! [`RelayRuntime`] is the single intake point: it pulls events from the
//! transport's channel, matches each one synchronously and spawns one task
//! per match. Intake never waits for a handler, so a slow fetch in one
//! handler does not delay the next event.
//!
//! ```rust,ignore
//! let runtime = RelayRuntime::builder()
//!     .dispatch_config(&config.dispatch)
//!     .registry(registry)
//!     .transport(transport)
//!     .build()?;
//!
//! let shutdown = CancellationToken::new();
//! let stats = runtime.run_until(events_rx, shutdown.clone()).await;
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use relay_core::{BoxedTransport, InboundEvent};
use relay_framework::{
    DispatchMode, Dispatcher, FilterRegistry, HandlerExecutor, RegistryBuilder,
    SerializedTransport,
};

use crate::config::DispatchConfig;
use crate::error::{RuntimeError, RuntimeResult};

/// Counters collected by one run of the intake loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Events taken from the channel.
    pub events_received: u64,
    /// Events that matched at least one filter.
    pub events_matched: u64,
    /// Handler invocations spawned.
    pub invocations: u64,
}

/// Dispatches inbound events and runs their handlers.
pub struct RelayRuntime {
    dispatcher: Dispatcher,
    executor: HandlerExecutor,
    transport: BoxedTransport,
}

impl RelayRuntime {
    /// Creates a runtime with default dispatch settings.
    pub fn new(registry: FilterRegistry, transport: BoxedTransport) -> Self {
        Self {
            dispatcher: Dispatcher::new(Arc::new(registry)),
            executor: HandlerExecutor::new(),
            transport,
        }
    }

    /// Creates a runtime builder.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// The dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The handler executor.
    pub fn executor(&self) -> &HandlerExecutor {
        &self.executor
    }

    /// Dispatches one event and spawns a task per match.
    pub fn handle_event(&self, event: InboundEvent) -> Vec<JoinHandle<()>> {
        debug!(
            sender = %event.sender_id,
            conversation = %event.conversation_id,
            direct = event.is_direct,
            text = %event.text,
            "Received event"
        );

        let dispatches = self.dispatcher.dispatch(&event);
        if dispatches.is_empty() {
            trace!("No filter matched");
        }

        dispatches
            .into_iter()
            .map(|dispatch| self.executor.spawn_dispatch(dispatch, &event, &self.transport))
            .collect()
    }

    /// Consumes events until the channel closes or `shutdown` is cancelled,
    /// then waits for every in-flight handler.
    pub async fn run_until(
        &self,
        mut events: mpsc::Receiver<InboundEvent>,
        shutdown: CancellationToken,
    ) -> RuntimeStats {
        let mut stats = RuntimeStats::default();

        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested, stopping intake");
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => event,
                    None => {
                        info!("Event channel closed, stopping intake");
                        break;
                    }
                },
            };

            stats.events_received += 1;
            let spawned = self.handle_event(event).len() as u64;
            if spawned > 0 {
                stats.events_matched += 1;
                stats.invocations += spawned;
            }
        }

        let in_flight = self.executor.in_flight();
        if in_flight > 0 {
            info!(in_flight, "Waiting for in-flight handlers");
        }
        self.executor.shutdown().await;

        info!(
            received = stats.events_received,
            matched = stats.events_matched,
            invocations = stats.invocations,
            "Runtime stopped"
        );
        stats
    }

    /// Runs until the channel closes or Ctrl+C / SIGTERM is received.
    pub async fn run(&self, events: mpsc::Receiver<InboundEvent>) -> RuntimeResult<RuntimeStats> {
        let shutdown = CancellationToken::new();
        let signal = shutdown_signal()?;

        let watcher = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                signal.await;
                shutdown.cancel();
            })
        };

        info!("Relay runtime is now running. Press Ctrl+C to stop.");
        let stats = self.run_until(events, shutdown).await;
        watcher.abort();

        Ok(stats)
    }
}

impl std::fmt::Debug for RelayRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayRuntime")
            .field("dispatcher", &self.dispatcher)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

/// Resolves on Ctrl+C or SIGTERM.
fn shutdown_signal() -> RuntimeResult<impl Future<Output = ()> + Send + 'static> {
    #[cfg(unix)]
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
        .map_err(RuntimeError::Signal)?;

    Ok(async move {
        #[cfg(unix)]
        {
            let ctrl_c_available = tokio::select! {
                res = signal::ctrl_c() => match res {
                    Ok(()) => {
                        info!("Received Ctrl+C, shutting down");
                        true
                    }
                    Err(e) => {
                        warn!(error = %e, "Ctrl+C handler unavailable");
                        false
                    }
                },
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down");
                    true
                }
            };
            if !ctrl_c_available {
                sigterm.recv().await;
                info!("Received SIGTERM, shutting down");
            }
        }

        #[cfg(not(unix))]
        {
            match signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C, shutting down"),
                Err(e) => {
                    warn!(error = %e, "Ctrl+C handler unavailable");
                    std::future::pending::<()>().await;
                }
            }
        }
    })
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for a [`RelayRuntime`].
#[derive(Default)]
pub struct RuntimeBuilder {
    mode: DispatchMode,
    max_concurrent_handlers: usize,
    serialize_sends: bool,
    registry: Option<RegistryBuilder>,
    transport: Option<BoxedTransport>,
}

impl RuntimeBuilder {
    /// Creates a builder with default dispatch settings.
    pub fn new() -> Self {
        Self::default().dispatch_config(&DispatchConfig::default())
    }

    /// Applies the `[dispatch]` configuration section.
    pub fn dispatch_config(mut self, config: &DispatchConfig) -> Self {
        self.mode = config.mode;
        self.max_concurrent_handlers = config.max_concurrent_handlers;
        self.serialize_sends = config.serialize_sends;
        self
    }

    /// Sets the dispatch mode.
    pub fn mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Bounds concurrently running handlers; `0` is unbounded.
    pub fn max_concurrent_handlers(mut self, max: usize) -> Self {
        self.max_concurrent_handlers = max;
        self
    }

    /// Sets the filter registry to build.
    pub fn registry(mut self, registry: RegistryBuilder) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the outbound transport.
    pub fn transport(mut self, transport: BoxedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the registry and the runtime.
    pub fn build(self) -> RuntimeResult<RelayRuntime> {
        let transport = self.transport.ok_or(RuntimeError::MissingTransport)?;
        let registry = self.registry.unwrap_or_default().build()?;

        if registry.is_empty() {
            warn!("Filter registry is empty; no event will be handled");
        }

        let transport: BoxedTransport = if self.serialize_sends {
            Arc::new(SerializedTransport::new(transport))
        } else {
            transport
        };

        debug!(
            mode = ?self.mode,
            max_concurrent_handlers = self.max_concurrent_handlers,
            serialize_sends = self.serialize_sends,
            "Runtime configured"
        );

        Ok(RelayRuntime {
            dispatcher: Dispatcher::new(Arc::new(registry)).with_mode(self.mode),
            executor: HandlerExecutor::bounded(self.max_concurrent_handlers),
            transport,
        })
    }
}
