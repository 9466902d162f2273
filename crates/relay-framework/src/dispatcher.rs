//! Event dispatcher for the Relay framework.
//!
//! The [`Dispatcher`] matches an [`InboundEvent`] against a [`FilterRegistry`]:
//!
//! 1. Filters are evaluated in registration order
//! 2. A direct-only filter is skipped for a non-direct event before any of
//!    its patterns is tried
//! 3. Within a filter the first matching pattern wins
//! 4. In [`DispatchMode::All`] every matching filter yields a [`Dispatch`];
//!    in [`DispatchMode::First`] evaluation stops at the first matching filter
//!
//! Matching is pure and total: an event with no matches yields an empty list.
//! Running the handlers is left to the [`HandlerExecutor`](crate::HandlerExecutor).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{Level, debug, error, span, trace};

use relay_core::InboundEvent;

use crate::handler::BoxedHandler;
use crate::matched::MatchResult;
use crate::registry::FilterRegistry;

/// How many filters may fire for one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Every matching filter fires, in registration order.
    #[default]
    All,
    /// Only the first matching filter fires.
    First,
}

/// A matched filter together with the handler bound to it.
#[derive(Clone)]
pub struct Dispatch {
    /// The match.
    pub matched: MatchResult,
    /// The handler to invoke.
    pub handler: BoxedHandler,
}

impl std::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatch")
            .field("matched", &self.matched)
            .finish_non_exhaustive()
    }
}

/// Matches events against a shared, read-only registry.
///
/// `Dispatcher` is cheap to clone and `Send + Sync`.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<FilterRegistry>,
    mode: DispatchMode,
}

impl Dispatcher {
    /// Creates a dispatcher in [`DispatchMode::All`].
    pub fn new(registry: Arc<FilterRegistry>) -> Self {
        Self {
            registry,
            mode: DispatchMode::All,
        }
    }

    /// Sets the dispatch mode.
    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// The dispatch mode.
    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// The registry this dispatcher reads.
    pub fn registry(&self) -> &Arc<FilterRegistry> {
        &self.registry
    }

    /// Returns the matches for `event`, in registration order.
    pub fn match_event(&self, event: &InboundEvent) -> Vec<MatchResult> {
        if event.text.is_empty() {
            return Vec::new();
        }

        let mut matches = Vec::new();
        for filter in self.registry.all_filters() {
            if !filter.is_eligible(event) {
                trace!(filter = filter.name(), "Direct-only filter skipped");
                continue;
            }

            let Some(matched) = filter.find(&event.text) else {
                continue;
            };

            debug!(
                filter = filter.name(),
                pattern = matched.pattern_index(),
                "Filter matched"
            );
            matches.push(matched);

            if self.mode == DispatchMode::First {
                break;
            }
        }
        matches
    }

    /// Returns every match for `event` paired with its handler.
    pub fn dispatch(&self, event: &InboundEvent) -> Vec<Dispatch> {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            sender = %event.sender_id,
            conversation = %event.conversation_id,
            direct = event.is_direct
        );
        let _enter = span.enter();

        self.match_event(event)
            .into_iter()
            .filter_map(|matched| match self.registry.handler_for(matched.filter_name()) {
                Ok(handler) => Some(Dispatch { matched, handler }),
                Err(e) => {
                    // The builder rejects unbound filters, so this is unreachable
                    // for registries built through it.
                    error!(error = %e, "Matched filter has no handler");
                    None
                }
            })
            .collect()
    }
}
