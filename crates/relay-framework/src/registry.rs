//! The filter registry.
//!
//! The registry is the static table from filter name to compiled matchers,
//! direct-only constraint and bound handler. It is assembled once at startup
//! with a [`RegistryBuilder`]; `build` compiles every pattern and checks that
//! every filter has exactly one handler and every handler has a filter, so a
//! wiring mistake stops the process before it consumes any event.
//!
//! ```rust,ignore
//! let registry = RegistryBuilder::new()
//!     .filter(FilterSpec::new("forecast", [r"^forecast (?P<loc>.+)$"]).direct_only(true))
//!     .bind("forecast", forecast_handler)
//!     .route(FilterSpec::new("link_posted", [r"https?://\S+"]), link_handler)
//!     .build()?;
//! ```

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::{RegistryError, RegistryResult};
use crate::filter::{CompiledFilter, FilterSpec, compile};
use crate::handler::{BoxedHandler, Handler, into_handler};

/// Collects filter specs and handler bindings before compilation.
#[derive(Default)]
pub struct RegistryBuilder {
    specs: Vec<FilterSpec>,
    bindings: Vec<(String, BoxedHandler)>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a filter. Registration order is evaluation order.
    pub fn filter(mut self, spec: FilterSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Binds a handler to a filter name.
    pub fn bind<H, T>(self, name: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T> + Send + Sync + 'static,
        T: 'static,
    {
        self.bind_boxed(name, into_handler(handler))
    }

    /// Binds a pre-built boxed handler to a filter name.
    pub fn bind_boxed(mut self, name: impl Into<String>, handler: BoxedHandler) -> Self {
        self.bindings.push((name.into(), handler));
        self
    }

    /// Registers a filter and binds its handler in one step.
    pub fn route<H, T>(self, spec: FilterSpec, handler: H) -> Self
    where
        H: Handler<T> + Send + Sync + 'static,
        T: 'static,
    {
        let name = spec.name().to_string();
        self.filter(spec).bind(name, handler)
    }

    /// Number of filters registered so far.
    pub fn filter_count(&self) -> usize {
        self.specs.len()
    }

    /// Compiles every filter and freezes the table.
    pub fn build(self) -> RegistryResult<FilterRegistry> {
        let filters = compile(&self.specs)?;

        let mut handlers: HashMap<String, BoxedHandler> = HashMap::with_capacity(filters.len());
        for (name, handler) in self.bindings {
            if !filters.iter().any(|f| f.name() == name) {
                return Err(RegistryError::BindingWithoutFilter(name));
            }
            if handlers.contains_key(&name) {
                return Err(RegistryError::DuplicateBinding(name));
            }
            handlers.insert(name, handler);
        }

        if let Some(unbound) = filters.iter().find(|f| !handlers.contains_key(f.name())) {
            return Err(RegistryError::UnboundFilter(unbound.name().to_string()));
        }

        for filter in &filters {
            debug!(
                filter = filter.name(),
                patterns = filter.matchers().len(),
                direct_only = filter.is_direct_only(),
                "Filter compiled"
            );
        }
        info!(filters = filters.len(), "Filter registry built");

        Ok(FilterRegistry { filters, handlers })
    }
}

/// Compiled filters and their handlers, read-only after construction.
pub struct FilterRegistry {
    filters: Vec<CompiledFilter>,
    handlers: HashMap<String, BoxedHandler>,
}

impl FilterRegistry {
    /// Creates a builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// All filters, in registration order.
    pub fn all_filters(&self) -> &[CompiledFilter] {
        &self.filters
    }

    /// Looks up a filter by name.
    pub fn filter(&self, name: &str) -> Option<&CompiledFilter> {
        self.filters.iter().find(|f| f.name() == name)
    }

    /// Returns the handler bound to `name`.
    pub fn handler_for(&self, name: &str) -> RegistryResult<BoxedHandler> {
        self.handlers
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownFilter(name.to_string()))
    }

    /// Number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if no filter is registered.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field(
                "filters",
                &self.filters.iter().map(CompiledFilter::name).collect::<Vec<_>>(),
            )
            .finish()
    }
}
