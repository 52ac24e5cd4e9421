//! Request-scoped state of the proof plugin.
//!
//! A [`RequestContext`] is created once per query request by
//! [`ProofPlugin::preprocess`](super::ProofPlugin::preprocess) and owns
//! every explanation cursor the request opens. Dropping it releases them
//! all; nothing outlives the request.

use std::collections::HashMap;
use std::sync::Arc;

use crate::cursor::ExplanationCursor;
use crate::infer::DerivationReporter;
use crate::store::FactStore;
use crate::symbol::{EntityId, RequestScope};

/// Collaborators the host may inject into a request.
#[derive(Clone, Default)]
pub struct RequestOptions {
    pub store: Option<Arc<dyn FactStore>>,
    pub reporter: Option<Arc<dyn DerivationReporter>>,
}

impl RequestOptions {
    pub fn new(store: Arc<dyn FactStore>, reporter: Arc<dyn DerivationReporter>) -> Self {
        Self {
            store: Some(store),
            reporter: Some(reporter),
        }
    }
}

impl std::fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOptions")
            .field("store", &self.store.is_some())
            .field("reporter", &self.reporter.is_some())
            .finish()
    }
}

/// Both collaborators, present together or not at all.
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn FactStore>,
    pub reporter: Arc<dyn DerivationReporter>,
}

impl Services {
    fn from_options(options: RequestOptions) -> Option<Self> {
        Some(Self {
            store: options.store?,
            reporter: options.reporter?,
        })
    }
}

/// Per-request state: injected services, id scope, and open cursors.
pub struct RequestContext {
    services: Option<Services>,
    scope: RequestScope,
    cursors: HashMap<EntityId, ExplanationCursor>,
}

impl RequestContext {
    pub(crate) fn new(options: Option<RequestOptions>, handle_base: u64) -> Self {
        Self {
            services: options.and_then(Services::from_options),
            scope: RequestScope::new(handle_base),
            cursors: HashMap::new(),
        }
    }

    /// The injected services, if the host supplied both.
    pub fn services(&self) -> Option<&Services> {
        self.services.as_ref()
    }

    pub fn scope(&self) -> &RequestScope {
        &self.scope
    }

    pub(crate) fn scope_mut(&mut self) -> &mut RequestScope {
        &mut self.scope
    }

    /// The cursor opened under `handle`, if it is still live.
    pub fn cursor(&self, handle: EntityId) -> Option<&ExplanationCursor> {
        self.cursors.get(&handle)
    }

    pub(crate) fn cursor_mut(&mut self, handle: EntityId) -> Option<&mut ExplanationCursor> {
        self.cursors.get_mut(&handle)
    }

    pub(crate) fn insert_cursor(&mut self, handle: EntityId, cursor: ExplanationCursor) {
        self.cursors.insert(handle, cursor);
    }

    /// Drop the cursor under `handle`. Returns whether one was live.
    pub fn release(&mut self, handle: EntityId) -> bool {
        self.cursors.remove(&handle).is_some()
    }

    /// Number of cursors still owned by this request.
    pub fn live_cursors(&self) -> usize {
        self.cursors.len()
    }

    /// Resolve a literal bound by the `rule` accessor.
    pub fn literal(&self, id: EntityId) -> Option<&str> {
        self.scope.literal(id)
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("services", &self.services.is_some())
            .field("cursors", &self.cursors.len())
            .finish()
    }
}
