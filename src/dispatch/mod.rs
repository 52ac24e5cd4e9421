//! Pattern dispatch: the proof plugin's query surface.
//!
//! Six predicates under one namespace drive an explanation from a query:
//!
//! ```sparql
//! PREFIX pr: <http://www.ontotext.com/proof/>
//! SELECT * {
//!     ?x pr:explain (?s ?p ?o) .
//!     ?x pr:rule ?rule .
//!     ?x pr:subject ?subj .
//!     ?x pr:predicate ?pred .
//!     ?x pr:object ?obj .
//!     ?x pr:context ?ctx .
//! }
//! ```
//!
//! `explain` takes a fully bound candidate fact, collects its
//! justifications, and binds a fresh request-scoped handle. Re-evaluating
//! the pattern walks the cursor one premise at a time. The five accessors
//! read the cursor's current position by handle without moving it.
//!
//! # Architecture
//!
//! - [`ProofVocabulary`]: predicate ids, and the single table mapping an
//!   accessor predicate to the [`Accessor`] it reads
//! - [`ProofPlugin`]: lifecycle (`initialize`, `preprocess`), pattern
//!   interpretation, and planner cost estimates
//! - [`RequestContext`]: the per-request owner of every open cursor

pub mod context;

pub use context::{RequestContext, RequestOptions, Services};

use crate::collect::JustificationCollector;
use crate::config::ProofConfig;
use crate::cursor::{ExplanationCursor, PremiseField};
use crate::error::ProofResult;
use crate::graph::Triple;
use crate::symbol::{EntityId, EntityRegistry};

/// Name the plugin registers under.
pub const PLUGIN_NAME: &str = "proof";

/// Planner cost for patterns that must not be scheduled yet.
pub const UNBOUNDED_COST: f64 = f64::MAX;

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// What an accessor predicate reads from the current cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessor {
    Rule,
    Field(PremiseField),
}

/// Classification of a predicate owned by the plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProofPredicate {
    Explain,
    Accessor(Accessor),
}

/// Ids of the six plugin predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofVocabulary {
    pub explain: EntityId,
    accessors: [(EntityId, Accessor); 5],
}

impl ProofVocabulary {
    /// Local names of the accessor predicates, in table order.
    const ACCESSORS: [(&'static str, Accessor); 5] = [
        ("rule", Accessor::Rule),
        ("subject", Accessor::Field(PremiseField::Subject)),
        ("predicate", Accessor::Field(PremiseField::Predicate)),
        ("object", Accessor::Field(PremiseField::Object)),
        ("context", Accessor::Field(PremiseField::Context)),
    ];

    /// Intern the predicate IRIs under the configured namespace.
    pub fn register(config: &ProofConfig, registry: &EntityRegistry) -> ProofResult<Self> {
        let explain = registry.put_iri(&config.iri("explain"))?;
        let mut accessors = [(explain, Accessor::Rule); 5];
        for (slot, (local, accessor)) in accessors.iter_mut().zip(Self::ACCESSORS) {
            *slot = (registry.put_iri(&config.iri(local))?, accessor);
        }
        Ok(Self { explain, accessors })
    }

    /// Classify a predicate id; `None` if the plugin does not own it.
    pub fn classify(&self, predicate: EntityId) -> Option<ProofPredicate> {
        if predicate == self.explain {
            return Some(ProofPredicate::Explain);
        }
        self.accessors
            .iter()
            .find(|(id, _)| *id == predicate)
            .map(|&(_, accessor)| ProofPredicate::Accessor(accessor))
    }

    /// Predicate id of an accessor.
    pub fn accessor_id(&self, accessor: Accessor) -> EntityId {
        self.accessors
            .iter()
            .find(|(_, a)| *a == accessor)
            .map_or(self.explain, |&(id, _)| id)
    }

    pub fn rule(&self) -> EntityId {
        self.accessor_id(Accessor::Rule)
    }

    pub fn field(&self, field: PremiseField) -> EntityId {
        self.accessor_id(Accessor::Field(field))
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A statement produced by the plugin rather than read from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyntheticStatement {
    pub subject: EntityId,
    pub predicate: EntityId,
    pub object: EntityId,
}

impl SyntheticStatement {
    pub fn new(subject: EntityId, predicate: EntityId, object: EntityId) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

/// Iteration over an `explain` match: one statement per premise row.
///
/// The cursor itself lives in the [`RequestContext`]; this iterator only
/// remembers its handle, so accessor patterns can read the same cursor
/// between calls to [`ExplainIter::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplainIter {
    handle: Option<EntityId>,
    predicate: EntityId,
}

impl ExplainIter {
    fn empty(predicate: EntityId) -> Self {
        Self {
            handle: None,
            predicate,
        }
    }

    /// The handle bound by this match; `None` for an empty match.
    pub fn handle(&self) -> Option<EntityId> {
        self.handle
    }

    /// Advance the cursor one premise and yield `(handle, explain, handle)`.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self, ctx: &mut RequestContext) -> Option<SyntheticStatement> {
        let handle = self.handle?;
        let cursor = ctx.cursor_mut(handle)?;
        if cursor.advance() {
            Some(SyntheticStatement::new(handle, self.predicate, handle))
        } else {
            None
        }
    }

    /// Release the cursor before the request ends.
    pub fn close(self, ctx: &mut RequestContext) {
        if let Some(handle) = self.handle {
            ctx.release(handle);
        }
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// The proof plugin: explains why a fact holds.
#[derive(Debug, Clone)]
pub struct ProofPlugin {
    config: ProofConfig,
    vocabulary: ProofVocabulary,
}

impl ProofPlugin {
    /// Validate the configuration and register the predicates.
    pub fn initialize(config: ProofConfig, registry: &EntityRegistry) -> ProofResult<Self> {
        config.validate()?;
        let vocabulary = ProofVocabulary::register(&config, registry)?;
        tracing::info!(namespace = %config.namespace, "proof plugin initialized");
        Ok(Self { config, vocabulary })
    }

    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    pub fn config(&self) -> &ProofConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &ProofVocabulary {
        &self.vocabulary
    }

    /// Whether the plugin answers patterns with this predicate.
    pub fn owns(&self, predicate: EntityId) -> bool {
        self.vocabulary.classify(predicate).is_some()
    }

    /// Open the request scope. Services missing from `options` make every
    /// pattern in the request answer empty.
    pub fn preprocess(&self, options: Option<RequestOptions>) -> RequestContext {
        RequestContext::new(options, self.config.handle_base)
    }

    /// Interpret `subject explain (s p o)`.
    ///
    /// Returns `Ok(None)` for predicates this form does not handle, an empty
    /// iterator when the pattern cannot be answered (unbound arguments,
    /// missing services, inference disabled), and an error only when the
    /// store or the rule engine fails.
    pub fn interpret_list(
        &self,
        _subject: Option<EntityId>,
        predicate: EntityId,
        objects: &[Option<EntityId>],
        ctx: &mut RequestContext,
    ) -> ProofResult<Option<ExplainIter>> {
        if self.vocabulary.classify(predicate) != Some(ProofPredicate::Explain) {
            return Ok(None);
        }
        let empty = Ok(Some(ExplainIter::empty(predicate)));

        let &[Some(s), Some(p), Some(o)] = objects else {
            tracing::trace!(arity = objects.len(), "explain needs three bound arguments");
            return empty;
        };
        let Some(services) = ctx.services().cloned() else {
            tracing::debug!("explain outside a request with injected services");
            return empty;
        };
        if !services.reporter.inference_enabled() {
            tracing::debug!("explain while inference is disabled");
            return empty;
        }

        let collector =
            JustificationCollector::new(services.store.as_ref(), services.reporter.as_ref());
        let (target, solutions) = collector.explain(Triple::new(s, p, o))?;

        let handle = ctx.scope().fresh_handle()?;
        for solution in &solutions {
            ctx.scope_mut().intern_literal(&solution.rule)?;
        }
        tracing::debug!(
            handle = %handle,
            fact = %target.triple,
            explicit = target.is_explicit(),
            solutions = solutions.len(),
            "explanation cursor opened"
        );
        ctx.insert_cursor(handle, ExplanationCursor::new(solutions));

        Ok(Some(ExplainIter {
            handle: Some(handle),
            predicate,
        }))
    }

    /// Interpret an accessor pattern `handle pred ?obj`.
    ///
    /// Returns `None` for predicates the plugin does not answer in this form.
    /// Otherwise the inner value is the single matching statement, or `None`
    /// when the handle is unbound or unknown, the cursor is not on a
    /// premise, or a bound `object` differs from the current value.
    pub fn interpret(
        &self,
        subject: Option<EntityId>,
        predicate: EntityId,
        object: Option<EntityId>,
        ctx: &RequestContext,
    ) -> Option<Option<SyntheticStatement>> {
        let Some(ProofPredicate::Accessor(accessor)) = self.vocabulary.classify(predicate) else {
            return None;
        };
        Some(subject.and_then(|handle| {
            let cursor = ctx.cursor(handle)?;
            let value = match accessor {
                Accessor::Rule => ctx.scope().literal_id(cursor.current_rule()?)?,
                Accessor::Field(field) => cursor.current_premise_field(field)?,
            };
            if object.is_some_and(|expected| expected != value) {
                return None;
            }
            Some(SyntheticStatement::new(handle, predicate, value))
        }))
    }

    /// Planner cost of an accessor pattern.
    pub fn estimate(
        &self,
        subject: Option<EntityId>,
        predicate: EntityId,
        _object: Option<EntityId>,
    ) -> f64 {
        if subject.is_none() {
            return UNBOUNDED_COST;
        }
        match self.vocabulary.classify(predicate) {
            Some(ProofPredicate::Accessor(_)) => self.config.accessor_cost,
            _ => UNBOUNDED_COST,
        }
    }

    /// Planner cost of an `explain` pattern.
    pub fn estimate_list(
        &self,
        _subject: Option<EntityId>,
        predicate: EntityId,
        objects: &[Option<EntityId>],
    ) -> f64 {
        if self.vocabulary.classify(predicate) != Some(ProofPredicate::Explain) {
            return UNBOUNDED_COST;
        }
        match objects {
            [Some(_), Some(_), Some(_)] => self.config.explain_cost,
            _ => UNBOUNDED_COST,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::graph::SystemGraph;
    use crate::infer::SupportTable;
    use crate::store::MemFactStore;

    fn id(raw: u64) -> EntityId {
        EntityId::new(raw).unwrap()
    }

    fn plugin() -> ProofPlugin {
        let registry = EntityRegistry::starting_from(1_000);
        ProofPlugin::initialize(ProofConfig::default(), &registry).unwrap()
    }

    fn request(plugin: &ProofPlugin) -> (RequestContext, Arc<MemFactStore>, Arc<SupportTable>) {
        let store = Arc::new(MemFactStore::new());
        let table = Arc::new(SupportTable::new());
        let ctx = plugin.preprocess(Some(RequestOptions::new(store.clone(), table.clone())));
        (ctx, store, table)
    }

    #[test]
    fn vocabulary_classifies_all_six() {
        let p = plugin();
        let v = p.vocabulary();
        assert_eq!(v.classify(v.explain), Some(ProofPredicate::Explain));
        assert_eq!(v.classify(v.rule()), Some(ProofPredicate::Accessor(Accessor::Rule)));
        for field in PremiseField::ALL {
            assert_eq!(
                v.classify(v.field(field)),
                Some(ProofPredicate::Accessor(Accessor::Field(field)))
            );
        }
        assert_eq!(v.classify(id(5)), None);
        assert!(p.owns(v.explain));
        assert!(!p.owns(id(5)));
        assert_eq!(p.name(), "proof");
    }

    #[test]
    fn registration_is_stable_across_plugins() {
        let registry = EntityRegistry::starting_from(1_000);
        let a = ProofPlugin::initialize(ProofConfig::default(), &registry).unwrap();
        let b = ProofPlugin::initialize(ProofConfig::default(), &registry).unwrap();
        assert_eq!(a.vocabulary(), b.vocabulary());
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn foreign_predicates_are_not_handled() {
        let p = plugin();
        let (mut ctx, _, _) = request(&p);
        let args = [Some(id(20)), Some(id(21)), Some(id(22))];
        assert!(p.interpret_list(None, id(5), &args, &mut ctx).unwrap().is_none());
        assert!(p.interpret(Some(id(20)), id(5), None, &ctx).is_none());
        // Accessors are not list patterns, explain is not a single-object pattern.
        let rule = p.vocabulary().rule();
        assert!(p.interpret_list(None, rule, &args, &mut ctx).unwrap().is_none());
        assert!(p.interpret(Some(id(20)), p.vocabulary().explain, None, &ctx).is_none());
    }

    #[test]
    fn unbound_arguments_answer_empty() {
        let p = plugin();
        let (mut ctx, store, _) = request(&p);
        store.assert(Triple::new(id(20), id(21), id(22)), SystemGraph::EXPLICIT);
        let explain = p.vocabulary().explain;

        for args in [
            vec![None, Some(id(21)), Some(id(22))],
            vec![Some(id(20)), Some(id(21))],
            vec![Some(id(20)), Some(id(21)), Some(id(22)), Some(id(23))],
        ] {
            let mut it = p.interpret_list(None, explain, &args, &mut ctx).unwrap().unwrap();
            assert!(it.handle().is_none());
            assert!(it.next(&mut ctx).is_none());
        }
        assert_eq!(ctx.live_cursors(), 0);
    }

    #[test]
    fn missing_services_answer_empty() {
        let p = plugin();
        let mut ctx = p.preprocess(None);
        let args = [Some(id(20)), Some(id(21)), Some(id(22))];
        let mut it = p
            .interpret_list(None, p.vocabulary().explain, &args, &mut ctx)
            .unwrap()
            .unwrap();
        assert!(it.next(&mut ctx).is_none());
    }

    #[test]
    fn disabled_inference_answers_empty() {
        let p = plugin();
        let (mut ctx, store, table) = request(&p);
        store.assert(Triple::new(id(20), id(21), id(22)), SystemGraph::EXPLICIT);
        table.set_enabled(false);
        let args = [Some(id(20)), Some(id(21)), Some(id(22))];
        let mut it = p
            .interpret_list(None, p.vocabulary().explain, &args, &mut ctx)
            .unwrap()
            .unwrap();
        assert!(it.next(&mut ctx).is_none());
        assert_eq!(ctx.live_cursors(), 0);
    }

    #[test]
    fn accessors_read_without_advancing() {
        let p = plugin();
        let (mut ctx, store, _) = request(&p);
        let g1 = id(50);
        store.assert(Triple::new(id(20), id(21), id(22)), g1);
        let args = [Some(id(20)), Some(id(21)), Some(id(22))];
        let mut it = p
            .interpret_list(None, p.vocabulary().explain, &args, &mut ctx)
            .unwrap()
            .unwrap();
        let handle = it.handle().unwrap();
        let subject_pred = p.vocabulary().field(PremiseField::Subject);

        // Before the first advance the cursor is not on a premise.
        assert_eq!(p.interpret(Some(handle), subject_pred, None, &ctx), Some(None));

        let row = it.next(&mut ctx).unwrap();
        assert_eq!(row, SyntheticStatement::new(handle, p.vocabulary().explain, handle));
        for _ in 0..3 {
            let stmt = p.interpret(Some(handle), subject_pred, None, &ctx).unwrap().unwrap();
            assert_eq!(stmt.object, id(20));
        }
        let ctx_pred = p.vocabulary().field(PremiseField::Context);
        let stmt = p.interpret(Some(handle), ctx_pred, None, &ctx).unwrap().unwrap();
        assert_eq!(stmt.object, g1);

        let rule = p.interpret(Some(handle), p.vocabulary().rule(), None, &ctx).unwrap().unwrap();
        assert_eq!(ctx.literal(rule.object), Some("explicit"));

        assert!(it.next(&mut ctx).is_none());
        assert_eq!(p.interpret(Some(handle), subject_pred, None, &ctx), Some(None));
    }

    #[test]
    fn bound_object_filters() {
        let p = plugin();
        let (mut ctx, store, _) = request(&p);
        store.assert(Triple::new(id(20), id(21), id(22)), SystemGraph::EXPLICIT);
        let args = [Some(id(20)), Some(id(21)), Some(id(22))];
        let mut it = p
            .interpret_list(None, p.vocabulary().explain, &args, &mut ctx)
            .unwrap()
            .unwrap();
        let handle = it.handle().unwrap();
        it.next(&mut ctx).unwrap();

        let obj_pred = p.vocabulary().field(PremiseField::Object);
        assert!(p.interpret(Some(handle), obj_pred, Some(id(22)), &ctx).unwrap().is_some());
        assert!(p.interpret(Some(handle), obj_pred, Some(id(23)), &ctx).unwrap().is_none());
    }

    #[test]
    fn unknown_or_unbound_handle_answers_empty() {
        let p = plugin();
        let (ctx, _, _) = request(&p);
        let rule = p.vocabulary().rule();
        assert_eq!(p.interpret(Some(id(424_242)), rule, None, &ctx), Some(None));
        assert_eq!(p.interpret(None, rule, None, &ctx), Some(None));
    }

    #[test]
    fn close_releases_cursor() {
        let p = plugin();
        let (mut ctx, store, _) = request(&p);
        store.assert(Triple::new(id(20), id(21), id(22)), SystemGraph::EXPLICIT);
        let args = [Some(id(20)), Some(id(21)), Some(id(22))];
        let it = p
            .interpret_list(None, p.vocabulary().explain, &args, &mut ctx)
            .unwrap()
            .unwrap();
        let handle = it.handle().unwrap();
        assert_eq!(ctx.live_cursors(), 1);
        it.close(&mut ctx);
        assert_eq!(ctx.live_cursors(), 0);
        assert_eq!(p.interpret(Some(handle), p.vocabulary().rule(), None, &ctx), Some(None));
    }

    #[test]
    fn cost_contract() {
        let p = plugin();
        let v = *p.vocabulary();
        let bound = [Some(id(20)), Some(id(21)), Some(id(22))];

        assert_eq!(p.estimate_list(None, v.explain, &bound), 10.0);
        assert_eq!(
            p.estimate_list(None, v.explain, &[Some(id(20)), None, Some(id(22))]),
            UNBOUNDED_COST
        );
        assert_eq!(p.estimate_list(None, v.explain, &bound[..2]), UNBOUNDED_COST);
        assert_eq!(p.estimate_list(None, v.rule(), &bound), UNBOUNDED_COST);

        for accessor in [v.rule(), v.field(PremiseField::Context)] {
            assert_eq!(p.estimate(Some(id(9_000)), accessor, None), 1.0);
            assert_eq!(p.estimate(None, accessor, None), UNBOUNDED_COST);
        }
        assert_eq!(p.estimate(Some(id(9_000)), id(5), None), UNBOUNDED_COST);
        assert!(p.estimate_list(None, v.explain, &bound) < UNBOUNDED_COST);
    }
}
