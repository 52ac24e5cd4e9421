// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # akh-proof
//!
//! Proof plugin for a forward-chaining rule engine: answers "why does this
//! fact hold?" as a stream of rule applications and their premises.
//!
//! ## Architecture
//!
//! - **Solutions** (`solution`): one rule application with its annotated premises
//! - **Collection** (`collect`): classifies a fact and gathers its deduplicated justifications
//! - **Cursor** (`cursor`): forward-only walk over a fact's premises
//! - **Dispatch** (`dispatch`): the `explain` / `rule` / `subject` / `predicate` /
//!   `object` / `context` query predicates and their cost estimates
//! - **Collaborators** (`store`, `infer`): the fact store and derivation
//!   reporter the host injects per request, with in-memory implementations
//!
//! ## Library usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use akh_proof::config::ProofConfig;
//! use akh_proof::dispatch::{ProofPlugin, RequestOptions};
//! use akh_proof::graph::SystemGraph;
//! use akh_proof::infer::SupportTable;
//! use akh_proof::store::MemFactStore;
//! use akh_proof::symbol::{EntityId, EntityRegistry};
//!
//! let registry = EntityRegistry::starting_from(1_000);
//! let plugin = ProofPlugin::initialize(ProofConfig::default(), &registry).unwrap();
//!
//! let store = Arc::new(MemFactStore::new());
//! let rules = Arc::new(SupportTable::new());
//! let (s, p, o) = (EntityId::new(20).unwrap(), EntityId::new(21).unwrap(), EntityId::new(22).unwrap());
//! store.assert(akh_proof::graph::Triple::new(s, p, o), SystemGraph::EXPLICIT);
//!
//! let mut ctx = plugin.preprocess(Some(RequestOptions::new(store, rules)));
//! let explain = plugin.vocabulary().explain;
//! let mut rows = plugin
//!     .interpret_list(None, explain, &[Some(s), Some(p), Some(o)], &mut ctx)
//!     .unwrap()
//!     .unwrap();
//! while let Some(row) = rows.next(&mut ctx) {
//!     let rule = plugin.vocabulary().rule();
//!     let bound = plugin.interpret(Some(row.subject), rule, None, &ctx).flatten().unwrap();
//!     println!("{}", ctx.literal(bound.object).unwrap_or_default());
//! }
//! ```

pub mod collect;
pub mod config;
pub mod cursor;
pub mod dispatch;
pub mod error;
pub mod graph;
pub mod infer;
pub mod solution;
pub mod store;
pub mod symbol;
