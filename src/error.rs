//! Rich diagnostic error types for the akh-proof plugin.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. Only collaborator failures and
//! configuration problems are errors: a pattern that cannot be answered
//! (unbound arguments, unknown handle, inference disabled) is an empty
//! result, never an `Err`.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the proof plugin.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum ProofError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Derivation(#[from] DerivationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("statement lookup failed for ({subject}, {predicate}, {object}): {message}")]
    #[diagnostic(
        code(akh::proof::store::lookup),
        help(
            "The fact store could not answer a point lookup. \
             The explanation for this fact is unavailable; check the backing store."
        )
    )]
    Lookup {
        subject: u64,
        predicate: u64,
        object: u64,
        message: String,
    },

    #[error("fact store unavailable: {message}")]
    #[diagnostic(
        code(akh::proof::store::unavailable),
        help("The fact store is shut down or not yet initialized.")
    )]
    Unavailable { message: String },
}

// ---------------------------------------------------------------------------
// Derivation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum DerivationError {
    #[error("rule '{rule}' failed while reporting support: {message}")]
    #[diagnostic(
        code(akh::proof::derivation::report),
        help(
            "The inference engine raised an error while enumerating premises. \
             No partial explanation is returned for this fact."
        )
    )]
    Report { rule: String, message: String },

    #[error("inference engine unavailable: {message}")]
    #[diagnostic(
        code(akh::proof::derivation::unavailable),
        help("The rule engine could not start a support search for this fact.")
    )]
    Unavailable { message: String },
}

// ---------------------------------------------------------------------------
// Symbol errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SymbolError {
    #[error("entity allocator exhausted: cannot allocate more than u64::MAX ids")]
    #[diagnostic(
        code(akh::proof::symbol::exhausted),
        help(
            "The request-scoped id space is exhausted. Lower `handle_base` \
             in the plugin configuration or check for allocation loops."
        )
    )]
    AllocatorExhausted,

    #[error("IRI <{iri}> is already registered as entity {existing_id}")]
    #[diagnostic(
        code(akh::proof::symbol::duplicate_iri),
        help("Each IRI maps to exactly one entity id. Reuse the existing id.")
    )]
    DuplicateIri { iri: String, existing_id: u64 },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    #[diagnostic(
        code(akh::proof::config::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config file {path}")]
    #[diagnostic(
        code(akh::proof::config::write),
        help("Check that the parent directory is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {message}")]
    #[diagnostic(
        code(akh::proof::config::parse),
        help("Fix the TOML syntax. Unknown keys are rejected.")
    )]
    Parse { path: String, message: String },

    #[error("failed to serialize config for {path}: {message}")]
    #[diagnostic(
        code(akh::proof::config::serialize),
        help("The configuration holds a value TOML cannot represent.")
    )]
    Serialize { path: String, message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(akh::proof::config::invalid),
        help(
            "The namespace must end in '/' or '#', costs must be finite and positive, \
             and handle_base must be non-zero."
        )
    )]
    Invalid { message: String },
}

/// Convenience result type for plugin operations.
pub type ProofResult<T> = std::result::Result<T, ProofError>;
