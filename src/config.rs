//! Plugin configuration.
//!
//! Stored as TOML. Every key is optional; missing keys take the defaults
//! below.
//!
//! ```toml
//! namespace = "http://www.ontotext.com/proof/"
//! explain_cost = 10.0
//! accessor_cost = 1.0
//! handle_base = 1099511627776
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ProofResult};

/// Namespace the six query predicates are registered under.
pub const DEFAULT_NAMESPACE: &str = "http://www.ontotext.com/proof/";

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_explain_cost() -> f64 {
    10.0
}

fn default_accessor_cost() -> f64 {
    1.0
}

fn default_handle_base() -> u64 {
    1 << 40
}

/// Configuration for the proof plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProofConfig {
    /// IRI prefix of `explain`, `rule`, `subject`, `predicate`, `object`, `context`.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Planner cost reported for a fully bound `explain` pattern.
    #[serde(default = "default_explain_cost")]
    pub explain_cost: f64,
    /// Planner cost reported for an accessor pattern with a bound handle.
    #[serde(default = "default_accessor_cost")]
    pub accessor_cost: f64,
    /// First id handed out by each request's handle allocator.
    #[serde(default = "default_handle_base")]
    pub handle_base: u64,
}

impl Default for ProofConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            explain_cost: default_explain_cost(),
            accessor_cost: default_accessor_cost(),
            handle_base: default_handle_base(),
        }
    }
}

impl ProofConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> ProofResult<Self> {
        Self::parse(content, "<inline>")
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> ProofResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ProofResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(())
    }

    fn parse(content: &str, origin: &str) -> ProofResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the plugin relies on.
    pub fn validate(&self) -> ProofResult<()> {
        if self.namespace.is_empty()
            || !(self.namespace.ends_with('/') || self.namespace.ends_with('#'))
        {
            return Err(ConfigError::Invalid {
                message: format!("namespace '{}' must end in '/' or '#'", self.namespace),
            }
            .into());
        }
        for (name, cost) in [
            ("explain_cost", self.explain_cost),
            ("accessor_cost", self.accessor_cost),
        ] {
            if !cost.is_finite() || cost <= 0.0 {
                return Err(ConfigError::Invalid {
                    message: format!("{name} must be finite and positive, got {cost}"),
                }
                .into());
            }
        }
        if self.handle_base == 0 {
            return Err(ConfigError::Invalid {
                message: "handle_base must be non-zero".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Full IRI of a predicate local name.
    pub fn iri(&self, local: &str) -> String {
        format!("{}{local}", self.namespace)
    }
}
