//! Configuration for parsing, rewriting and migration
//!
//! Loaded from TOML (`drl-rewrite.toml` in the CLI). Every section and field
//! is optional; unknown keys are rejected.
//!
//! ```toml
//! [parser]
//! reject_empty = true
//! max_errors = 100
//!
//! [rewrite]
//! report_conflicts = true
//!
//! [migration]
//! rewrite_half_constraints = true
//! prefix_custom_operators = true
//! replace_lhs_logical_infix = true
//! rewrite_agenda_group = true
//! extra_builtin_operators = ["supersetOf"]
//! ```

use serde::{Deserialize, Serialize};

use crate::Result;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DrlConfig {
    pub parser: ParserConfig,
    pub rewrite: RewriteConfig,
    pub migration: MigrationOptions,
}

impl DrlConfig {
    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::error::DrlError::config_error(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Fail with `DrlError::EmptyInput` on empty (or whitespace-only) input
    pub reject_empty: bool,
    /// Stop recording syntax errors after this many; parsing still completes
    pub max_errors: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            reject_empty: true,
            max_errors: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteConfig {
    /// Emit a `RewriteConflict` warning for every dropped edit
    pub report_conflicts: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            report_conflicts: true,
        }
    }
}

/// Switches of the DRL 10 migration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrationOptions {
    pub rewrite_half_constraints: bool,
    pub prefix_custom_operators: bool,
    pub replace_lhs_logical_infix: bool,
    pub rewrite_agenda_group: bool,
    /// Operators to treat as built-ins in addition to the DRL ones
    pub extra_builtin_operators: Vec<String>,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            rewrite_half_constraints: true,
            prefix_custom_operators: true,
            replace_lhs_logical_infix: true,
            rewrite_agenda_group: true,
            extra_builtin_operators: Vec::new(),
        }
    }
}
