//! Serializer configuration.

use crate::defaults::Defaults;
use crate::error::LiteralError;
use crate::types::{PathRules, TypeExpr};
use encore_core::canonical::{Canonical, STRING_FORM_TYPES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Literal serializer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiteralConfig {
    /// Path of the runtime support crate in generated code
    pub runtime: String,
    /// Crate whose paths are written as `crate::`
    pub crate_name: Option<String>,
    /// Types rendered through `decode` when they appear in a hinted position
    pub canonical_types: BTreeSet<String>,
    /// Struct defaults that fields may be elided against
    #[serde(skip)]
    pub defaults: Defaults,
}

impl Default for LiteralConfig {
    fn default() -> Self {
        Self {
            runtime: "encore".to_string(),
            crate_name: None,
            canonical_types: STRING_FORM_TYPES.iter().map(|path| (*path).to_string()).collect(),
            defaults: Defaults::new(),
        }
    }
}

impl LiteralConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the runtime crate path
    #[must_use]
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    /// Set the crate whose paths become `crate::`
    #[must_use]
    pub fn with_crate_name(mut self, crate_name: impl Into<String>) -> Self {
        self.crate_name = Some(crate_name.into());
        self
    }

    /// Register a canonical type by its capability
    ///
    /// The type's serde form must be its canonical text.
    #[must_use]
    pub fn with_canonical<T: Canonical>(mut self) -> Self {
        self.canonical_types.insert(T::TYPE_PATH.to_string());
        self
    }

    /// Register a struct's `Default` value
    ///
    /// Fields equal to it are left out of the struct's literals and
    /// restored through `..Default::default()`. Without a registered
    /// default every serialized field is written out.
    ///
    /// # Errors
    ///
    /// Returns error if the default is not a struct with named fields
    pub fn with_default<T: Default + Serialize>(mut self) -> Result<Self, LiteralError> {
        self.defaults.insert::<T>()?;
        Ok(self)
    }

    /// Replace the table of registered defaults
    #[must_use]
    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Path rules derived from this configuration
    #[must_use]
    pub fn path_rules(&self) -> PathRules {
        PathRules::new(self.crate_name.as_deref())
    }

    /// Check whether a hinted type is rendered through `decode`
    #[must_use]
    pub fn is_canonical(&self, hint: &TypeExpr) -> bool {
        self.canonical_types.contains(&hint.to_string())
    }
}
