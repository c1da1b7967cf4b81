//! Generation configuration.
//!
//! Values come from `ENCORE_*` environment variables or a JSON file.
//! Anything unset keeps its default.

use encore_core::{CoreError, CoreResult};
use encore_literal::{Defaults, LiteralConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Enables recording when truthy
pub const RECORD_ENV: &str = "ENCORE_RECORD";
/// Splits artifacts by originating source file when truthy
pub const SPLIT_FILES_ENV: &str = "ENCORE_SPLIT_FILES";
/// Destination directory of artifacts
pub const DEST_ENV: &str = "ENCORE_DEST";
/// File name of the single artifact
pub const FILE_NAME_ENV: &str = "ENCORE_FILENAME";
/// Crate whose paths are written as `crate::`
pub const CRATE_ENV: &str = "ENCORE_CRATE";

/// Artifact generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Record instead of replaying
    pub record: bool,
    /// Write one artifact per originating source file
    pub split_files: bool,
    /// Destination directory
    pub dest: PathBuf,
    /// File name of the single artifact
    pub file_name: String,
    /// Crate whose paths are written as `crate::`
    pub crate_name: Option<String>,
    /// Path of the runtime crate in generated code
    pub runtime: String,
    /// `use` paths at the top of each artifact
    pub imports: Vec<String>,
    /// Name of the generated load function
    pub function: String,
    /// Struct defaults that literal fields may be elided against
    #[serde(skip)]
    pub defaults: Defaults,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            record: false,
            split_files: false,
            dest: PathBuf::from("."),
            file_name: "recordings.rs".to_string(),
            crate_name: None,
            runtime: "encore".to_string(),
            imports: vec!["super::*".to_string()],
            function: "load".to_string(),
            defaults: Defaults::new(),
        }
    }
}

impl GenerateConfig {
    /// Read the configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns error if a variable holds an invalid value
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through a variable lookup
    ///
    /// # Errors
    ///
    /// Returns error if a variable holds an invalid value
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(RECORD_ENV) {
            config.record = parse_flag(RECORD_ENV, &value)?;
        }
        if let Some(value) = lookup(SPLIT_FILES_ENV) {
            config.split_files = parse_flag(SPLIT_FILES_ENV, &value)?;
        }
        if let Some(value) = lookup(DEST_ENV) {
            config.dest = PathBuf::from(value);
        }
        if let Some(value) = lookup(FILE_NAME_ENV) {
            config.file_name = value;
        }
        if let Some(value) = lookup(CRATE_ENV) {
            config.crate_name = Some(value);
        }
        config.validate()?;
        Ok(config)
    }

    /// Read the configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed, or holds an
    /// invalid value
    pub fn from_json_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| CoreError::io(path, &err))?;
        let config: Self = serde_json::from_str(&text).map_err(|err| CoreError::Config {
            field: path.display().to_string(),
            reason: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Set the crate whose paths are written as `crate::`
    #[must_use]
    pub fn with_crate_name(mut self, crate_name: impl Into<String>) -> Self {
        self.crate_name = Some(crate_name.into());
        self
    }

    /// Set the destination directory
    #[must_use]
    pub fn with_dest(mut self, dest: impl Into<PathBuf>) -> Self {
        self.dest = dest.into();
        self
    }

    /// Register a struct's `Default` value for literal field elision
    ///
    /// # Errors
    ///
    /// Returns error if the default is not a struct with named fields
    pub fn with_default<T: Default + Serialize>(mut self) -> CoreResult<Self> {
        self.defaults.insert::<T>()?;
        Ok(self)
    }

    /// Check every field
    ///
    /// # Errors
    ///
    /// Returns error naming the first invalid field
    pub fn validate(&self) -> CoreResult<()> {
        let valid_file = self.file_name.ends_with(".rs")
            && self.file_name.len() > 3
            && !self.file_name.contains(['/', '\\']);
        if !valid_file {
            return Err(invalid("file_name", "expected a bare `.rs` file name"));
        }
        if !is_ident(&self.function) {
            return Err(invalid("function", "expected an identifier"));
        }
        if self.runtime.is_empty() || self.runtime.split("::").any(|s| !s.is_empty() && !is_ident(s)) {
            return Err(invalid("runtime", "expected a crate path"));
        }
        if self.imports.iter().any(|import| import.trim().is_empty()) {
            return Err(invalid("imports", "empty import"));
        }
        if self.crate_name.as_deref().is_some_and(str::is_empty) {
            return Err(invalid("crate_name", "empty crate name"));
        }
        Ok(())
    }

    /// Serializer configuration for artifacts
    #[must_use]
    pub fn literal_config(&self) -> LiteralConfig {
        let config = LiteralConfig::new()
            .with_runtime(self.runtime.clone())
            .with_defaults(self.defaults.clone());
        match &self.crate_name {
            Some(name) => config.with_crate_name(name.clone()),
            None => config,
        }
    }

    /// Path of the single artifact
    #[must_use]
    pub fn artifact_path(&self) -> PathBuf {
        self.dest.join(&self.file_name)
    }
}

fn parse_flag(field: &str, value: &str) -> CoreResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(invalid(field, format!("expected a boolean, found {other:?}"))),
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> CoreError {
    CoreError::Config {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn is_ident(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
