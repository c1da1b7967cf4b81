//! Artifact rendering.
//!
//! An artifact is one Rust module. Each [`Unit`] becomes one load function
//! with one `target.load(..)?` statement per scope, scopes sorted by name.
//! Rendering is pure, so equal recordings always give identical bytes.

use crate::config::GenerateConfig;
use encore_core::{CoreError, CoreResult};
use encore_literal::emit::string_literal;
use encore_literal::{Expr, Serializer};
use encore_recorder::{Recording, RecordingSource};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Header marking generated artifacts
pub const HEADER: &str = "// Code generated by encore. DO NOT EDIT.";

const INDENT: usize = 4;

/// Options narrowing what is generated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenOptions {
    scopes: Option<BTreeSet<String>>,
}

impl GenOptions {
    /// Generate every scope
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate only the named scopes
    #[must_use]
    pub fn only<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scopes: Some(scopes.into_iter().map(Into::into).collect()),
        }
    }

    /// Check whether a scope is generated
    #[must_use]
    pub fn includes(&self, scope: &str) -> bool {
        self.scopes.as_ref().is_none_or(|scopes| scopes.contains(scope))
    }
}

/// One load function of an artifact
#[derive(Debug, Clone)]
pub struct Unit {
    function: String,
    scopes: BTreeMap<String, Vec<Recording>>,
}

impl Unit {
    /// Create a unit from scopes and their recordings
    pub fn new(function: impl Into<String>, scopes: BTreeMap<String, Vec<Recording>>) -> Self {
        Self {
            function: function.into(),
            scopes,
        }
    }

    /// Create a unit from a source's snapshot
    pub fn from_source(function: impl Into<String>, source: &dyn RecordingSource) -> Self {
        Self::new(function, source.snapshot())
    }

    /// Name of the load function
    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }
}

/// Renders recordings into artifact source
#[derive(Debug, Clone)]
pub struct Generator {
    serializer: Serializer,
    imports: Vec<String>,
    options: GenOptions,
}

impl Generator {
    /// Create a generator from the configuration
    #[must_use]
    pub fn new(config: &GenerateConfig) -> Self {
        Self {
            serializer: Serializer::new(config.literal_config()),
            imports: config.imports.clone(),
            options: GenOptions::default(),
        }
    }

    /// Set the generation options
    #[must_use]
    pub fn with_options(mut self, options: GenOptions) -> Self {
        self.options = options;
        self
    }

    fn runtime(&self) -> &str {
        &self.serializer.config().runtime
    }

    /// Render an artifact holding every unit
    ///
    /// # Errors
    ///
    /// Returns error if two units share a function name or a recorded
    /// value has no literal representation
    pub fn render(&self, units: &[Unit]) -> CoreResult<String> {
        let mut seen = BTreeSet::new();
        for unit in units {
            if !seen.insert(unit.function.as_str()) {
                return Err(CoreError::DuplicateName {
                    name: unit.function.clone(),
                });
            }
        }

        let mut out = String::new();
        out.push_str(HEADER);
        out.push_str("\n\n#![allow(unused_imports)]\n");
        if !self.imports.is_empty() {
            out.push('\n');
            for import in &self.imports {
                out.push_str(&format!("use {import};\n"));
            }
        }
        for unit in units {
            out.push('\n');
            self.write_unit(&mut out, unit)?;
        }
        Ok(out)
    }

    fn write_unit(&self, out: &mut String, unit: &Unit) -> CoreResult<()> {
        let runtime = self.runtime();
        out.push_str("/// Loads recordings captured by encore.\n");
        out.push_str(&format!(
            "pub fn {}(target: &impl {runtime}::Load) -> {runtime}::Result<()> {{\n",
            unit.function
        ));
        let mut empty = true;
        for (scope, recordings) in &unit.scopes {
            if !self.options.includes(scope) {
                continue;
            }
            let statement = self.statement(scope, recordings)?;
            out.push_str("    ");
            statement.write(out, INDENT, 1);
            out.push_str(";\n");
            empty = false;
            debug!(scope = %scope, count = recordings.len(), "rendered scope");
        }
        if empty {
            out.push_str("    let _ = target;\n");
        }
        out.push_str("    Ok(())\n}\n");
        Ok(())
    }

    fn statement(&self, scope: &str, recordings: &[Recording]) -> CoreResult<Expr> {
        let elems = recordings
            .iter()
            .map(|recording| self.recording(scope, recording))
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(Expr::call(
            "target.load",
            vec![Expr::atom(string_literal(scope)), Expr::list("vec!", elems)],
        )
        .suffixed("?"))
    }

    fn recording(&self, scope: &str, recording: &Recording) -> CoreResult<Expr> {
        let type_name = recording.value.type_name();
        let hint = self.serializer.hint(type_name);
        let value = recording.value.introspect()?;
        let expr = self
            .serializer
            .value_expr(&value, hint.as_ref())
            .inspect_err(|err| debug!(scope, key = %recording.key, error = %err, "literal failed"))?;
        let head = match &hint {
            Some(hint) => format!("{}::Recording::new::<{hint}>", self.runtime()),
            None => format!("{}::Recording::new", self.runtime()),
        };
        Ok(Expr::call(head, vec![Expr::atom(recording.key.literal()), expr]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_recorder::Recorder;
    use serde::Serialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize)]
    struct Dog {
        name: String,
        breed: String,
        age: u32,
        note: String,
    }

    fn generator() -> Generator {
        let config = GenerateConfig::default()
            .with_crate_name("encore_gen")
            .with_default::<Dog>()
            .unwrap();
        Generator::new(&config)
    }

    fn recorder() -> Recorder {
        let recorder = Recorder::new();
        recorder.enable_recording(true);
        recorder
    }

    #[test]
    fn test_render_keyed_scope() {
        let recorder = recorder();
        let dog = Dog {
            name: "Lido".to_string(),
            breed: "Terrier".to_string(),
            ..Default::default()
        };
        recorder.record("kv_example", "dog1", dog).unwrap();

        let rendered = generator()
            .render(&[Unit::from_source("load", &recorder)])
            .unwrap();
        let expected = r#"// Code generated by encore. DO NOT EDIT.

#![allow(unused_imports)]

use super::*;

/// Loads recordings captured by encore.
pub fn load(target: &impl encore::Load) -> encore::Result<()> {
    target.load(
        "kv_example",
        vec![
            encore::Recording::new::<crate::generator::tests::Dog>(
                "dog1",
                crate::generator::tests::Dog {
                    name: "Lido".into(),
                    breed: "Terrier".into(),
                    ..Default::default()
                },
            ),
        ],
    )?;
    Ok(())
}
"#;
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_sequential_and_sorted() {
        let recorder = recorder();
        recorder.record_next("b_seq", 1u8).unwrap();
        recorder.record_next("b_seq", 2u8).unwrap();
        recorder.record("a_kv", "n", 7i64).unwrap();

        let rendered = generator()
            .render(&[Unit::from_source("load", &recorder)])
            .unwrap();
        let a = rendered.find("\"a_kv\"").unwrap();
        let b = rendered.find("\"b_seq\"").unwrap();
        assert!(a < b);
        assert!(rendered.contains(
            "    target.load(\"a_kv\", vec![encore::Recording::new::<i64>(\"n\", 7)])?;\n"
        ));
        assert!(rendered.contains("encore::Recording::new::<u8>(0u64, 1)"));
        assert!(rendered.contains("encore::Recording::new::<u8>(1u64, 2)"));
    }

    #[test]
    fn test_render_empty_unit() {
        let config = GenerateConfig {
            imports: vec![],
            ..GenerateConfig::default()
        };
        let rendered = Generator::new(&config)
            .render(&[Unit::new("load", BTreeMap::new())])
            .unwrap();
        assert_eq!(
            rendered,
            "// Code generated by encore. DO NOT EDIT.\n\n#![allow(unused_imports)]\n\n\
             /// Loads recordings captured by encore.\n\
             pub fn load(target: &impl encore::Load) -> encore::Result<()> {\n    let _ = target;\n    Ok(())\n}\n"
        );
    }

    #[test]
    fn test_scope_filter() {
        let recorder = recorder();
        recorder.record("keep", "k", 1u8).unwrap();
        recorder.record("drop", "k", 1u8).unwrap();
        let rendered = generator()
            .with_options(GenOptions::only(["keep"]))
            .render(&[Unit::from_source("load", &recorder)])
            .unwrap();
        assert!(rendered.contains("\"keep\""));
        assert!(!rendered.contains("\"drop\""));
    }

    #[test]
    fn test_duplicate_function_rejected() {
        let units = [Unit::new("load", BTreeMap::new()), Unit::new("load", BTreeMap::new())];
        assert!(matches!(
            generator().render(&units),
            Err(CoreError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_render_is_deterministic() {
        let recorder = recorder();
        let mut map = std::collections::HashMap::new();
        for (i, name) in ["x", "y", "z", "w"].into_iter().enumerate() {
            map.insert(name.to_string(), i as u32);
        }
        recorder.record("maps", "m", map).unwrap();
        let units = [Unit::from_source("load", &recorder)];
        assert_eq!(generator().render(&units).unwrap(), generator().render(&units).unwrap());
    }

    proptest::proptest! {
        #[test]
        fn prop_every_scope_rendered_once(
            names in proptest::collection::btree_set("[a-z]{1,8}", 0..6)
        ) {
            let recorder = recorder();
            for name in &names {
                recorder.record_next(name, 1u8).unwrap();
            }
            let rendered = generator().render(&[Unit::from_source("load", &recorder)]).unwrap();
            for name in &names {
                let needle = format!("(\"{name}\",");
                proptest::prop_assert_eq!(rendered.matches(needle.as_str()).count(), 1);
            }
        }
    }
}
