//! Run orchestration.
//!
//! A [`Session`] owns the recorder and registry of one test run. The
//! record/replay decision is made once; when recording, the stores are
//! reset first and artifacts are generated after every test has passed.
//! [`Harness`] drives a `harness = false` test binary through that
//! lifecycle.

use crate::config::GenerateConfig;
use crate::generator::{Generator, Unit};
use crate::identity::{CaseIdentity, TestIdentity};
use crate::sink::{FileSink, Sink};
use encore_core::{CoreError, CoreResult, Key};
use encore_recorder::{Load, Recordable, Recorder, Recording, Registry};
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Recorders, configuration and mode of one test run
#[derive(Debug)]
pub struct Session {
    recorder: Recorder,
    registry: Registry,
    config: GenerateConfig,
    decision: OnceLock<bool>,
}

impl Session {
    /// Create a session
    #[must_use]
    pub fn new(config: GenerateConfig) -> Self {
        Self {
            recorder: Recorder::new(),
            registry: Registry::new(),
            config,
            decision: OnceLock::new(),
        }
    }

    /// Create a session configured from the environment
    ///
    /// # Errors
    ///
    /// Returns error if an `ENCORE_*` variable is invalid
    pub fn from_env() -> CoreResult<Self> {
        Ok(Self::new(GenerateConfig::from_env()?))
    }

    /// Scoped recorder
    #[must_use]
    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Registry of named recorders
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Configuration
    #[must_use]
    pub fn config(&self) -> &GenerateConfig {
        &self.config
    }

    /// Name of the load function for registry recordings
    #[must_use]
    pub fn registry_function(&self) -> String {
        format!("{}_registry", self.config.function)
    }

    /// Fix the mode for this run
    ///
    /// The first call decides; when it enables recording, all stores are
    /// reset before recording is switched on. Repeating the same decision
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Returns error if a different decision was already made
    pub fn run_with_decision(&self, recording_enabled: bool) -> CoreResult<()> {
        let decided = *self.decision.get_or_init(|| {
            if recording_enabled {
                self.recorder.reset();
                self.registry.reset();
            }
            self.recorder.enable_recording(recording_enabled);
            self.registry.enable_recording(recording_enabled);
            info!(recording = recording_enabled, "mode decided");
            recording_enabled
        });
        if decided != recording_enabled {
            return Err(CoreError::Config {
                field: "record".to_string(),
                reason: format!("mode already decided as recording={decided}"),
            });
        }
        Ok(())
    }

    /// Fix the mode from the configuration's `record` flag
    ///
    /// # Errors
    ///
    /// Returns error if a different decision was already made
    pub fn decide(&self) -> CoreResult<()> {
        self.run_with_decision(self.config.record)
    }

    /// Check whether this run records
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.decision.get().copied().unwrap_or(false)
    }

    /// Handle for recording into the scope of a test
    pub fn scope(&self, identity: &dyn TestIdentity) -> Scope<'_> {
        let name = identity.scope();
        if self.is_recording() {
            if let Some(origin) = identity.origin() {
                self.recorder.set_origin(&name, origin);
            }
        }
        Scope {
            session: self,
            name,
        }
    }

    /// Render every artifact of this run without writing anything
    ///
    /// # Errors
    ///
    /// Returns error if a recorded value has no literal representation or
    /// a split artifact has no usable name
    pub fn render_artifacts(&self) -> CoreResult<BTreeMap<PathBuf, String>> {
        let generator = Generator::new(&self.config);
        let main = self.config.artifact_path();

        let mut groups: BTreeMap<PathBuf, BTreeMap<String, Vec<Recording>>> = BTreeMap::new();
        groups.entry(main.clone()).or_default();
        for (scope, recordings) in self.recorder.snapshot() {
            let path = match self.recorder.origin(&scope) {
                Some(origin) if self.config.split_files => self.config.dest.join(split_name(&origin)?),
                _ => main.clone(),
            };
            groups.entry(path).or_default().insert(scope, recordings);
        }

        let mut artifacts = BTreeMap::new();
        for (path, scopes) in groups {
            let mut units = vec![Unit::new(self.config.function.clone(), scopes)];
            if path == main {
                units.push(Unit::from_source(self.registry_function(), &self.registry));
            }
            artifacts.insert(path, generator.render(&units)?);
        }
        Ok(artifacts)
    }

    /// Generate artifacts at the end of a recording run
    ///
    /// Does nothing in replay. Every artifact is rendered before the first
    /// one is written.
    ///
    /// # Errors
    ///
    /// Returns error if rendering or writing fails
    pub fn finalize_and_generate(&self, sink: &dyn Sink) -> CoreResult<Vec<PathBuf>> {
        if !self.is_recording() {
            debug!("replay run, artifacts left untouched");
            return Ok(Vec::new());
        }
        let artifacts = self.render_artifacts()?;
        let mut written = Vec::with_capacity(artifacts.len());
        for (path, contents) in artifacts {
            sink.write(&path, &contents)?;
            info!(path = %path.display(), "wrote recording artifact");
            written.push(path);
        }
        Ok(written)
    }
}

impl Load for Session {
    fn load(&self, name: &str, recordings: Vec<Recording>) -> CoreResult<()> {
        self.recorder.load(name, recordings)
    }
}

fn split_name(origin: &Path) -> CoreResult<String> {
    origin
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| format!("{stem}_recordings.rs"))
        .ok_or_else(|| CoreError::Config {
            field: "split_files".to_string(),
            reason: format!("cannot name an artifact after {}", origin.display()),
        })
}

/// Recording handle bound to one scope
#[derive(Debug, Clone)]
pub struct Scope<'s> {
    session: &'s Session,
    name: String,
}

impl<'s> Scope<'s> {
    /// Scope name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Session the scope belongs to
    #[must_use]
    pub fn session(&self) -> &'s Session {
        self.session
    }

    /// Record or replay the value under `key`
    ///
    /// # Errors
    ///
    /// Returns error on a duplicate key while recording, or a missing key
    /// while replaying
    pub fn record<T: Recordable + Clone>(&self, key: impl Into<Key>, live: T) -> CoreResult<T> {
        self.session.recorder.record(&self.name, key, live)
    }

    /// Record or replay, computing the live value only while recording
    ///
    /// # Errors
    ///
    /// Same as [`record`](Self::record)
    pub fn record_with<T, F>(&self, key: impl Into<Key>, live: F) -> CoreResult<T>
    where
        T: Recordable + Clone,
        F: FnOnce() -> T,
    {
        self.session.recorder.record_with(&self.name, key, live)
    }

    /// Record or replay under the next sequential key
    ///
    /// # Errors
    ///
    /// Same as [`record`](Self::record)
    pub fn record_next<T: Recordable + Clone>(&self, live: T) -> CoreResult<T> {
        self.session.recorder.record_next(&self.name, live)
    }
}

/// Body of a test case
pub type CaseFn = fn(&Scope<'_>) -> CoreResult<()>;

/// Named test case
#[derive(Debug, Clone, Copy)]
pub struct Case {
    name: &'static str,
    file: &'static str,
    run: CaseFn,
}

impl Case {
    /// Create a case; [`case!`](crate::case) fills in the name and file
    #[must_use]
    pub const fn new(name: &'static str, file: &'static str, run: CaseFn) -> Self {
        Self { name, file, run }
    }

    /// Case name, also its scope name
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Build a [`Case`] from a function, named after it
#[macro_export]
macro_rules! case {
    ($func:ident) => {
        $crate::runner::Case::new(stringify!($func), file!(), $func)
    };
}

/// Outcome of a harness run
#[derive(Debug, Default)]
pub struct Report {
    /// Cases that passed
    pub passed: Vec<&'static str>,
    /// Cases that failed, with the reason
    pub failed: Vec<(&'static str, String)>,
    /// Cases skipped by the filter
    pub filtered: usize,
    /// Artifacts written at the end of the run
    pub artifacts: Vec<PathBuf>,
    /// Setup or generation error
    pub error: Option<CoreError>,
}

impl Report {
    /// Check whether every case passed and no error occurred
    #[must_use]
    pub fn success(&self) -> bool {
        self.failed.is_empty() && self.error.is_none()
    }

    /// Process exit code for the report
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

type Setup = Box<dyn FnOnce(&Session) -> CoreResult<()>>;

/// Driver for `harness = false` test binaries
///
/// Runs setup hooks (typically loading the committed artifact), decides
/// the mode, runs every case in order and generates artifacts when all of
/// them passed. A filtered run never generates, since its recordings are
/// incomplete.
pub struct Harness {
    session: Session,
    setup: Vec<Setup>,
    cases: Vec<Case>,
    sink: Box<dyn Sink>,
    filter: Option<String>,
}

impl Harness {
    /// Create a harness writing artifacts to disk
    ///
    /// The first non-flag command-line argument filters cases by name.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session,
            setup: Vec::new(),
            cases: Vec::new(),
            sink: Box::new(FileSink),
            filter: std::env::args().skip(1).find(|arg| !arg.starts_with('-')),
        }
    }

    /// Session driven by this harness
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Replace the artifact sink
    #[must_use]
    pub fn with_sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Replace the case filter
    #[must_use]
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    /// Add a hook run before the mode is decided
    #[must_use]
    pub fn setup<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&Session) -> CoreResult<()> + 'static,
    {
        self.setup.push(Box::new(hook));
        self
    }

    /// Add a case
    #[must_use]
    pub fn case(mut self, case: Case) -> Self {
        self.cases.push(case);
        self
    }

    /// Run and convert the outcome into an exit code
    pub fn run(self) -> ExitCode {
        self.execute().exit_code()
    }

    /// Run and return the full report
    pub fn execute(self) -> Report {
        let Self {
            session,
            setup,
            cases,
            sink,
            filter,
        } = self;
        let mut report = Report::default();

        let prepared = setup
            .into_iter()
            .try_for_each(|hook| hook(&session))
            .and_then(|()| session.decide());
        if let Err(err) = prepared {
            eprintln!("error: {err}");
            report.error = Some(err);
            return report;
        }

        let total = cases.len();
        let selected: Vec<Case> = cases
            .into_iter()
            .filter(|case| filter.as_deref().is_none_or(|f| case.name.contains(f)))
            .collect();
        report.filtered = total - selected.len();

        println!("\nrunning {} tests", selected.len());
        for case in &selected {
            let scope = session.scope(&CaseIdentity::new(case.name, case.file));
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| (case.run)(&scope)));
            match outcome {
                Ok(Ok(())) => {
                    println!("test {} ... ok", case.name);
                    report.passed.push(case.name);
                }
                Ok(Err(err)) => {
                    println!("test {} ... FAILED", case.name);
                    report.failed.push((case.name, err.to_string()));
                }
                Err(payload) => {
                    println!("test {} ... FAILED", case.name);
                    report.failed.push((case.name, panic_message(payload.as_ref())));
                }
            }
        }

        if !report.failed.is_empty() {
            println!("\nfailures:");
            for (name, reason) in &report.failed {
                println!("    {name}: {reason}");
            }
        }
        println!(
            "\ntest result: {}. {} passed; {} failed; {} filtered out\n",
            if report.failed.is_empty() { "ok" } else { "FAILED" },
            report.passed.len(),
            report.failed.len(),
            report.filtered,
        );

        if report.failed.is_empty() && report.filtered == 0 {
            match session.finalize_and_generate(sink.as_ref()) {
                Ok(paths) => report.artifacts = paths,
                Err(err) => {
                    eprintln!("error: generation failed: {err}");
                    report.error = Some(err);
                }
            }
        }
        report
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use serde::Serialize;
    use std::sync::Arc;

    #[derive(Debug, Clone, Serialize)]
    struct Renamed {
        #[serde(rename = "first-name")]
        first_name: String,
    }

    fn config() -> GenerateConfig {
        GenerateConfig {
            record: true,
            ..GenerateConfig::default()
        }
        .with_dest("out")
    }

    #[test]
    fn test_decision_is_fixed() {
        let session = Session::new(config());
        session.run_with_decision(true).unwrap();
        session.run_with_decision(true).unwrap();
        assert!(session.is_recording());
        let err = session.run_with_decision(false).unwrap_err();
        assert!(matches!(err, CoreError::Config { .. }));
    }

    #[test]
    fn test_recording_resets_loaded_state() {
        let session = Session::new(config());
        session.load("kv", vec![Recording::new("dog1", 1u8)]).unwrap();
        session.run_with_decision(true).unwrap();
        assert!(session.recorder().snapshot().is_empty());

        let replay = Session::new(GenerateConfig::default());
        replay.load("kv", vec![Recording::new("dog1", 1u8)]).unwrap();
        replay.run_with_decision(false).unwrap();
        let scope = replay.scope(&CaseIdentity::new("kv", file!()));
        assert_eq!(scope.record("dog1", 0u8).unwrap(), 1);
    }

    #[test]
    fn test_replay_generates_nothing() {
        let session = Session::new(GenerateConfig::default());
        session.decide().unwrap();
        let sink = MemorySink::new();
        assert!(session.finalize_and_generate(&sink).unwrap().is_empty());
        assert!(sink.files().is_empty());
    }

    #[test]
    fn test_single_artifact() {
        let session = Session::new(config());
        session.decide().unwrap();
        let scope = session.scope(&CaseIdentity::new("kv", "tests/dogs.rs"));
        scope.record("dog1", "Lido".to_string()).unwrap();

        let sink = MemorySink::new();
        let written = session.finalize_and_generate(&sink).unwrap();
        assert_eq!(written, vec![PathBuf::from("out/recordings.rs")]);
        let artifact = sink.get("out/recordings.rs").unwrap();
        assert!(artifact.contains("encore::Recording::new::<String>(\"dog1\", \"Lido\".into())"));
        assert!(artifact.contains("pub fn load_registry(target: &impl encore::Load)"));
    }

    #[test]
    fn test_split_by_origin() {
        let session = Session::new(GenerateConfig {
            split_files: true,
            ..config()
        });
        session.decide().unwrap();
        session
            .scope(&CaseIdentity::new("kv", "tests/dogs.rs"))
            .record("dog1", 1u8)
            .unwrap();

        let artifacts = session.render_artifacts().unwrap();
        let paths: Vec<&PathBuf> = artifacts.keys().collect();
        assert_eq!(
            paths,
            vec![&PathBuf::from("out/dogs_recordings.rs"), &PathBuf::from("out/recordings.rs")]
        );
        assert!(artifacts[&PathBuf::from("out/dogs_recordings.rs")].contains("\"kv\""));
        assert!(!artifacts[&PathBuf::from("out/recordings.rs")].contains("\"kv\""));
    }

    #[test]
    fn test_failed_render_writes_nothing() {
        let session = Session::new(config());
        session.decide().unwrap();
        session.recorder().record("a", "ok", 1u8).unwrap();
        session
            .recorder()
            .record(
                "b",
                "bad",
                Renamed {
                    first_name: "Ada".to_string(),
                },
            )
            .unwrap();

        let sink = MemorySink::new();
        let err = session.finalize_and_generate(&sink).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedKind { .. }));
        assert!(sink.files().is_empty());
    }

    fn passing(scope: &Scope<'_>) -> CoreResult<()> {
        scope.record("answer", 42u32)?;
        scope.record_next("first".to_string())?;
        Ok(())
    }

    fn failing(scope: &Scope<'_>) -> CoreResult<()> {
        scope.record("answer", 1u32)?;
        scope.record("answer", 2u32)?;
        Ok(())
    }

    fn panicking(_: &Scope<'_>) -> CoreResult<()> {
        panic!("boom")
    }

    #[test]
    fn test_harness_generates_after_success() {
        let sink = Arc::new(MemorySink::new());
        let report = Harness::new(Session::new(config()))
            .with_filter(None)
            .with_sink(Arc::clone(&sink))
            .case(case!(passing))
            .execute();
        assert!(report.success());
        assert_eq!(report.passed, vec!["passing"]);
        assert_eq!(report.artifacts, vec![PathBuf::from("out/recordings.rs")]);
        assert!(sink.get("out/recordings.rs").unwrap().contains("\"passing\""));
    }

    #[test]
    fn test_harness_skips_generation_on_failure() {
        let sink = Arc::new(MemorySink::new());
        let report = Harness::new(Session::new(config()))
            .with_filter(None)
            .with_sink(Arc::clone(&sink))
            .case(case!(passing))
            .case(case!(failing))
            .case(case!(panicking))
            .execute();
        assert!(!report.success());
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed[1], ("panicking", "boom".to_string()));
        assert!(sink.files().is_empty());
    }

    #[test]
    fn test_harness_filter_skips_generation() {
        let sink = Arc::new(MemorySink::new());
        let report = Harness::new(Session::new(config()))
            .with_filter(Some("pass".to_string()))
            .with_sink(Arc::clone(&sink))
            .case(case!(passing))
            .case(case!(failing))
            .execute();
        assert!(report.success());
        assert_eq!(report.filtered, 1);
        assert!(sink.files().is_empty());
    }

    #[test]
    fn test_harness_setup_failure() {
        let report = Harness::new(Session::new(config()))
            .with_filter(None)
            .with_sink(MemorySink::new())
            .setup(|session| {
                session.load("kv", vec![])?;
                session.load("kv", vec![])
            })
            .case(case!(passing))
            .execute();
        assert!(matches!(report.error, Some(CoreError::AlreadyLoaded { .. })));
        assert!(report.passed.is_empty());
    }
}
