//! Backend selection
//!
//! Walks the artifacts in fixed priority order and keeps the first one that
//! opens. Load failures are logged and recorded, never returned: a service
//! with no loadable artifact starts degraded instead of failing.

use crate::artifact::{ArtifactSet, FormatKind, ModelArtifact};
use crate::backend::{self, BackendHandle, ClassifierBackend};
use crate::error::InferenceResult;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Opens a backend from an artifact
///
/// The production implementation is [`RuntimeBackendFactory`]; tests inject
/// their own.
pub trait BackendFactory: Send + Sync {
    /// Opens `artifact` or explains why it cannot be opened
    fn open(&self, artifact: &ModelArtifact) -> InferenceResult<Box<dyn ClassifierBackend>>;
}

/// Factory backed by the runtimes compiled into this binary
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeBackendFactory;

impl BackendFactory for RuntimeBackendFactory {
    fn open(&self, artifact: &ModelArtifact) -> InferenceResult<Box<dyn ClassifierBackend>> {
        backend::open_runtime(artifact)
    }
}

/// What happened to one priority slot during loading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum LoadAttempt {
    /// No artifact of this kind on disk
    Absent,
    /// The artifact exists but could not be opened
    Failed(String),
    /// This artifact became the active backend
    Loaded,
    /// Not attempted because a higher-priority artifact loaded
    Skipped,
}

/// Per-slot record of a load pass, in priority order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    attempts: Vec<(FormatKind, LoadAttempt)>,
}

impl LoadReport {
    /// Outcome for one format kind
    pub fn attempt(&self, kind: FormatKind) -> Option<&LoadAttempt> {
        self.attempts
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, attempt)| attempt)
    }

    /// All outcomes in priority order
    pub fn attempts(&self) -> &[(FormatKind, LoadAttempt)] {
        &self.attempts
    }

    /// The kind that loaded, if any
    pub fn loaded(&self) -> Option<FormatKind> {
        self.attempts
            .iter()
            .find(|(_, attempt)| *attempt == LoadAttempt::Loaded)
            .map(|(kind, _)| *kind)
    }

    /// Report for a service that never looked at the filesystem
    pub(crate) fn empty() -> Self {
        Self {
            attempts: FormatKind::PRIORITY
                .iter()
                .map(|&kind| (kind, LoadAttempt::Absent))
                .collect(),
        }
    }

    /// Report for a backend that was injected directly
    pub(crate) fn injected(kind: FormatKind) -> Self {
        Self {
            attempts: FormatKind::PRIORITY
                .iter()
                .map(|&k| {
                    let attempt = if k == kind {
                        LoadAttempt::Loaded
                    } else {
                        LoadAttempt::Skipped
                    };
                    (k, attempt)
                })
                .collect(),
        }
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (kind, attempt)) in self.attempts.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match attempt {
                LoadAttempt::Absent => write!(f, "{kind}: absent")?,
                LoadAttempt::Failed(reason) => write!(f, "{kind}: failed ({reason})")?,
                LoadAttempt::Loaded => write!(f, "{kind}: loaded")?,
                LoadAttempt::Skipped => write!(f, "{kind}: skipped")?,
            }
        }
        Ok(())
    }
}

/// Result of a load pass
#[derive(Debug)]
pub struct LoadOutcome {
    /// The selected backend, or `None` if nothing could be opened
    pub handle: Option<BackendHandle>,
    /// What happened to each slot
    pub report: LoadReport,
}

/// Selects the first artifact that opens, in [`FormatKind::PRIORITY`] order
pub struct BackendLoader<'a> {
    factory: &'a dyn BackendFactory,
}

impl<'a> BackendLoader<'a> {
    /// Creates a loader that opens artifacts through `factory`
    pub fn new(factory: &'a dyn BackendFactory) -> Self {
        Self { factory }
    }

    /// Tries each present artifact once; the first success wins
    pub fn load(&self, artifacts: &ArtifactSet) -> LoadOutcome {
        let mut handle: Option<BackendHandle> = None;
        let mut attempts = Vec::with_capacity(FormatKind::PRIORITY.len());

        for kind in FormatKind::PRIORITY {
            let attempt = match (artifacts.get(kind), handle.is_some()) {
                (None, _) => LoadAttempt::Absent,
                (Some(_), true) => LoadAttempt::Skipped,
                (Some(artifact), false) => match self.factory.open(artifact) {
                    Ok(backend) => {
                        info!(
                            kind = %kind,
                            path = %artifact.path().display(),
                            "Model loaded successfully"
                        );
                        handle = Some(BackendHandle::with_source(backend, artifact.path()));
                        LoadAttempt::Loaded
                    }
                    Err(e) => {
                        warn!(
                            kind = %kind,
                            path = %artifact.path().display(),
                            error = %e,
                            "Failed to load model, trying next format"
                        );
                        LoadAttempt::Failed(e.to_string())
                    }
                },
            };
            attempts.push((kind, attempt));
        }

        let report = LoadReport { attempts };
        if handle.is_none() {
            warn!(report = %report, "No model could be loaded");
        }

        LoadOutcome { handle, report }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FixedScoresBackend;
    use crate::error::InferenceError;
    use std::sync::Mutex;

    /// Succeeds for the listed kinds, fails for the rest, and records calls
    struct ScriptedFactory {
        succeed: Vec<FormatKind>,
        opened: Mutex<Vec<FormatKind>>,
    }

    impl ScriptedFactory {
        fn new(succeed: &[FormatKind]) -> Self {
            Self {
                succeed: succeed.to_vec(),
                opened: Mutex::new(Vec::new()),
            }
        }

        fn opened(&self) -> Vec<FormatKind> {
            self.opened.lock().unwrap().clone()
        }
    }

    impl BackendFactory for ScriptedFactory {
        fn open(&self, artifact: &ModelArtifact) -> InferenceResult<Box<dyn ClassifierBackend>> {
            let kind = artifact.kind();
            self.opened.lock().unwrap().push(kind);
            if self.succeed.contains(&kind) {
                Ok(Box::new(FixedScoresBackend::one_hot(kind, 15, 0)))
            } else {
                Err(InferenceError::backend_load(kind, artifact.path(), "corrupt"))
            }
        }
    }

    fn all_present() -> ArtifactSet {
        FormatKind::PRIORITY
            .iter()
            .map(|&k| ModelArtifact::new(format!("m.{}", k.extension()), k))
            .collect()
    }

    #[test]
    fn test_first_success_short_circuits() {
        let factory = ScriptedFactory::new(&FormatKind::PRIORITY);
        let outcome = BackendLoader::new(&factory).load(&all_present());

        assert_eq!(outcome.handle.unwrap().kind(), FormatKind::PortableGraph);
        assert_eq!(factory.opened(), vec![FormatKind::PortableGraph]);
        assert_eq!(
            outcome.report.attempt(FormatKind::MobileOptimized),
            Some(&LoadAttempt::Skipped)
        );
        assert_eq!(
            outcome.report.attempt(FormatKind::NativeTraining),
            Some(&LoadAttempt::Skipped)
        );
    }

    #[test]
    fn test_falls_through_failures() {
        let factory = ScriptedFactory::new(&[FormatKind::NativeTraining]);
        let outcome = BackendLoader::new(&factory).load(&all_present());

        let handle = outcome.handle.unwrap();
        assert_eq!(handle.kind(), FormatKind::NativeTraining);
        assert_eq!(handle.source().unwrap().to_str(), Some("m.pt"));
        assert!(matches!(
            outcome.report.attempt(FormatKind::PortableGraph),
            Some(LoadAttempt::Failed(_))
        ));
        assert_eq!(outcome.report.loaded(), Some(FormatKind::NativeTraining));
    }

    #[test]
    fn test_nothing_present_is_degraded() {
        let factory = ScriptedFactory::new(&FormatKind::PRIORITY);
        let outcome = BackendLoader::new(&factory).load(&ArtifactSet::new());

        assert!(outcome.handle.is_none());
        assert!(factory.opened().is_empty());
        assert!(outcome
            .report
            .attempts()
            .iter()
            .all(|(_, a)| *a == LoadAttempt::Absent));
    }

    #[test]
    fn test_report_display() {
        let factory = ScriptedFactory::new(&[FormatKind::MobileOptimized]);
        let outcome = BackendLoader::new(&factory).load(&all_present());
        let text = outcome.report.to_string();
        assert!(text.starts_with("ONNX: failed"));
        assert!(text.contains("TFLite: loaded"));
        assert!(text.ends_with("TorchScript: skipped"));
    }

    #[test]
    fn test_report_serialization() {
        let report = LoadReport::injected(FormatKind::PortableGraph);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["attempts"][0][1]["status"], "loaded");
        assert_eq!(json["attempts"][1][0], "MobileOptimized");
    }
}
