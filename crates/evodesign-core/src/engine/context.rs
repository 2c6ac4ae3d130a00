use super::cancel::CancellationToken;
use super::config::DesignConfig;
use super::process::GenerationLauncher;
use super::progress::ProgressReporter;
use super::redesign::RedesignStep;
use super::sink::ArtifactSink;
use crate::core::symmetry::detection::SymmetryDetector;

/// Everything a design cycle needs besides its inputs: configuration, the external
/// collaborators, and the channels it reports through.
#[derive(Clone, Copy)]
pub struct DesignContext<'a> {
    pub config: &'a DesignConfig,
    pub launcher: &'a dyn GenerationLauncher,
    pub redesign: &'a dyn RedesignStep,
    pub detector: &'a dyn SymmetryDetector,
    pub sink: &'a dyn ArtifactSink,
    pub reporter: &'a ProgressReporter<'a>,
    pub cancel: &'a CancellationToken,
}

impl<'a> DesignContext<'a> {
    pub fn new(
        config: &'a DesignConfig,
        launcher: &'a dyn GenerationLauncher,
        redesign: &'a dyn RedesignStep,
        detector: &'a dyn SymmetryDetector,
        sink: &'a dyn ArtifactSink,
        reporter: &'a ProgressReporter<'a>,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            config,
            launcher,
            redesign,
            detector,
            sink,
            reporter,
            cancel,
        }
    }
}
