use super::supervisor::SampleOutput;
use crate::core::models::candidate::CandidateSequence;
use crate::core::models::contig::ConstraintString;

/// Receives design artifacts as they are produced. All methods default to no-ops.
pub trait ArtifactSink: Sync {
    /// A trajectory step of `sample` became ready; `structure` is its terminated content.
    fn step_ready(&self, _job: &str, _sample: usize, _step: usize, _structure: &str) {}

    /// A sample's final outputs were written.
    fn sample_complete(&self, _job: &str, _output: &SampleOutput) {}

    /// A cycle finished with `sequence` (deletion placeholders restored) chosen from `candidate`.
    fn sequence_selected(
        &self,
        _cycle: usize,
        _sequence: &str,
        _constraint: &ConstraintString,
        _candidate: Option<&CandidateSequence>,
    ) {
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ArtifactSink for NullSink {}
