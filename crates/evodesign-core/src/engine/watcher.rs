use super::cancel::CancellationToken;
use super::config::PollPolicy;
use super::process::{ExitOutcome, JobProcess};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::trace;

/// State of one expected intermediate artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactProbe {
    Missing,
    /// Present but not yet terminated; the writer is still flushing it.
    Partial,
    Ready(String),
}

/// Result of waiting for the next artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepWait {
    Ready(String),
    Exited(ExitOutcome),
    Cancelled,
}

/// Bounded exponential backoff, reset whenever progress is observed.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: PollPolicy,
    current: Duration,
}

impl Backoff {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            current: policy.initial_interval,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.policy.max_interval);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.policy.initial_interval;
    }
}

/// Watches the staging directory where the generator dumps one `{step}.pdb` per trajectory step.
#[derive(Debug, Clone)]
pub struct ArtifactWatcher {
    staging_dir: PathBuf,
    terminator: String,
}

impl ArtifactWatcher {
    pub fn new(staging_dir: impl Into<PathBuf>, terminator: impl Into<String>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            terminator: terminator.into(),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    pub fn step_path(&self, step: usize) -> PathBuf {
        self.staging_dir.join(format!("{step}.pdb"))
    }

    /// An artifact is ready only once its trimmed content ends with the terminator.
    pub fn probe(&self, step: usize) -> io::Result<ArtifactProbe> {
        let bytes = match std::fs::read(self.step_path(step)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ArtifactProbe::Missing),
            Err(e) => return Err(e),
        };
        let content = String::from_utf8_lossy(&bytes);
        if content.trim_end().ends_with(&self.terminator) {
            Ok(ArtifactProbe::Ready(content.into_owned()))
        } else {
            Ok(ArtifactProbe::Partial)
        }
    }

    /// Removes a consumed artifact so the generator's next sample can reuse the name.
    pub fn consume(&self, step: usize) -> io::Result<()> {
        match std::fs::remove_file(self.step_path(step)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Deletes leftovers of an earlier job for steps `0..steps`. Returns how many were removed.
    pub fn clear_stale(&self, steps: usize) -> io::Result<usize> {
        let mut removed = 0;
        for step in 0..steps {
            if self.step_path(step).exists() {
                self.consume(step)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Polls until artifact `step` is ready, the process exits, or `cancel` fires.
    ///
    /// Liveness is only consulted while the artifact is not ready. An artifact that completes
    /// just as the process exits still counts as ready.
    pub fn await_step(
        &self,
        step: usize,
        process: &mut dyn JobProcess,
        cancel: &CancellationToken,
        backoff: &mut Backoff,
    ) -> io::Result<StepWait> {
        loop {
            if cancel.is_cancelled() {
                return Ok(StepWait::Cancelled);
            }
            if let ArtifactProbe::Ready(content) = self.probe(step)? {
                backoff.reset();
                return Ok(StepWait::Ready(content));
            }
            if let Some(outcome) = process.poll_exit()? {
                return Ok(match self.probe(step)? {
                    ArtifactProbe::Ready(content) => StepWait::Ready(content),
                    _ => StepWait::Exited(outcome),
                });
            }
            let delay = backoff.next_delay();
            trace!(step, ?delay, "Artifact not ready; waiting.");
            std::thread::sleep(delay);
        }
    }
}
