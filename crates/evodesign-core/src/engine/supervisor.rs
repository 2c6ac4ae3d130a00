use super::cancel::CancellationToken;
use super::config::{PollPolicy, SupervisorConfig};
use super::error::EngineError;
use super::process::{ExitOutcome, GenerationLauncher, GenerationRequest, JobProcess};
use super::progress::{Progress, ProgressReporter};
use super::sink::ArtifactSink;
use super::state::{JobStatus, describe_step, step_fraction};
use super::watcher::{ArtifactWatcher, Backoff, StepWait};
use crate::core::io::pdb::apply_constraint_layout;
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const TRAJECTORY_KINDS: [&str; 2] = ["pX0", "Xt-1"];

/// Final files of one generated sample, rewritten to the constraint's chain layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleOutput {
    pub sample: usize,
    pub design: PathBuf,
    pub trajectories: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub name: String,
    pub pid: Option<u32>,
    pub samples: Vec<SampleOutput>,
}

/// Creates a fresh staging directory for `name` under `root`.
///
/// An existing directory of the same name is never reused; a random suffix is appended instead.
pub fn prepare_staging(root: &Path, name: &str) -> Result<PathBuf, EngineError> {
    std::fs::create_dir_all(root).map_err(|e| EngineError::io(root, e))?;
    let mut candidate = root.join(name);
    while candidate.exists() {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        candidate = root.join(format!("{name}_{suffix}"));
    }
    std::fs::create_dir(&candidate).map_err(|e| EngineError::io(&candidate, e))?;
    Ok(candidate)
}

/// Location of the generator's final structure for `sample`.
pub fn design_path(output_prefix: &Path, sample: usize) -> PathBuf {
    suffixed(output_prefix, &format!("_{sample}.pdb"))
}

/// Locations of the generator's trajectory files for `sample`.
pub fn trajectory_paths(output_prefix: &Path, sample: usize) -> Vec<PathBuf> {
    let stem = output_prefix
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let traj_dir = output_prefix
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join("traj");
    TRAJECTORY_KINDS
        .iter()
        .map(|kind| traj_dir.join(format!("{stem}_{sample}_{kind}_traj.pdb")))
        .collect()
}

fn suffixed(prefix: &Path, suffix: &str) -> PathBuf {
    let mut os = prefix.as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}

/// One supervised run of the external structure generator.
pub struct GenerationJob {
    request: GenerationRequest,
    process: Box<dyn JobProcess>,
    pid: Option<u32>,
    status: JobStatus,
    watcher: ArtifactWatcher,
    poll: PollPolicy,
}

impl GenerationJob {
    /// Clears stale artifacts from the staging directory and launches the generator.
    pub fn start(
        launcher: &dyn GenerationLauncher,
        request: GenerationRequest,
        config: &SupervisorConfig,
    ) -> Result<Self, EngineError> {
        let watcher = ArtifactWatcher::new(&request.staging_dir, &config.terminator);
        let removed = watcher
            .clear_stale(request.steps)
            .map_err(|e| EngineError::io(&request.staging_dir, e))?;
        if removed > 0 {
            warn!(
                job = %request.name,
                "Removed {} stale artifact(s) from staging directory.", removed
            );
        }

        let process = launcher
            .launch(&request)
            .map_err(|e| EngineError::JobStartup(e.to_string()))?;
        let pid = process
            .id()
            .ok_or_else(|| EngineError::JobStartup("no process id was reported".to_string()))?;
        info!(job = %request.name, pid, "Generation job started.");

        Ok(Self {
            request,
            process,
            pid: Some(pid),
            status: JobStatus::Spawned,
            watcher,
            poll: config.poll,
        })
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    fn transition(&mut self, next: JobStatus) -> Result<(), EngineError> {
        if !self.status.can_advance_to(&next) {
            return Err(EngineError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        debug!(job = %self.request.name, "Job status: {}", next);
        self.status = next;
        Ok(())
    }

    fn fail(
        &mut self,
        sample: usize,
        last_completed_step: Option<usize>,
        reason: String,
    ) -> EngineError {
        self.status = JobStatus::Failed {
            sample,
            last_completed_step,
        };
        warn!(
            job = %self.request.name,
            sample,
            last_completed_step = %describe_step(last_completed_step),
            "Generation job failed: {}", reason
        );
        EngineError::JobRuntime {
            sample,
            last_completed_step,
            reason,
        }
    }

    fn abort(
        &mut self,
        sample: usize,
        last_completed_step: Option<usize>,
        reason: String,
    ) -> EngineError {
        if let Err(e) = self.process.terminate() {
            warn!(job = %self.request.name, "Failed to terminate generator: {}", e);
        }
        self.fail(sample, last_completed_step, reason)
    }

    fn mark_cancelled(
        &mut self,
        sample: usize,
        last_completed_step: Option<usize>,
    ) -> EngineError {
        if let Err(e) = self.process.terminate() {
            warn!(job = %self.request.name, "Failed to terminate generator: {}", e);
        }
        self.status = JobStatus::Cancelled {
            sample,
            last_completed_step,
        };
        info!(
            job = %self.request.name,
            staging = ?self.watcher.staging_dir(),
            "Generation job cancelled; intermediate artifacts left in place."
        );
        EngineError::Cancelled {
            sample,
            last_completed_step,
        }
    }

    /// Follows the job to completion, consuming every `(sample, step)` artifact in order.
    ///
    /// Fails as soon as the process is found dead while an artifact is still outstanding. After
    /// the last artifact the process must also exit successfully; only then are the final
    /// structures rewritten to the constraint layout.
    pub fn supervise(
        &mut self,
        reporter: &ProgressReporter,
        sink: &dyn ArtifactSink,
        cancel: &CancellationToken,
    ) -> Result<JobOutcome, EngineError> {
        let samples = self.request.samples;
        let steps = self.request.steps;
        let mut backoff = Backoff::new(self.poll);

        for sample in 0..samples {
            reporter.report(Progress::StatusUpdate {
                text: format!("Generating design {}/{}", sample + 1, samples),
            });
            reporter.report(Progress::TaskStart {
                total_steps: steps as u64,
            });

            let mut last_completed = None;
            for step in 0..steps {
                self.transition(JobStatus::Running { sample, step })?;

                let wait = match self
                    .watcher
                    .await_step(step, self.process.as_mut(), cancel, &mut backoff)
                {
                    Ok(wait) => wait,
                    Err(e) => {
                        return Err(self.abort(
                            sample,
                            last_completed,
                            format!("failed to watch step {step}: {e}"),
                        ));
                    }
                };

                match wait {
                    StepWait::Ready(content) => {
                        self.transition(JobStatus::StepReady { sample, step })?;
                        reporter.report(Progress::StepReady {
                            sample,
                            step,
                            fraction: step_fraction(step, steps),
                        });
                        reporter.report(Progress::TaskIncrement);
                        sink.step_ready(&self.request.name, sample, step, &content);
                        if let Err(e) = self.watcher.consume(step) {
                            return Err(self.abort(
                                sample,
                                Some(step),
                                format!("failed to consume step {step}: {e}"),
                            ));
                        }
                        last_completed = Some(step);
                    }
                    StepWait::Exited(outcome) => {
                        return Err(self.fail(
                            sample,
                            last_completed,
                            format!("generator {} before step {step} was ready", outcome.describe()),
                        ));
                    }
                    StepWait::Cancelled => return Err(self.mark_cancelled(sample, last_completed)),
                }
            }

            self.transition(JobStatus::SampleComplete { sample })?;
            reporter.report(Progress::TaskFinish);
        }

        self.await_exit(cancel, &mut backoff)?;

        let mut outputs = Vec::with_capacity(samples);
        for sample in 0..samples {
            let output = self.finalize_sample(sample)?;
            sink.sample_complete(&self.request.name, &output);
            outputs.push(output);
        }

        self.transition(JobStatus::AllComplete)?;
        if let Err(e) = std::fs::remove_dir_all(self.watcher.staging_dir()) {
            debug!("Could not remove staging directory: {}", e);
        }
        info!(job = %self.request.name, samples, "Generation job complete.");

        Ok(JobOutcome {
            name: self.request.name.clone(),
            pid: self.pid,
            samples: outputs,
        })
    }

    fn await_exit(
        &mut self,
        cancel: &CancellationToken,
        backoff: &mut Backoff,
    ) -> Result<(), EngineError> {
        let last_sample = self.request.samples.saturating_sub(1);
        let last_step = self.request.steps.checked_sub(1);
        loop {
            if cancel.is_cancelled() {
                return Err(self.mark_cancelled(last_sample, last_step));
            }
            match self.process.poll_exit() {
                Ok(Some(ExitOutcome::Success)) => return Ok(()),
                Ok(Some(outcome)) => {
                    return Err(self.fail(
                        last_sample,
                        last_step,
                        format!("generator {} after producing all samples", outcome.describe()),
                    ));
                }
                Ok(None) => std::thread::sleep(backoff.next_delay()),
                Err(e) => {
                    return Err(self.abort(
                        last_sample,
                        last_step,
                        format!("failed to query generator status: {e}"),
                    ));
                }
            }
        }
    }

    fn finalize_sample(&self, sample: usize) -> Result<SampleOutput, EngineError> {
        let prefix = &self.request.output_prefix;
        let design = design_path(prefix, sample);
        rewrite_layout(&design, &self.request)?;

        let mut trajectories = Vec::new();
        for path in trajectory_paths(prefix, sample) {
            if !path.exists() {
                warn!("Trajectory file {:?} is missing; skipping.", path);
                continue;
            }
            rewrite_layout(&path, &self.request)?;
            trajectories.push(path);
        }

        Ok(SampleOutput {
            sample,
            design,
            trajectories,
        })
    }
}

fn rewrite_layout(path: &Path, request: &GenerationRequest) -> Result<(), EngineError> {
    let content = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
    let fixed = apply_constraint_layout(&content, &request.contig);
    std::fs::write(path, fixed).map_err(|e| EngineError::io(path, e))
}
