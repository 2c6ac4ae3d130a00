use std::fmt;

/// Lifecycle of one external generation job.
///
/// Positions only move forward: `(sample, step)` pairs are visited in strict order, and the
/// terminal states `AllComplete`, `Failed` and `Cancelled` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Spawned,
    Running {
        sample: usize,
        step: usize,
    },
    StepReady {
        sample: usize,
        step: usize,
    },
    SampleComplete {
        sample: usize,
    },
    AllComplete,
    Failed {
        sample: usize,
        last_completed_step: Option<usize>,
    },
    Cancelled {
        sample: usize,
        last_completed_step: Option<usize>,
    },
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::AllComplete | JobStatus::Failed { .. } | JobStatus::Cancelled { .. }
        )
    }

    /// Ordering key of non-terminal states after `Spawned`.
    fn position(&self) -> Option<(usize, usize, u8)> {
        match *self {
            JobStatus::Running { sample, step } => Some((sample, step, 0)),
            JobStatus::StepReady { sample, step } => Some((sample, step, 1)),
            JobStatus::SampleComplete { sample } => Some((sample, usize::MAX, 2)),
            _ => None,
        }
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(&self, next: &JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            JobStatus::Spawned => false,
            JobStatus::Failed { .. } | JobStatus::Cancelled { .. } => true,
            JobStatus::AllComplete => matches!(self, JobStatus::SampleComplete { .. }),
            _ => match (self.position(), next.position()) {
                (None, Some(_)) => matches!(next, JobStatus::Running { .. }),
                (Some(current), Some(next)) => next > current,
                _ => false,
            },
        }
    }

    /// Sample index the job is at, if it has started producing.
    pub fn sample(&self) -> Option<usize> {
        match *self {
            JobStatus::Running { sample, .. }
            | JobStatus::StepReady { sample, .. }
            | JobStatus::SampleComplete { sample }
            | JobStatus::Failed { sample, .. }
            | JobStatus::Cancelled { sample, .. } => Some(sample),
            JobStatus::Spawned | JobStatus::AllComplete => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Spawned => write!(f, "spawned"),
            JobStatus::Running { sample, step } => {
                write!(f, "running (sample {sample}, step {step})")
            }
            JobStatus::StepReady { sample, step } => {
                write!(f, "step ready (sample {sample}, step {step})")
            }
            JobStatus::SampleComplete { sample } => write!(f, "sample {sample} complete"),
            JobStatus::AllComplete => write!(f, "all samples complete"),
            JobStatus::Failed {
                sample,
                last_completed_step,
            } => write!(
                f,
                "failed (sample {sample}, last completed step {})",
                describe_step(*last_completed_step)
            ),
            JobStatus::Cancelled {
                sample,
                last_completed_step,
            } => write!(
                f,
                "cancelled (sample {sample}, last completed step {})",
                describe_step(*last_completed_step)
            ),
        }
    }
}

pub(crate) fn describe_step(step: Option<usize>) -> String {
    step.map_or_else(|| "none".to_string(), |s| s.to_string())
}

/// Fraction of a sample's trajectory that has been produced once `step` is ready.
pub fn step_fraction(step: usize, steps: usize) -> f64 {
    if steps == 0 {
        return 1.0;
    }
    ((step + 1) as f64 / steps as f64).min(1.0)
}
