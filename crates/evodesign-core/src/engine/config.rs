use crate::core::models::symmetry::SymmetryMode;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

/// How the external structure generator is invoked.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub program: PathBuf,
    pub leading_args: Vec<String>,
    pub environment: Vec<(String, String)>,
    pub diffusion_steps: usize,
    pub num_designs: usize,
    pub guiding_potentials: bool,
    pub hotspots: Option<String>,
    pub checkpoint_override: Option<PathBuf>,
}

/// Bounded exponential backoff between artifact probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupervisorConfig {
    pub staging_root: PathBuf,
    pub poll: PollPolicy,
    pub terminator: String,
}

/// How the external sequence redesign step is invoked.
#[derive(Debug, Clone, PartialEq)]
pub struct RedesignConfig {
    pub program: PathBuf,
    pub leading_args: Vec<String>,
    pub chains: String,
    pub num_sequences: usize,
    pub sampling_temperature: f64,
    pub seed: u64,
}

/// Immutable configuration for design cycles. Built once before any job starts.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignConfig {
    pub output_root: PathBuf,
    pub symmetry: SymmetryMode,
    pub generator: GeneratorConfig,
    pub supervisor: SupervisorConfig,
    pub redesign: RedesignConfig,
}

#[derive(Default)]
pub struct DesignConfigBuilder {
    output_root: Option<PathBuf>,
    symmetry: Option<SymmetryMode>,
    generator_program: Option<PathBuf>,
    generator_args: Vec<String>,
    generator_environment: Vec<(String, String)>,
    diffusion_steps: Option<usize>,
    num_designs: Option<usize>,
    guiding_potentials: bool,
    hotspots: Option<String>,
    checkpoint_override: Option<PathBuf>,
    staging_root: Option<PathBuf>,
    poll_interval: Option<Duration>,
    max_poll_interval: Option<Duration>,
    terminator: Option<String>,
    redesign_program: Option<PathBuf>,
    redesign_args: Vec<String>,
    redesign_chains: Option<String>,
    num_sequences: Option<usize>,
    sampling_temperature: Option<f64>,
    seed: Option<u64>,
}

impl DesignConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_root(mut self, path: PathBuf) -> Self {
        self.output_root = Some(path);
        self
    }
    pub fn symmetry(mut self, mode: SymmetryMode) -> Self {
        self.symmetry = Some(mode);
        self
    }
    pub fn generator_program(mut self, path: PathBuf) -> Self {
        self.generator_program = Some(path);
        self
    }
    pub fn generator_args(mut self, args: Vec<String>) -> Self {
        self.generator_args = args;
        self
    }
    pub fn generator_environment(mut self, env: Vec<(String, String)>) -> Self {
        self.generator_environment = env;
        self
    }
    pub fn diffusion_steps(mut self, steps: usize) -> Self {
        self.diffusion_steps = Some(steps);
        self
    }
    pub fn num_designs(mut self, n: usize) -> Self {
        self.num_designs = Some(n);
        self
    }
    pub fn guiding_potentials(mut self, enabled: bool) -> Self {
        self.guiding_potentials = enabled;
        self
    }
    pub fn hotspots(mut self, hotspots: Option<String>) -> Self {
        self.hotspots = hotspots.filter(|h| !h.trim().is_empty());
        self
    }
    pub fn checkpoint_override(mut self, path: Option<PathBuf>) -> Self {
        self.checkpoint_override = path;
        self
    }
    pub fn staging_root(mut self, path: PathBuf) -> Self {
        self.staging_root = Some(path);
        self
    }
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }
    pub fn max_poll_interval(mut self, interval: Duration) -> Self {
        self.max_poll_interval = Some(interval);
        self
    }
    pub fn terminator(mut self, marker: String) -> Self {
        self.terminator = Some(marker);
        self
    }
    pub fn redesign_program(mut self, path: PathBuf) -> Self {
        self.redesign_program = Some(path);
        self
    }
    pub fn redesign_args(mut self, args: Vec<String>) -> Self {
        self.redesign_args = args;
        self
    }
    pub fn redesign_chains(mut self, chains: String) -> Self {
        self.redesign_chains = Some(chains);
        self
    }
    pub fn num_sequences(mut self, n: usize) -> Self {
        self.num_sequences = Some(n);
        self
    }
    pub fn sampling_temperature(mut self, t: f64) -> Self {
        self.sampling_temperature = Some(t);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<DesignConfig, ConfigError> {
        let diffusion_steps = self
            .diffusion_steps
            .ok_or(ConfigError::MissingParameter("diffusion_steps"))?;
        let num_designs = self
            .num_designs
            .ok_or(ConfigError::MissingParameter("num_designs"))?;
        let poll_interval = self
            .poll_interval
            .ok_or(ConfigError::MissingParameter("poll_interval"))?;
        let max_poll_interval = self.max_poll_interval.unwrap_or(poll_interval);
        let terminator = self
            .terminator
            .ok_or(ConfigError::MissingParameter("terminator"))?;
        let num_sequences = self
            .num_sequences
            .ok_or(ConfigError::MissingParameter("num_sequences"))?;

        ensure_positive("diffusion_steps", diffusion_steps)?;
        ensure_positive("num_designs", num_designs)?;
        ensure_positive("num_sequences", num_sequences)?;
        if poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                parameter: "poll_interval",
                reason: "must be greater than zero".to_string(),
            });
        }
        if max_poll_interval < poll_interval {
            return Err(ConfigError::InvalidValue {
                parameter: "max_poll_interval",
                reason: "must not be shorter than poll_interval".to_string(),
            });
        }
        if terminator.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                parameter: "terminator",
                reason: "must not be blank".to_string(),
            });
        }
        match self.symmetry {
            Some(SymmetryMode::Cyclic(0)) | Some(SymmetryMode::Dihedral(0)) => {
                return Err(ConfigError::InvalidValue {
                    parameter: "symmetry",
                    reason: "order must be at least 1".to_string(),
                });
            }
            _ => {}
        }

        let generator = GeneratorConfig {
            program: self
                .generator_program
                .ok_or(ConfigError::MissingParameter("generator_program"))?,
            leading_args: self.generator_args,
            environment: self.generator_environment,
            diffusion_steps,
            num_designs,
            guiding_potentials: self.guiding_potentials,
            hotspots: self.hotspots,
            checkpoint_override: self.checkpoint_override,
        };
        let supervisor = SupervisorConfig {
            staging_root: self
                .staging_root
                .ok_or(ConfigError::MissingParameter("staging_root"))?,
            poll: PollPolicy {
                initial_interval: poll_interval,
                max_interval: max_poll_interval,
            },
            terminator,
        };
        let redesign = RedesignConfig {
            program: self
                .redesign_program
                .ok_or(ConfigError::MissingParameter("redesign_program"))?,
            leading_args: self.redesign_args,
            chains: self
                .redesign_chains
                .ok_or(ConfigError::MissingParameter("redesign_chains"))?,
            num_sequences,
            sampling_temperature: self
                .sampling_temperature
                .ok_or(ConfigError::MissingParameter("sampling_temperature"))?,
            seed: self.seed.ok_or(ConfigError::MissingParameter("seed"))?,
        };

        Ok(DesignConfig {
            output_root: self
                .output_root
                .ok_or(ConfigError::MissingParameter("output_root"))?,
            symmetry: self.symmetry.unwrap_or_default(),
            generator,
            supervisor,
            redesign,
        })
    }
}

fn ensure_positive(parameter: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            parameter,
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}
