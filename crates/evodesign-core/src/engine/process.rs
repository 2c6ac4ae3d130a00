use super::config::GeneratorConfig;
use crate::core::models::contig::{ConstraintString, ContigMode};
use crate::core::models::symmetry::SymmetryGroup;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use tracing::{debug, info};

/// Guiding potential applied to symmetric designs.
const OLIGOMER_POTENTIAL: &str =
    r#"potentials.guiding_potentials=["type:olig_contacts,weight_intra:1,weight_inter:0.1"]"#;

/// How a finished process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    Failure(Option<i32>),
}

impl ExitOutcome {
    pub fn describe(&self) -> String {
        match self {
            ExitOutcome::Success => "exited successfully".to_string(),
            ExitOutcome::Failure(Some(code)) => format!("exited with status {code}"),
            ExitOutcome::Failure(None) => "terminated by a signal".to_string(),
        }
    }
}

/// Handle to a running external job.
pub trait JobProcess: Send {
    fn id(&self) -> Option<u32>;

    /// Non-blocking liveness probe. `Ok(None)` while the process is still running.
    fn poll_exit(&mut self) -> io::Result<Option<ExitOutcome>>;

    /// Forcibly stops the process and reaps it.
    fn terminate(&mut self) -> io::Result<()>;
}

impl JobProcess for Child {
    fn id(&self) -> Option<u32> {
        Some(Child::id(self))
    }

    fn poll_exit(&mut self) -> io::Result<Option<ExitOutcome>> {
        Ok(self.try_wait()?.map(|status| {
            if status.success() {
                ExitOutcome::Success
            } else {
                ExitOutcome::Failure(status.code())
            }
        }))
    }

    fn terminate(&mut self) -> io::Result<()> {
        match self.kill() {
            Ok(()) => {}
            // Already exited.
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => {}
            Err(e) => return Err(e),
        }
        self.wait().map(|_| ())
    }
}

/// Everything the generator needs for one job.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub name: String,
    pub contig: ConstraintString,
    pub input_structure: Option<PathBuf>,
    pub output_prefix: PathBuf,
    pub staging_dir: PathBuf,
    pub symmetry: Option<SymmetryGroup>,
    pub samples: usize,
    pub steps: usize,
}

/// Starts a generation job whose intermediate structures land in `request.staging_dir`.
pub trait GenerationLauncher: Sync {
    fn launch(&self, request: &GenerationRequest) -> io::Result<Box<dyn JobProcess>>;
}

/// Number of trajectory steps the generator emits per sample.
///
/// Partial diffusion noises the input only part of the way, so it runs `2/5` of the configured
/// steps (at least one).
pub fn effective_steps(mode: ContigMode, configured: usize) -> usize {
    match mode {
        ContigMode::Partial => (configured * 80 / 200).max(1),
        ContigMode::Fixed | ContigMode::Free => configured,
    }
}

/// Launches the generator as a detached child process.
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    config: GeneratorConfig,
}

impl CommandLauncher {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Generator options for `request`, in the order they are passed on the command line.
    pub fn arguments(&self, request: &GenerationRequest) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(group) = request.symmetry {
            args.push("--config-name".to_string());
            args.push("symmetry".to_string());
            args.push(format!("inference.symmetry={}", group.label()));
            if self.config.guiding_potentials {
                args.push(OLIGOMER_POTENTIAL.to_string());
                args.push("potentials.olig_intra_all=True".to_string());
                args.push("potentials.olig_inter_all=True".to_string());
                args.push("potentials.guide_scale=2".to_string());
                args.push("potentials.guide_decay=quadratic".to_string());
            }
        }

        args.push(format!(
            "inference.output_prefix={}",
            request.output_prefix.display()
        ));
        args.push(format!("inference.num_designs={}", request.samples));

        if let Some(input) = &request.input_structure {
            args.push(format!("inference.input_pdb={}", input.display()));
        }
        match request.contig.mode() {
            ContigMode::Partial => args.push(format!("diffuser.partial_T={}", request.steps)),
            ContigMode::Fixed | ContigMode::Free => {
                args.push(format!("diffuser.T={}", request.steps))
            }
        }
        if let Some(hotspots) = &self.config.hotspots {
            args.push(format!("ppi.hotspot_res=[{hotspots}]"));
        }

        args.push(format!("contigmap.contigs=[{}]", request.contig));
        args.push("inference.dump_pdb=True".to_string());
        args.push(format!(
            "inference.dump_pdb_path={}",
            request.staging_dir.display()
        ));

        if let Some(ckpt) = &self.config.checkpoint_override {
            args.push(format!("inference.ckpt_override_path={}", ckpt.display()));
        }
        args
    }
}

impl GenerationLauncher for CommandLauncher {
    fn launch(&self, request: &GenerationRequest) -> io::Result<Box<dyn JobProcess>> {
        let args = self.arguments(request);
        info!(
            job = %request.name,
            program = ?self.config.program,
            "Launching structure generator."
        );
        debug!("Generator arguments: {}", args.join(" "));

        let stdout = log_file(&request.staging_dir, "generator.out.log")?;
        let stderr = log_file(&request.staging_dir, "generator.err.log")?;
        let child = Command::new(&self.config.program)
            .args(&self.config.leading_args)
            .args(&args)
            .envs(self.config.environment.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .spawn()?;
        Ok(Box::new(child))
    }
}

fn log_file(dir: &Path, name: &str) -> io::Result<File> {
    File::create(dir.join(name))
}
