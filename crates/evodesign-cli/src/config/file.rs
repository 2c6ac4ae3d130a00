use crate::error::{CliError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileGeneratorConfig {
    pub program: Option<PathBuf>,
    pub args: Option<Vec<String>>,
    pub env: Option<BTreeMap<String, String>>,
    pub diffusion_steps: Option<usize>,
    pub num_designs: Option<usize>,
    pub guiding_potentials: Option<bool>,
    pub hotspots: Option<String>,
    pub checkpoint: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSupervisorConfig {
    pub staging_root: Option<PathBuf>,
    pub poll_interval_ms: Option<u64>,
    pub max_poll_interval_ms: Option<u64>,
    pub terminator: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSymmetryConfig {
    pub mode: Option<String>,
    /// Symmetry detector executable used by `mode = "auto"`.
    pub detector: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileRedesignConfig {
    pub program: Option<PathBuf>,
    pub args: Option<Vec<String>>,
    pub chains: Option<String>,
    pub num_sequences: Option<usize>,
    pub sampling_temperature: Option<f64>,
    pub seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub output_dir: Option<PathBuf>,
    pub cycles: Option<usize>,
    pub reference_length: Option<usize>,
    pub generator: Option<FileGeneratorConfig>,
    pub supervisor: Option<FileSupervisorConfig>,
    pub symmetry: Option<FileSymmetryConfig>,
    pub redesign: Option<FileRedesignConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
