use super::config::RedesignConfig;
use super::error::EngineError;
use crate::core::io::report::RedesignReport;
use crate::core::models::candidate::RawCandidate;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

const REPORT_EXTENSION: &str = "fa";
const REPORT_DIR: &str = "seqs";

/// Proposes sequences for a generated backbone.
pub trait RedesignStep: Sync {
    /// Redesigns `structure`, writing tool output under `output_dir`, and returns every
    /// designed candidate (native records excluded) in report order.
    fn redesign(
        &self,
        structure: &Path,
        output_dir: &Path,
    ) -> Result<Vec<RawCandidate>, EngineError>;
}

/// Runs a ProteinMPNN-compatible executable and reads the reports it leaves in `seqs/`.
#[derive(Debug, Clone)]
pub struct CommandRedesign {
    config: RedesignConfig,
}

impl CommandRedesign {
    pub fn new(config: RedesignConfig) -> Self {
        Self { config }
    }

    pub fn arguments(&self, structure: &Path, output_dir: &Path) -> Vec<String> {
        vec![
            "--pdb_path".to_string(),
            structure.display().to_string(),
            "--pdb_path_chains".to_string(),
            self.config.chains.clone(),
            "--out_folder".to_string(),
            output_dir.display().to_string(),
            "--num_seq_per_target".to_string(),
            self.config.num_sequences.to_string(),
            "--sampling_temp".to_string(),
            self.config.sampling_temperature.to_string(),
            "--seed".to_string(),
            self.config.seed.to_string(),
            "--batch_size".to_string(),
            "1".to_string(),
        ]
    }
}

impl RedesignStep for CommandRedesign {
    fn redesign(
        &self,
        structure: &Path,
        output_dir: &Path,
    ) -> Result<Vec<RawCandidate>, EngineError> {
        std::fs::create_dir_all(output_dir).map_err(|e| EngineError::io(output_dir, e))?;
        info!(structure = ?structure, "Redesigning sequence.");

        let output = Command::new(&self.config.program)
            .args(&self.config.leading_args)
            .args(self.arguments(structure, output_dir))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                EngineError::Redesign(format!(
                    "failed to run '{}': {e}",
                    self.config.program.display()
                ))
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Redesign(format!(
                "'{}' exited with {}: {}",
                self.config.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let stem = structure
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let reports = find_reports(&output_dir.join(REPORT_DIR), &stem)?;
        if reports.is_empty() {
            return Err(EngineError::Redesign(format!(
                "no report for '{stem}' under {:?}",
                output_dir.join(REPORT_DIR)
            )));
        }

        let mut candidates = Vec::new();
        for report in reports {
            let mut found = RedesignReport::read_candidates(&report).map_err(|source| {
                EngineError::Report {
                    path: report.clone(),
                    source,
                }
            })?;
            debug!(report = ?report, "Read {} candidate(s).", found.len());
            candidates.append(&mut found);
        }
        Ok(candidates)
    }
}

/// Reports in `seqs_dir` named after `stem`, sorted by path.
pub fn find_reports(seqs_dir: &Path, stem: &str) -> Result<Vec<PathBuf>, EngineError> {
    let entries = match std::fs::read_dir(seqs_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(EngineError::io(seqs_dir, e)),
    };

    let mut reports = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| EngineError::io(seqs_dir, e))?.path();
        let matches_stem = path
            .file_stem()
            .is_some_and(|s| s == stem);
        let is_report = path
            .extension()
            .is_some_and(|ext| ext == REPORT_EXTENSION);
        if matches_stem && is_report {
            reports.push(path);
        }
    }
    reports.sort();
    Ok(reports)
}
