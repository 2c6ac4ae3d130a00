use crate::error::{CliError, Result};
use evodesign::core::models::candidate::CandidateSequence;
use evodesign::core::models::contig::ConstraintString;
use evodesign::engine::sink::ArtifactSink;
use evodesign::engine::supervisor::SampleOutput;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct CycleRow<'a> {
    cycle: usize,
    score: Option<f64>,
    sequence: &'a str,
    constraint: String,
    source: Option<String>,
}

/// Appends one CSV row per finished cycle.
pub struct CsvReportSink {
    writer: Mutex<csv::Writer<File>>,
}

impl CsvReportSink {
    /// Opens `path` for appending; the header row is written only when the file is new or empty.
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let needs_header = file.metadata()?.len() == 0;
        let writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        debug!(path = ?path, needs_header, "Opened cycle report.");
        Ok(Self {
            writer: Mutex::new(writer),
        })
    }

    pub fn flush(&self) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| CliError::Other(anyhow::anyhow!("Report writer lock poisoned")))?;
        writer.flush()?;
        Ok(())
    }

    fn write_row(&self, row: &CycleRow) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| CliError::Other(anyhow::anyhow!("Report writer lock poisoned")))?;
        writer
            .serialize(row)
            .map_err(|e| CliError::Other(e.into()))?;
        writer.flush()?;
        Ok(())
    }
}

impl ArtifactSink for CsvReportSink {
    fn sample_complete(&self, job: &str, output: &SampleOutput) {
        debug!(job, sample = output.sample, design = ?output.design, "Design written.");
    }

    fn sequence_selected(
        &self,
        cycle: usize,
        sequence: &str,
        constraint: &ConstraintString,
        candidate: Option<&CandidateSequence>,
    ) {
        let row = CycleRow {
            cycle,
            score: candidate.map(|c| c.score),
            sequence,
            constraint: constraint.to_string(),
            source: candidate.map(|c| c.source.display().to_string()),
        };
        if let Err(e) = self.write_row(&row) {
            warn!(cycle, "Failed to append cycle report row: {}", e);
        }
    }
}
