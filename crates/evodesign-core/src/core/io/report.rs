use super::traits::RecordFile;
use crate::core::models::candidate::RawCandidate;
use regex::Regex;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

static SCORE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bscore=([-+]?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?)").expect("valid score pattern")
});

/// One `>header` line followed by its (possibly wrapped) sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRecord {
    pub header: String,
    pub sequence: String,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Sequence data on line {line} appears before any header")]
    OrphanSequence { line: usize },
}

/// FASTA-style report written by the sequence redesign step.
///
/// The first record of each report is the input (native) sequence; designed sequences follow,
/// each with a `score=<value>` field in its header.
pub struct RedesignReport;

impl RecordFile for RedesignReport {
    type Record = ReportRecord;
    type Error = ReportError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<ReportRecord>, ReportError> {
        let mut records: Vec<ReportRecord> = Vec::new();
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(header) = line.strip_prefix('>') {
                records.push(ReportRecord {
                    header: header.trim().to_string(),
                    sequence: String::new(),
                });
            } else {
                let record = records.last_mut().ok_or(ReportError::OrphanSequence {
                    line: line_num + 1,
                })?;
                record.sequence.push_str(line);
            }
        }
        Ok(records)
    }

    fn write_to(records: &[ReportRecord], writer: &mut impl Write) -> Result<(), ReportError> {
        for record in records {
            writeln!(writer, ">{}", record.header)?;
            writeln!(writer, "{}", record.sequence)?;
        }
        Ok(())
    }
}

impl RedesignReport {
    /// Reads the designed candidates of one report, skipping the leading native record.
    pub fn read_candidates(path: &Path) -> Result<Vec<RawCandidate>, ReportError> {
        let records = Self::read_from_path(path)?;
        Ok(records
            .into_iter()
            .skip(1)
            .map(|record| RawCandidate {
                header: record.header,
                sequence: record.sequence,
                source: path.to_path_buf(),
            })
            .collect())
    }
}

/// Extracts the `score=<value>` field from a report header.
pub fn parse_score(header: &str) -> Option<f64> {
    SCORE_PATTERN
        .captures(header)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .filter(|score: &f64| score.is_finite())
}
