use crate::cli::SelectArgs;
use crate::error::{CliError, Result};
use evodesign::core::io::report::{RedesignReport, ReportRecord};
use evodesign::core::io::traits::RecordFile;
use evodesign::core::models::candidate::{CandidateSequence, RawCandidate};
use evodesign::engine::selector;
use std::path::Path;
use tracing::{debug, info};

pub async fn run(args: SelectArgs) -> Result<()> {
    let best = select_from_reports(&args.reports, args.include_native)?;
    info!(
        score = best.score,
        source = ?best.source,
        "Selected the best-scoring sequence."
    );

    if let Some(output) = &args.output {
        let record = ReportRecord {
            header: format!("selected, score={}, source={}", best.score, best.source.display()),
            sequence: best.sequence.clone(),
        };
        RedesignReport::write_to_path(&[record], output).map_err(|e| CliError::FileParsing {
            path: output.clone(),
            source: e.into(),
        })?;
        println!("✓ Selected sequence written to: {}", output.display());
    }

    println!("{}\t{}", best.score, best.sequence);
    Ok(())
}

fn read_report(path: &Path, include_native: bool) -> Result<Vec<RawCandidate>> {
    let to_parse_error = |e: evodesign::core::io::report::ReportError| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    };
    if !include_native {
        return RedesignReport::read_candidates(path).map_err(to_parse_error);
    }
    Ok(RedesignReport::read_from_path(path)
        .map_err(to_parse_error)?
        .into_iter()
        .map(|record| RawCandidate {
            header: record.header,
            sequence: record.sequence,
            source: path.to_path_buf(),
        })
        .collect())
}

fn select_from_reports<P: AsRef<Path>>(
    reports: &[P],
    include_native: bool,
) -> Result<CandidateSequence> {
    let mut raw = Vec::new();
    for report in reports {
        let candidates = read_report(report.as_ref(), include_native)?;
        debug!(report = ?report.as_ref(), count = candidates.len(), "Read redesign report.");
        raw.extend(candidates);
    }
    Ok(selector::select(raw)?)
}
