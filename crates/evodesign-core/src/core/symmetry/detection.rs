use nalgebra::{Point3, Unit, Vector3};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

/// One symmetry axis reported by a detector.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTransform {
    pub center: Point3<f64>,
    pub axis: Unit<Vector3<f64>>,
}

/// Structured detector output: the group label, per-axis transforms and a fit quality metric.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryReport {
    pub group: String,
    pub chains: Vec<String>,
    pub transforms: Vec<AxisTransform>,
    pub rmsd: f64,
}

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("No symmetry detector is configured")]
    Unavailable,
    #[error("Failed to run symmetry detector '{program}': {source}")]
    Launch {
        program: PathBuf,
        source: std::io::Error,
    },
    #[error("Symmetry detector exited unsuccessfully ({0})")]
    ExitStatus(std::process::ExitStatus),
    #[error("Failed to read detector report '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed detector report: {0}")]
    Report(String),
}

pub trait SymmetryDetector {
    /// Detects the symmetry of `structure`. Scratch files go under `workdir`.
    fn detect(&self, structure: &Path, workdir: &Path) -> Result<SymmetryReport, DetectionError>;
}

/// Detector used when none is configured; it never reports a group.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDetector;

impl SymmetryDetector for NoDetector {
    fn detect(&self, _: &Path, _: &Path) -> Result<SymmetryReport, DetectionError> {
        Err(DetectionError::Unavailable)
    }
}

/// Runs an AnAnaS-compatible executable: `<program> <structure> -u -j <report.json>`.
#[derive(Debug, Clone)]
pub struct AnanasDetector {
    program: PathBuf,
}

impl AnanasDetector {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SymmetryDetector for AnanasDetector {
    fn detect(&self, structure: &Path, workdir: &Path) -> Result<SymmetryReport, DetectionError> {
        let report_path = workdir.join("ananas.json");
        debug!(program = ?self.program, structure = ?structure, "Running symmetry detector.");

        let status = Command::new(&self.program)
            .arg(structure)
            .arg("-u")
            .arg("-j")
            .arg(&report_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| DetectionError::Launch {
                program: self.program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(DetectionError::ExitStatus(status));
        }

        let content =
            std::fs::read_to_string(&report_path).map_err(|source| DetectionError::Io {
                path: report_path.clone(),
                source,
            })?;
        parse_ananas_report(&content)
    }
}

#[derive(Deserialize)]
struct RawTransform {
    #[serde(rename = "CENTER")]
    center: [f64; 3],
    #[serde(rename = "AXIS")]
    axis: [f64; 3],
}

#[derive(Deserialize)]
struct RawResults {
    #[serde(rename = "Average_RMSD")]
    average_rmsd: f64,
    #[serde(default)]
    transforms: Vec<RawTransform>,
}

#[derive(Deserialize)]
struct RawAsymmetricUnit {
    group: String,
    #[serde(rename = "chain names", default)]
    chain_names: Vec<String>,
}

/// Parses the JSON array written by the detector: results first, asymmetric unit (`AU`) last.
pub fn parse_ananas_report(content: &str) -> Result<SymmetryReport, DetectionError> {
    let report = |msg: String| DetectionError::Report(msg);

    let entries: Vec<Value> =
        serde_json::from_str(content).map_err(|e| report(e.to_string()))?;
    let (first, last) = match (entries.first(), entries.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(report("report is empty".to_string())),
    };

    let results: RawResults =
        serde_json::from_value(first.clone()).map_err(|e| report(e.to_string()))?;
    let unit_value = last
        .get("AU")
        .ok_or_else(|| report("missing asymmetric unit entry".to_string()))?;
    let unit: RawAsymmetricUnit =
        serde_json::from_value(unit_value.clone()).map_err(|e| report(e.to_string()))?;

    let transforms = results
        .transforms
        .into_iter()
        .map(|t| {
            let axis = Unit::try_new(Vector3::from(t.axis), 1e-9)
                .ok_or_else(|| report("symmetry axis has zero length".to_string()))?;
            Ok(AxisTransform {
                center: Point3::from(t.center),
                axis,
            })
        })
        .collect::<Result<Vec<_>, DetectionError>>()?;

    Ok(SymmetryReport {
        group: unit.group,
        chains: unit.chain_names,
        transforms,
        rmsd: results.average_rmsd,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const C3_REPORT: &str = r#"[
        {
            "Average_RMSD": 0.42,
            "transforms": [
                {"CENTER": [1.0, 2.0, 3.0], "AXIS": [0.0, 0.0, 2.0], "ORDER": 3}
            ]
        },
        {"AU": {"group": "c3", "chain names": ["A", "B", "C"]}}
    ]"#;

    #[test]
    fn parses_group_axes_and_quality() {
        let report = parse_ananas_report(C3_REPORT).unwrap();
        assert_eq!(report.group, "c3");
        assert_eq!(report.chains, vec!["A", "B", "C"]);
        assert!((report.rmsd - 0.42).abs() < 1e-12);
        assert_eq!(report.transforms.len(), 1);
        assert_eq!(report.transforms[0].center, Point3::new(1.0, 2.0, 3.0));
        assert!((report.transforms[0].axis.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_asymmetric_unit_is_an_error() {
        let content = r#"[{"Average_RMSD": 0.1, "transforms": []}]"#;
        assert!(matches!(
            parse_ananas_report(content),
            Err(DetectionError::Report(_))
        ));
    }

    #[test]
    fn zero_axis_is_rejected() {
        let content = r#"[
            {"Average_RMSD": 0.1, "transforms": [{"CENTER": [0,0,0], "AXIS": [0,0,0]}]},
            {"AU": {"group": "c2", "chain names": ["A"]}}
        ]"#;
        assert!(parse_ananas_report(content).is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_ananas_report("not json").is_err());
        assert!(parse_ananas_report("[]").is_err());
    }

    #[test]
    fn no_detector_never_detects() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            NoDetector.detect(Path::new("missing.pdb"), dir.path()),
            Err(DetectionError::Unavailable)
        ));
    }

    #[test]
    fn missing_detector_binary_is_a_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let detector = AnanasDetector::new(dir.path().join("no-such-ananas"));
        assert!(matches!(
            detector.detect(Path::new("input.pdb"), dir.path()),
            Err(DetectionError::Launch { .. })
        ));
    }
}
