use super::detection::{SymmetryDetector, SymmetryReport};
use crate::core::models::contig::ConstraintString;
use crate::core::models::symmetry::{SymmetryGroup, SymmetryMode};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("Symmetry order must be at least 1 (got {0})")]
    InvalidOrder(u32),
}

/// Outcome of symmetry planning: the resolved group (if any) and the replication factor.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryPlan {
    pub group: Option<SymmetryGroup>,
    pub copies: usize,
    pub report: Option<SymmetryReport>,
}

impl SymmetryPlan {
    pub fn none() -> Self {
        Self {
            group: None,
            copies: 1,
            report: None,
        }
    }

    pub fn from_group(group: SymmetryGroup) -> Self {
        Self {
            group: Some(group),
            copies: group.copies(),
            report: None,
        }
    }

    /// Replicates the contig body once per symmetric subunit.
    pub fn apply(&self, contig: &ConstraintString) -> ConstraintString {
        contig.replicate(self.copies)
    }
}

/// Resolves a [`SymmetryMode`] into a [`SymmetryPlan`].
///
/// `Auto` consults `detector` against `reference`; any detection failure or unsupported group
/// downgrades to no symmetry with a warning.
pub fn plan(
    mode: SymmetryMode,
    reference: Option<&Path>,
    workdir: &Path,
    detector: &dyn SymmetryDetector,
) -> Result<SymmetryPlan, PlanError> {
    match mode {
        SymmetryMode::None => Ok(SymmetryPlan::none()),
        SymmetryMode::Cyclic(0) | SymmetryMode::Dihedral(0) => Err(PlanError::InvalidOrder(0)),
        SymmetryMode::Cyclic(order) => Ok(SymmetryPlan::from_group(SymmetryGroup::Cyclic(order))),
        SymmetryMode::Dihedral(order) => {
            Ok(SymmetryPlan::from_group(SymmetryGroup::Dihedral(order)))
        }
        SymmetryMode::Auto => Ok(detect(reference, workdir, detector)),
    }
}

fn detect(
    reference: Option<&Path>,
    workdir: &Path,
    detector: &dyn SymmetryDetector,
) -> SymmetryPlan {
    let Some(reference) = reference else {
        warn!("Automatic symmetry requested without a reference structure; using no symmetry.");
        return SymmetryPlan::none();
    };

    let report = match detector.detect(reference, workdir) {
        Ok(report) => report,
        Err(e) => {
            warn!("No symmetry detected ({}); using no symmetry.", e);
            return SymmetryPlan::none();
        }
    };

    match report.group.parse::<SymmetryGroup>() {
        Ok(group) => {
            info!(
                group = %group,
                rmsd = report.rmsd,
                "Detected symmetry group."
            );
            SymmetryPlan {
                group: Some(group),
                copies: group.copies(),
                report: Some(report),
            }
        }
        Err(e) => {
            warn!(
                "Detected symmetry ({}) is not currently supported: {}",
                report.group, e
            );
            SymmetryPlan::none()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codec::scanner::{ChainFrame, encode};
    use crate::core::models::mask::MutabilityMask;
    use crate::core::symmetry::detection::{DetectionError, NoDetector};

    struct FixedDetector(&'static str);

    impl SymmetryDetector for FixedDetector {
        fn detect(&self, _: &Path, _: &Path) -> Result<SymmetryReport, DetectionError> {
            Ok(SymmetryReport {
                group: self.0.to_string(),
                chains: vec!["A".to_string()],
                transforms: vec![],
                rmsd: 0.3,
            })
        }
    }

    fn plan_auto(detector: &dyn SymmetryDetector) -> SymmetryPlan {
        let dir = tempfile::tempdir().unwrap();
        plan(
            SymmetryMode::Auto,
            Some(Path::new("ref.pdb")),
            dir.path(),
            detector,
        )
        .unwrap()
    }

    #[test]
    fn none_mode_has_single_copy() {
        let p = plan(SymmetryMode::None, None, Path::new("."), &NoDetector).unwrap();
        assert_eq!(p, SymmetryPlan::none());
    }

    #[test]
    fn explicit_groups_set_copies() {
        let c3 = plan(SymmetryMode::Cyclic(3), None, Path::new("."), &NoDetector).unwrap();
        assert_eq!(c3.group, Some(SymmetryGroup::Cyclic(3)));
        assert_eq!(c3.copies, 3);

        let d2 = plan(SymmetryMode::Dihedral(2), None, Path::new("."), &NoDetector).unwrap();
        assert_eq!(d2.group.map(|g| g.label()), Some("d2".to_string()));
        assert_eq!(d2.copies, 4);
    }

    #[test]
    fn zero_order_is_rejected() {
        assert_eq!(
            plan(SymmetryMode::Cyclic(0), None, Path::new("."), &NoDetector),
            Err(PlanError::InvalidOrder(0))
        );
    }

    #[test]
    fn auto_mode_uses_detected_group() {
        let p = plan_auto(&FixedDetector("d3"));
        assert_eq!(p.group, Some(SymmetryGroup::Dihedral(3)));
        assert_eq!(p.copies, 6);
        assert!(p.report.is_some());
    }

    #[test]
    fn auto_mode_downgrades_on_failure_or_unsupported_group() {
        assert_eq!(plan_auto(&NoDetector), SymmetryPlan::none());
        assert_eq!(plan_auto(&FixedDetector("t12")), SymmetryPlan::none());
    }

    #[test]
    fn auto_mode_without_reference_downgrades() {
        let p = plan(SymmetryMode::Auto, None, Path::new("."), &FixedDetector("c2")).unwrap();
        assert_eq!(p, SymmetryPlan::none());
    }

    #[test]
    fn cyclic_plan_triples_body_tokens() {
        let mask: MutabilityMask = "AAXXA".parse().unwrap();
        let contig = encode(&mask, &ChainFrame::for_reference(5));
        let p = plan(SymmetryMode::Cyclic(3), None, Path::new("."), &NoDetector).unwrap();
        let replicated = p.apply(&contig);
        assert_eq!(
            replicated.body_tokens().count(),
            3 * contig.body_tokens().count()
        );
        assert_eq!(replicated.header(), contig.header());
    }
}
