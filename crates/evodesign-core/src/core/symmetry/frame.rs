use super::detection::SymmetryReport;
use crate::core::io::pdb::map_asymmetric_unit;
use crate::core::models::symmetry::SymmetryGroup;
use nalgebra::{Point3, Rotation3, Unit, Vector3};

/// Rigid transform taking a detected assembly into the generator's symmetry frame: the symmetry
/// center at the origin, the principal axis along `z` and, for dihedral groups, the two-fold
/// axis along `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryFrame {
    pub center: Point3<f64>,
    pub rotation: Rotation3<f64>,
}

impl SymmetryFrame {
    /// Builds the frame from detector axes. Cyclic groups use the first axis; dihedral groups
    /// use the second as principal axis and the first as two-fold axis.
    ///
    /// Returns `None` when the report lacks the axes the group needs.
    pub fn from_report(report: &SymmetryReport, group: SymmetryGroup) -> Option<Self> {
        let first = report.transforms.first()?;
        let rotation = match group {
            SymmetryGroup::Cyclic(_) => rotation_onto(&first.axis, &Vector3::z_axis()),
            SymmetryGroup::Dihedral(_) => {
                let principal = &report.transforms.get(1)?.axis;
                let to_z = rotation_onto(principal, &Vector3::z_axis());
                let two_fold = to_z * first.axis.into_inner();
                let in_plane = Vector3::new(two_fold.x, two_fold.y, 0.0);
                if in_plane.norm() < 1e-9 {
                    to_z
                } else {
                    let spin = Rotation3::from_axis_angle(
                        &Vector3::z_axis(),
                        -in_plane.y.atan2(in_plane.x),
                    );
                    spin * to_z
                }
            }
        };
        Some(Self {
            center: first.center,
            rotation,
        })
    }

    pub fn apply(&self, point: Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * (point - self.center))
    }
}

/// Shortest rotation carrying `from` onto `to`, including the antiparallel case.
fn rotation_onto(from: &Unit<Vector3<f64>>, to: &Unit<Vector3<f64>>) -> Rotation3<f64> {
    Rotation3::rotation_between(from.as_ref(), to.as_ref()).unwrap_or_else(|| {
        let helper = if from.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let perpendicular = Unit::new_normalize(from.cross(&helper));
        Rotation3::from_axis_angle(&perpendicular, std::f64::consts::PI)
    })
}

/// Reduces a detected assembly to its asymmetric unit and moves it into the symmetry frame.
///
/// Returns `None` when the report has no usable axes; the caller should keep the original
/// structure in that case.
pub fn symmetrize_reference(
    pdb: &str,
    report: &SymmetryReport,
    group: SymmetryGroup,
) -> Option<String> {
    let frame = SymmetryFrame::from_report(report, group)?;
    Some(map_asymmetric_unit(pdb, &report.chains, |p| frame.apply(p)))
}
