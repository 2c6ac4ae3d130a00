use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymmetryGroup {
    Cyclic(u32),
    Dihedral(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymmetryLabelError {
    #[error("Unsupported symmetry group family in label '{0}'")]
    UnsupportedFamily(String),
    #[error("Invalid symmetry order in label '{0}'")]
    InvalidOrder(String),
}

impl SymmetryGroup {
    pub fn order(&self) -> u32 {
        match *self {
            SymmetryGroup::Cyclic(order) | SymmetryGroup::Dihedral(order) => order,
        }
    }

    /// Number of rigid subunits: the order for cyclic groups, twice the order for dihedral ones.
    pub fn copies(&self) -> usize {
        match *self {
            SymmetryGroup::Cyclic(order) => order as usize,
            SymmetryGroup::Dihedral(order) => 2 * order as usize,
        }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SymmetryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymmetryGroup::Cyclic(order) => write!(f, "c{order}"),
            SymmetryGroup::Dihedral(order) => write!(f, "d{order}"),
        }
    }
}

impl FromStr for SymmetryGroup {
    type Err = SymmetryLabelError;

    /// Parses detector labels such as `c3`, `C3` or `d2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let mut chars = label.chars();
        let family = chars
            .next()
            .ok_or_else(|| SymmetryLabelError::UnsupportedFamily(label.to_string()))?;
        let order: u32 = chars
            .as_str()
            .parse()
            .ok()
            .filter(|&order| order >= 1)
            .ok_or_else(|| SymmetryLabelError::InvalidOrder(label.to_string()))?;

        match family.to_ascii_lowercase() {
            'c' => Ok(SymmetryGroup::Cyclic(order)),
            'd' => Ok(SymmetryGroup::Dihedral(order)),
            _ => Err(SymmetryLabelError::UnsupportedFamily(label.to_string())),
        }
    }
}

/// Requested symmetry handling for a design cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymmetryMode {
    #[default]
    None,
    Auto,
    Cyclic(u32),
    Dihedral(u32),
}
