//! Symmetry planning for cyclic and dihedral groups. Groups can be detected from a reference
//! structure, whose asymmetric unit is then moved into the generator's symmetry frame.

pub mod detection;
pub mod frame;
pub mod planner;
