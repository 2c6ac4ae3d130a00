//! # Core Models Module
//!
//! Data structures shared by every layer of EvoDesign.
//!
//! ## Key Components
//!
//! - [`residue`] - The canonical amino acid alphabet and its one-letter codes
//! - [`mask`] - Per-residue mutability masks (retained, free, deleted)
//! - [`contig`] - The run-length constraint grammar handed to structure generators
//! - [`symmetry`] - Cyclic and dihedral symmetry groups and the requested symmetry mode
//! - [`candidate`] - Redesigned sequences before and after score parsing
//!
//! ```ignore
//! use evodesign::core::models::mask::MutabilityMask;
//!
//! let mask: MutabilityMask = "LAG--XXC".parse()?;
//! assert_eq!(mask.expected_residue_count(), 6);
//! ```

pub mod candidate;
pub mod contig;
pub mod mask;
pub mod residue;
pub mod symmetry;
