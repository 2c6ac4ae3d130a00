//! Readers and writers for the text formats exchanged with external collaborators.
//!
//! - [`report`] reads header+sequence reports produced by the sequence redesign step.
//! - [`pdb`] rewrites generated structures so their chains follow the constraint layout.

pub mod pdb;
pub mod report;
pub mod traits;
