//! Bidirectional translation between mutability masks and the constraint grammar.
//!
//! - [`scanner`] turns a [`MutabilityMask`](crate::core::models::mask::MutabilityMask) into a
//!   [`ConstraintString`](crate::core::models::contig::ConstraintString).
//! - [`reinsert`] folds a generated sequence back into the mask's coordinate space.

pub mod reinsert;
pub mod scanner;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Unrecognized mask symbol '{symbol}' at position {position}")]
    EncodingInvariantViolation { position: usize, symbol: char },

    #[error("Sequence length mismatch: expected {expected} residues, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Invalid constraint grammar: {0}")]
    InvalidGrammar(String),
}
