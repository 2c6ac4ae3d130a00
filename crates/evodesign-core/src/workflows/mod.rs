//! # Workflows Module
//!
//! High-level entry points that tie the `core` codec and symmetry planning to the `engine`'s
//! job supervision and selection.
//!
//! ## Architecture
//!
//! - **Design Cycle** ([`cycle`]) - One pass of encode, symmetry plan, generate, redesign,
//!   select and reinsert for a single mutability mask.
//! - **Evolution** ([`evolve`]) - Several design cycles run back to back, each seeded with the
//!   previous cycle's sequence.

pub mod cycle;
pub mod evolve;
