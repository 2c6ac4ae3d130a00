//! # Core Module
//!
//! Stateless building blocks of EvoDesign: the data models, the mask/contig codec, symmetry
//! arithmetic, and the text formats exchanged with external tools.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Mutability masks, constraint tokens, symmetry groups, candidates
//! - **Mask Codec** ([`codec`]) - Mask → constraint grammar encoding and deletion reinsertion
//! - **Symmetry Planning** ([`symmetry`]) - Replication factors and automatic group detection
//! - **File I/O** ([`io`]) - Redesign reports and chain-layout rewriting of generated structures
//!
//! Nothing in this module owns a process or touches a staging directory; those concerns live in
//! [`crate::engine`].

pub mod codec;
pub mod io;
pub mod models;
pub mod symmetry;
