//! # EvoDesign Core Library
//!
//! Iterative protein redesign around two external tools: a diffusion-based structure generator
//! and a sequence redesign model. The library turns a per-residue mutability mask into the
//! generator's constraint grammar, supervises the generator while it streams intermediate
//! structures, picks the best redesigned sequence and maps it back onto the original layout.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (masks, constraint strings, symmetry
//!   groups), the mask codec, symmetry planning, and file formats for structures and reports.
//!
//! - **[`engine`]: The Logic Core.** The stateful layer that launches and supervises external
//!   jobs (`GenerationJob`, `ArtifactWatcher`), tracks their `JobStatus`, runs the redesign step
//!   and selects candidates.
//!
//! - **[`workflows`]: The Public API.** Complete procedures built from the two layers below:
//!   a single design cycle and a multi-cycle evolution.

pub mod core;
pub mod engine;
pub mod workflows;
