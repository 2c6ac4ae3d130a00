//! # Engine Module
//!
//! Stateful orchestration of one design cycle's external work: launching the structure
//! generator, supervising its intermediate artifacts, running the sequence redesign step and
//! selecting the best candidate.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Immutable parameters for the generator, supervisor and redesign step
//! - **Job Lifecycle** ([`state`], [`supervisor`]) - The `JobStatus` state machine and the polling loop that drives it
//! - **Process Control** ([`process`], [`watcher`], [`cancel`]) - Child processes, artifact readiness and cooperative cancellation
//! - **Selection** ([`redesign`], [`selector`]) - Candidate sequences from redesign reports and best-score selection
//! - **Reporting** ([`progress`], [`sink`]) - Progress events and artifact delivery to callers
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! The supervisor is a single sequential loop. Concurrent jobs only share the filesystem and
//! are kept apart by distinct staging directories.

pub mod cancel;
pub mod config;
pub mod context;
pub mod error;
pub mod process;
pub mod progress;
pub mod redesign;
pub mod selector;
pub mod sink;
pub mod state;
pub mod supervisor;
pub mod watcher;
