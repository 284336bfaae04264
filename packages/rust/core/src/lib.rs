//! Core pipeline orchestration for autodesc.
//!
//! This crate ties together document loading, markdown transformation,
//! branch resolution, and publishing into a single run (see [`pipeline::run`]).

pub mod hints;
pub mod pipeline;
pub mod source;

pub use hints::failure_message;
pub use pipeline::{Prepared, RunOutcome, run};
