// src/exec/mod.rs

//! Build execution layer.
//!
//! The only concurrent region of the pipeline. Outdated assets become
//! [`BuildJob`]s; a [`BuildQueue`] feeds them through a bounded channel to
//! a fixed pool of worker threads and joins on completion.
//!
//! - [`queue`] owns the queue, the worker pool, and the barrier join.
//! - [`report`] defines the aggregated run outcome. Every job reports an
//!   explicit success or failure; a failing job is never indistinguishable
//!   from success.

pub mod queue;
pub mod report;

pub use queue::{BuildJob, BuildQueue};
pub use report::{BuildReport, JobFailure};
