// src/exec/report.rs

//! Aggregated outcome of a build run.

use crate::asset::AssetId;

/// One failed job: which asset, which job, and why.
#[derive(Debug)]
pub struct JobFailure {
    pub asset: AssetId,
    pub label: String,
    pub error: anyhow::Error,
}

/// Result of draining a [`crate::exec::BuildQueue`].
#[derive(Debug, Default)]
pub struct BuildReport {
    completed: usize,
    failures: Vec<JobFailure>,
}

impl BuildReport {
    pub(crate) fn record_success(&mut self) {
        self.completed += 1;
    }

    pub(crate) fn record_failure(&mut self, failure: JobFailure) {
        self.failures.push(failure);
    }

    /// Number of jobs that completed successfully.
    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn failures(&self) -> &[JobFailure] {
        &self.failures
    }

    /// Total number of jobs that produced an outcome.
    pub fn total(&self) -> usize {
        self.completed + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether every job for `asset` succeeded.
    ///
    /// The driver only commits fingerprints for assets this returns true
    /// for, so a failed importer leaves the asset stale for the next scan.
    pub fn asset_succeeded(&self, asset: AssetId) -> bool {
        !self.failures.iter().any(|f| f.asset == asset)
    }
}
