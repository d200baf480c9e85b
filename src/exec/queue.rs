// src/exec/queue.rs

//! Bounded work queue and fixed worker pool.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::anyhow;
use tracing::{debug, error, info, warn};

use crate::asset::AssetId;
use crate::errors::Result;
use crate::exec::report::{BuildReport, JobFailure};

/// How many jobs may sit in the channel ahead of the workers, per worker.
const QUEUE_DEPTH_PER_WORKER: usize = 2;

/// A unit of build work: one outdated asset, one attached importer.
///
/// The closure runs on a worker thread and returns an explicit result;
/// it must not touch the cache store or the registry.
pub struct BuildJob {
    asset: AssetId,
    label: String,
    run: Box<dyn FnOnce() -> anyhow::Result<()> + Send>,
}

impl BuildJob {
    pub fn new(
        asset: AssetId,
        label: impl Into<String>,
        run: impl FnOnce() -> anyhow::Result<()> + Send + 'static,
    ) -> Self {
        Self {
            asset,
            label: label.into(),
            run: Box::new(run),
        }
    }

    pub fn asset(&self) -> AssetId {
        self.asset
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Debug for BuildJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildJob")
            .field("asset", &self.asset)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Outcome of one job, sent back from a worker.
struct JobResult {
    asset: AssetId,
    label: String,
    error: Option<anyhow::Error>,
}

/// Holds pushed jobs until [`BuildQueue::execute`] drains them.
///
/// Jobs execute in push order as workers become free (a shared bounded
/// channel, not per-worker assignment, so a single slow conversion does not
/// strand the jobs queued behind it on one worker). `execute` consumes the
/// queue: it is a single-run structure.
#[derive(Debug, Default)]
pub struct BuildQueue {
    jobs: Vec<BuildJob>,
}

impl BuildQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job. Push order is preserved when feeding workers.
    pub fn push(&mut self, job: BuildJob) {
        self.jobs.push(job);
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Run every pushed job to completion on `workers` threads and return
    /// the aggregated report.
    ///
    /// Blocks the caller until all workers have terminated (barrier join).
    /// Every job produces exactly one outcome in the report; a job that
    /// fails or panics is recorded as a failure and does not stop its
    /// siblings.
    pub fn execute(self, workers: usize) -> Result<BuildReport> {
        let total = self.jobs.len();
        let mut report = BuildReport::default();

        if total == 0 {
            return Ok(report);
        }

        let workers = workers.clamp(1, total);
        info!(jobs = total, workers, "starting build run");

        let (job_tx, job_rx) = mpsc::sync_channel::<BuildJob>(workers * QUEUE_DEPTH_PER_WORKER);
        let job_rx = Arc::new(Mutex::new(job_rx));
        let (result_tx, result_rx) = mpsc::channel::<JobResult>();

        let mut handles = Vec::with_capacity(workers);
        for index in 0..workers {
            let job_rx = Arc::clone(&job_rx);
            let result_tx = result_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("build-worker-{index}"))
                .spawn(move || worker_loop(index, &job_rx, &result_tx))?;
            handles.push(handle);
        }
        // Workers hold the only remaining result senders; the receive loop
        // below ends when the last worker exits.
        drop(result_tx);

        // Feed jobs in push order. The bounded channel applies backpressure
        // to the feeder, not the workers.
        for job in self.jobs {
            if let Err(mpsc::SendError(job)) = job_tx.send(job) {
                report.record_failure(JobFailure {
                    asset: job.asset,
                    label: job.label,
                    error: anyhow!("no build workers available"),
                });
            }
        }
        drop(job_tx);

        for result in result_rx {
            match result.error {
                None => report.record_success(),
                Some(error) => report.record_failure(JobFailure {
                    asset: result.asset,
                    label: result.label,
                    error,
                }),
            }
        }

        for handle in handles {
            if handle.join().is_err() {
                error!("build worker panicked outside of a job");
            }
        }

        if report.total() != total {
            warn!(
                expected = total,
                observed = report.total(),
                "build run lost job outcomes"
            );
        }

        info!(
            completed = report.completed(),
            failed = report.failures().len(),
            "build run finished"
        );

        Ok(report)
    }
}

/// Drain jobs from the shared channel until it closes.
fn worker_loop(
    index: usize,
    job_rx: &Mutex<mpsc::Receiver<BuildJob>>,
    result_tx: &mpsc::Sender<JobResult>,
) {
    debug!(worker = index, "build worker started");

    loop {
        let job = {
            // A poisoned lock only means another worker panicked mid-recv;
            // the receiver itself is still usable.
            let guard = job_rx
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            guard.recv()
        };

        let Ok(job) = job else {
            break;
        };

        let BuildJob { asset, label, run } = job;
        debug!(worker = index, job = %label, "job started");

        let outcome = match panic::catch_unwind(AssertUnwindSafe(run)) {
            Ok(Ok(())) => None,
            Ok(Err(error)) => Some(error),
            Err(payload) => Some(anyhow!("job panicked: {}", panic_message(payload.as_ref()))),
        };

        debug!(
            worker = index,
            job = %label,
            success = outcome.is_none(),
            "job finished"
        );

        let _ = result_tx.send(JobResult {
            asset,
            label,
            error: outcome,
        });
    }

    debug!(worker = index, "build worker exiting (queue closed)");
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
