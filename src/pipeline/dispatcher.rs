//! Bounded worker pool with submission-ordered results
//!
//! Jobs travel through a pre-filled FIFO channel together with exclusive
//! access to their result slot, so a worker dequeuing job `i` owns `results[i]`
//! and writes it exactly once. No locks guard the result vector.

use std::any::Any;
use std::fmt::Display;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread;

use crossbeam_channel::bounded;
use indicatif::ProgressBar;
use log::{error, info};

use crate::io::configuration::MAX_WORKERS;
use crate::io::error::{PipelineError, Result};

/// Outcome of every job in a batch, indexed by submission order
#[derive(Debug)]
pub struct DispatchReport<T> {
    /// `results[i]` belongs to the `i`th submitted job
    pub results: Vec<Result<T>>,
}

impl<T> DispatchReport<T> {
    /// Number of jobs in the batch
    pub const fn len(&self) -> usize {
        self.results.len()
    }

    /// True for an empty batch
    pub const fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Failed jobs with their submission index
    pub fn failures(&self) -> impl Iterator<Item = (usize, &PipelineError)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(index, result)| result.as_ref().err().map(|e| (index, e)))
    }

    /// Number of successful jobs
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|result| result.is_ok()).count()
    }
}

/// Runs independent jobs on a bounded pool of scoped threads
#[derive(Debug, Clone, Copy)]
pub struct JobDispatcher {
    max_workers: usize,
}

impl Default for JobDispatcher {
    fn default() -> Self {
        Self::new(MAX_WORKERS)
    }
}

impl JobDispatcher {
    /// Create a dispatcher using at most `max_workers` threads
    pub const fn new(max_workers: usize) -> Self {
        Self { max_workers }
    }

    /// Worker count for a batch of `job_count` jobs
    pub fn concurrency(&self, job_count: usize) -> usize {
        self.max_workers.max(1).min(job_count)
    }

    /// Run `worker` over every job and wait for the whole batch
    ///
    /// Jobs may finish in any order; the report is always in submission order.
    /// Per-item errors such as a malformed sheet are recorded in their slot as
    /// is; any other error or a panic becomes `WorkerFailure`. Either way the
    /// remaining jobs keep draining.
    pub fn run<J, T, F>(
        &self,
        jobs: &[J],
        worker: F,
        progress: Option<&ProgressBar>,
    ) -> DispatchReport<T>
    where
        J: Sync + Display,
        T: Send,
        F: Fn(&J) -> Result<T> + Sync,
    {
        if jobs.is_empty() {
            return DispatchReport {
                results: Vec::new(),
            };
        }

        let concurrency = self.concurrency(jobs.len());
        let mut slots: Vec<Option<Result<T>>> = jobs.iter().map(|_| None).collect();

        let (sender, receiver) = bounded(jobs.len());
        for work in jobs.iter().zip(slots.iter_mut()).enumerate() {
            // Capacity equals the job count and the receiver is alive
            if sender.send(work).is_err() {
                break;
            }
        }
        drop(sender);

        thread::scope(|scope| {
            for _ in 0..concurrency {
                let receiver = receiver.clone();
                let worker = &worker;
                let bar = progress;
                scope.spawn(move || {
                    for (index, (job, slot)) in receiver.iter() {
                        info!("New task started. {index}: {job}");
                        let outcome = run_isolated(index, job, worker);
                        match &outcome {
                            Ok(_) => info!("New task done. {index}: {job}"),
                            Err(e) => error!("{e}"),
                        }
                        *slot = Some(outcome);
                        if let Some(bar) = bar {
                            bar.inc(1);
                        }
                    }
                });
            }
        });
        drop(receiver);

        if let Some(bar) = progress {
            bar.finish();
        }
        info!("All complete! {} jobs processed.", jobs.len());

        let results = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    Err(PipelineError::WorkerFailure {
                        index,
                        job: String::from("<not run>"),
                        reason: String::from("job was never picked up"),
                    })
                })
            })
            .collect();

        DispatchReport { results }
    }
}

fn run_isolated<J, T, F>(index: usize, job: &J, worker: &F) -> Result<T>
where
    J: Display,
    F: Fn(&J) -> Result<T>,
{
    match catch_unwind(AssertUnwindSafe(|| worker(job))) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) if e.is_recoverable() => Err(e),
        Ok(Err(e)) => Err(PipelineError::WorkerFailure {
            index,
            job: job.to_string(),
            reason: e.to_string(),
        }),
        Err(payload) => Err(PipelineError::WorkerFailure {
            index,
            job: job.to_string(),
            reason: format!("worker panicked: {}", panic_message(payload.as_ref())),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
