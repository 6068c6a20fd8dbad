//! Frequency-parallel migration.
//!
//! Frequencies are independent until their contributions are summed into
//! the image. Each worker thread receives frequency indices over a
//! crossbeam channel, continues them with its own forked extrapolator and
//! private wavefield, and sends the real part of every depth level back.
//! The calling thread owns the image and applies the contributions one
//! slice at a time, so the image store never sees concurrent access.
//!
//! The result equals [`migrate`](DepthContinuationEngine::migrate) up to
//! the order of floating-point summation across frequencies.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use num_complex::Complex32;
use plunge_core::SliceStore;
use tracing::debug;

use crate::engine::{accumulate, expect_shape, finish, zero_image, DepthContinuationEngine, ImageScratch};
use crate::error::EngineError;
use crate::report::{Operation, RunReport};
use crate::worker::{FrequencyWorker, Shared};

/// Message from a migration worker to the image accumulator.
enum WorkerMessage {
    /// Real part of the wavefield at depth `iz` for one frequency.
    Slice { iz: usize, values: Vec<f32> },
    /// The worker ran out of frequencies; its partial counters.
    Done(RunReport),
    /// The worker stopped on an error.
    Failed(EngineError),
}

/// Resolve the number of worker threads for `frequencies` jobs.
///
/// Explicit values are clamped to `[1, 64]`; `None` uses the available
/// parallelism. Never more workers than frequencies.
pub fn resolved_worker_count(requested: Option<usize>, frequencies: usize) -> usize {
    let n = match requested {
        Some(n) => n.clamp(1, 64),
        None => std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4),
    };
    n.min(frequencies.max(1))
}

impl DepthContinuationEngine {
    /// [`migrate`](Self::migrate) with frequencies spread over `workers`
    /// threads.
    ///
    /// The first error from any worker or from the image store cancels the
    /// remaining frequencies and is returned.
    pub fn migrate_parallel(
        &mut self,
        scratch: &mut ImageScratch,
        data: &dyn SliceStore<Complex32>,
        image: &mut dyn SliceStore<f32>,
        workers: Option<usize>,
    ) -> Result<RunReport, EngineError> {
        let started = Instant::now();
        expect_shape("data", data.shape(), self.config.data_shape())?;
        expect_shape("image", image.shape(), self.config.image_shape())?;
        self.check_scratch(scratch)?;

        let mut report = RunReport::new(Operation::Migrate);
        zero_image(image, &mut scratch.slice, &mut report)?;

        let nw = self.plan.frequencies();
        let count = resolved_worker_count(workers, nw);
        let (task_tx, task_rx) = crossbeam_channel::unbounded();
        for iw in 0..nw {
            task_tx.send(iw).map_err(|_| EngineError::WorkerFailed {
                reason: "task queue closed".into(),
            })?;
        }
        drop(task_tx);

        let (result_tx, result_rx) = crossbeam_channel::bounded(count * 2);
        let cancel = AtomicBool::new(false);
        let shared = Shared {
            plan: &self.plan,
            slowness: &*self.slowness,
        };
        let forks: Vec<FrequencyWorker> = (0..count)
            .map(|_| self.worker.fork(&self.plan.geometry))
            .collect();
        debug!(workers = count, frequencies = nw, "parallel migration started");

        let image_updates = std::thread::scope(|s| {
            let handles: Vec<_> = forks
                .into_iter()
                .map(|worker| {
                    let task_rx = task_rx.clone();
                    let result_tx = result_tx.clone();
                    let cancel = &cancel;
                    s.spawn(move || worker_loop(worker, shared, data, task_rx, result_tx, cancel))
                })
                .collect();
            drop(result_tx);

            let mut first_error: Option<EngineError> = None;
            let mut image_updates = 0u64;
            for message in result_rx.iter() {
                match message {
                    WorkerMessage::Slice { iz, values } => {
                        if first_error.is_some() {
                            continue;
                        }
                        match accumulate(image, &mut scratch.slice, iz, values.into_iter()) {
                            Ok(()) => image_updates += 1,
                            Err(e) => {
                                cancel.store(true, Ordering::Release);
                                first_error = Some(e.into());
                            }
                        }
                    }
                    WorkerMessage::Done(partial) => report.merge(&partial),
                    WorkerMessage::Failed(e) => {
                        cancel.store(true, Ordering::Release);
                        first_error.get_or_insert(e);
                    }
                }
            }

            for handle in handles {
                if handle.join().is_err() {
                    first_error.get_or_insert(EngineError::WorkerFailed {
                        reason: "migration worker panicked".into(),
                    });
                }
            }
            match first_error {
                Some(e) => Err(e),
                None => Ok(image_updates),
            }
        })?;

        report.slices_read += image_updates;
        report.slices_written += image_updates;
        Ok(finish(report, started))
    }
}

fn worker_loop(
    mut worker: FrequencyWorker,
    shared: Shared<'_>,
    data: &dyn SliceStore<Complex32>,
    task_rx: Receiver<usize>,
    result_tx: Sender<WorkerMessage>,
    cancel: &AtomicBool,
) {
    let mut report = RunReport::new(Operation::Migrate);
    while let Ok(iw) = task_rx.recv() {
        if cancel.load(Ordering::Acquire) {
            break;
        }
        let outcome = worker.migrate_frequency(shared, iw, data, &mut report, |iz, field| {
            let values = field.as_slice().iter().map(|c| c.re).collect();
            result_tx
                .send(WorkerMessage::Slice { iz, values })
                .map_err(|_| EngineError::WorkerFailed {
                    reason: "image accumulator disconnected".into(),
                })
        });
        if let Err(e) = outcome {
            cancel.store(true, Ordering::Release);
            let _ = result_tx.send(WorkerMessage::Failed(e));
            return;
        }
    }
    worker.release();
    let _ = result_tx.send(WorkerMessage::Done(report));
}
