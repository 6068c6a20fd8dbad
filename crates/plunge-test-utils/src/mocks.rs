//! Mock collaborators for engine tests.
//!
//! - [`RecordingExtrapolator`]: leaves the wavefield alone, logs every call.
//! - [`FailingExtrapolator`]: fails deterministically after N steps.
//! - [`FixedReferenceSelector`]: returns scripted reference sets.
//! - [`CountingStore`]: wraps a store and counts slice traffic.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use num_complex::Complex32;
use plunge_core::{
    Extrapolator, Geometry, KernelError, Plane, ReferenceSelector, ReferenceSet, Sample,
    SliceStore, StorageError, VolumeShape,
};

/// One `step()` call as seen by a [`RecordingExtrapolator`].
#[derive(Clone, Debug, PartialEq)]
pub struct StepRecord {
    pub w: Complex32,
    pub current: Vec<f32>,
    pub next: Vec<f32>,
    pub references: Vec<f32>,
}

/// Identity extrapolator that records its inputs.
///
/// The log is shared between the original and every fork, so a test can
/// observe the calls made by all workers.
#[derive(Clone, Debug, Default)]
pub struct RecordingExtrapolator {
    log: Arc<Mutex<Vec<StepRecord>>>,
    geometry: Arc<Mutex<Option<Geometry>>>,
    closed: Arc<AtomicUsize>,
}

impl RecordingExtrapolator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded steps in call order.
    pub fn steps(&self) -> Vec<StepRecord> {
        self.log.lock().unwrap().clone()
    }

    /// The geometry passed to `initialize`, if any.
    pub fn geometry(&self) -> Option<Geometry> {
        self.geometry.lock().unwrap().clone()
    }

    /// How many times `close` was called.
    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Extrapolator for RecordingExtrapolator {
    fn name(&self) -> &str {
        "recording"
    }

    fn initialize(&mut self, geometry: &Geometry) -> Result<(), KernelError> {
        *self.geometry.lock().unwrap() = Some(geometry.clone());
        Ok(())
    }

    fn step(
        &mut self,
        w: Complex32,
        _wavefield: &mut [Complex32],
        current: &[f32],
        next: &[f32],
        references: &[f32],
    ) -> Result<(), KernelError> {
        self.log.lock().unwrap().push(StepRecord {
            w,
            current: current.to_vec(),
            next: next.to_vec(),
            references: references.to_vec(),
        });
        Ok(())
    }

    fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }

    fn fork(&self) -> Box<dyn Extrapolator> {
        Box::new(self.clone())
    }
}

/// Identity extrapolator that fails after `succeed_count` successful steps.
///
/// The counter is shared with forks.
#[derive(Clone, Debug)]
pub struct FailingExtrapolator {
    succeed_count: usize,
    calls: Arc<AtomicUsize>,
}

impl FailingExtrapolator {
    pub fn new(succeed_count: usize) -> Self {
        Self {
            succeed_count,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Extrapolator for FailingExtrapolator {
    fn name(&self) -> &str {
        "failing"
    }

    fn initialize(&mut self, _geometry: &Geometry) -> Result<(), KernelError> {
        Ok(())
    }

    fn step(
        &mut self,
        _w: Complex32,
        _wavefield: &mut [Complex32],
        _current: &[f32],
        _next: &[f32],
        _references: &[f32],
    ) -> Result<(), KernelError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n >= self.succeed_count {
            Err(KernelError::InvalidGeometry {
                reason: format!("failing after {} steps", self.succeed_count),
            })
        } else {
            Ok(())
        }
    }

    fn close(&mut self) {}

    fn fork(&self) -> Box<dyn Extrapolator> {
        Box::new(self.clone())
    }
}

/// Returns `sets[call % sets.len()]`, ignoring its inputs.
#[derive(Debug)]
pub struct FixedReferenceSelector {
    sets: Vec<ReferenceSet>,
    calls: AtomicUsize,
}

impl FixedReferenceSelector {
    /// # Panics
    ///
    /// Panics if `sets` is empty.
    pub fn new(sets: Vec<ReferenceSet>) -> Self {
        assert!(!sets.is_empty(), "need at least one reference set");
        Self {
            sets,
            calls: AtomicUsize::new(0),
        }
    }

    /// Build from plain slices.
    pub fn from_slices(sets: &[&[f32]]) -> Self {
        Self::new(sets.iter().map(|s| ReferenceSet::from_slice(s)).collect())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ReferenceSelector for FixedReferenceSelector {
    fn select(&self, _max_count: usize, _depth_scale: f32, _slowness: &[f32]) -> ReferenceSet {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.sets[n % self.sets.len()].clone()
    }
}

/// Wraps a [`SliceStore`] and counts reads and writes.
#[derive(Debug)]
pub struct CountingStore<S> {
    inner: S,
    gets: AtomicUsize,
    puts: Mutex<Vec<usize>>,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            gets: AtomicUsize::new(0),
            puts: Mutex::new(Vec::new()),
        }
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Slice indices written, in order.
    pub fn put_indices(&self) -> Vec<usize> {
        self.puts.lock().unwrap().clone()
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<T: Sample, S: SliceStore<T>> SliceStore<T> for CountingStore<S> {
    fn shape(&self) -> VolumeShape {
        self.inner.shape()
    }

    fn get(&self, index: usize, out: &mut Plane<T>) -> Result<(), StorageError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(index, out)
    }

    fn put(&mut self, index: usize, data: &Plane<T>) -> Result<(), StorageError> {
        self.puts.lock().unwrap().push(index);
        self.inner.put(index, data)
    }
}
