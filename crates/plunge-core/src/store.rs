//! Slice-addressable volume storage.
//!
//! Image, data, slowness and wavefield volumes are 3-D, but the engine only
//! ever touches one 2-D slice at a time. [`SliceStore`] is that access
//! contract; [`MemoryVolume`] and [`FileVolume`] are the two stock backends.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Mutex;

use num_complex::Complex32;

use crate::error::StorageError;
use crate::plane::Plane;

/// A sample type that can live in a volume.
pub trait Sample: Copy + Default + Send + Sync + 'static {
    /// Encoded size in bytes.
    const BYTES: usize;

    /// Encode as little-endian into `out[..Self::BYTES]`.
    fn write_le(self, out: &mut [u8]);

    /// Decode from little-endian `bytes[..Self::BYTES]`.
    fn read_le(bytes: &[u8]) -> Self;
}

impl Sample for f32 {
    const BYTES: usize = 4;

    fn write_le(self, out: &mut [u8]) {
        out[..4].copy_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

impl Sample for Complex32 {
    const BYTES: usize = 8;

    fn write_le(self, out: &mut [u8]) {
        self.re.write_le(&mut out[..4]);
        self.im.write_le(&mut out[4..8]);
    }

    fn read_le(bytes: &[u8]) -> Self {
        Complex32::new(f32::read_le(&bytes[..4]), f32::read_le(&bytes[4..8]))
    }
}

/// Shape of a volume: `slices` planes of `rows x cols`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VolumeShape {
    /// Number of 2-D slices (depth or frequency index).
    pub slices: usize,
    /// Rows per slice.
    pub rows: usize,
    /// Columns per slice.
    pub cols: usize,
}

impl VolumeShape {
    /// Build a shape.
    pub fn new(slices: usize, rows: usize, cols: usize) -> Self {
        Self { slices, rows, cols }
    }

    /// Samples per slice.
    pub fn slice_len(&self) -> usize {
        self.rows * self.cols
    }

    /// `(rows, cols)` of one slice.
    pub fn plane(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Check that `index` addresses a slice and `plane` has slice shape.
    pub fn check(&self, index: usize, plane: (usize, usize)) -> Result<(), StorageError> {
        if index >= self.slices {
            return Err(StorageError::IndexOutOfRange {
                index,
                count: self.slices,
            });
        }
        if plane != self.plane() {
            return Err(StorageError::ShapeMismatch {
                expected: self.plane(),
                actual: plane,
            });
        }
        Ok(())
    }
}

/// Whole-slice get/put access to a 3-D volume.
///
/// # Contract
///
/// - `get` and `put` move exactly one slice; partial access does not exist.
/// - An out-of-range index or a mis-shaped buffer is an error, never a
///   silent truncation.
/// - `get` takes `&self` so read-only volumes (slowness, input data) can be
///   shared between frequency workers.
pub trait SliceStore<T: Sample>: Send + Sync {
    /// Volume dimensions.
    fn shape(&self) -> VolumeShape;

    /// Read slice `index` into `out`.
    fn get(&self, index: usize, out: &mut Plane<T>) -> Result<(), StorageError>;

    /// Overwrite slice `index` with `data`.
    fn put(&mut self, index: usize, data: &Plane<T>) -> Result<(), StorageError>;
}

// ── MemoryVolume ──────────────────────────────────────────────────

/// A volume held in one flat in-memory buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryVolume<T> {
    shape: VolumeShape,
    data: Vec<T>,
}

impl<T: Sample> MemoryVolume<T> {
    /// A zero-filled volume.
    pub fn new(shape: VolumeShape) -> Self {
        Self {
            shape,
            data: vec![T::default(); shape.slices * shape.slice_len()],
        }
    }

    /// Wrap existing samples laid out slice-major, then row-major.
    pub fn from_vec(shape: VolumeShape, data: Vec<T>) -> Result<Self, StorageError> {
        let expected = shape.slices * shape.slice_len();
        if data.len() != expected {
            return Err(StorageError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// A volume whose every sample is `value`.
    pub fn filled(shape: VolumeShape, value: T) -> Self {
        Self {
            shape,
            data: vec![value; shape.slices * shape.slice_len()],
        }
    }

    /// Samples of slice `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn slice(&self, index: usize) -> &[T] {
        let n = self.shape.slice_len();
        &self.data[index * n..(index + 1) * n]
    }

    /// Mutable samples of slice `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn slice_mut(&mut self, index: usize) -> &mut [T] {
        let n = self.shape.slice_len();
        &mut self.data[index * n..(index + 1) * n]
    }

    /// All samples.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T: Sample> SliceStore<T> for MemoryVolume<T> {
    fn shape(&self) -> VolumeShape {
        self.shape
    }

    fn get(&self, index: usize, out: &mut Plane<T>) -> Result<(), StorageError> {
        self.shape.check(index, out.shape())?;
        out.as_mut_slice().copy_from_slice(self.slice(index));
        Ok(())
    }

    fn put(&mut self, index: usize, data: &Plane<T>) -> Result<(), StorageError> {
        self.shape.check(index, data.shape())?;
        self.slice_mut(index).copy_from_slice(data.as_slice());
        Ok(())
    }
}

// ── FileVolume ────────────────────────────────────────────────────

/// A volume stored as raw little-endian samples in a file.
///
/// Only the slice being transferred is ever in memory. Reads go through a
/// mutex so a shared `&FileVolume` can serve several frequency workers.
#[derive(Debug)]
pub struct FileVolume<T> {
    file: Mutex<File>,
    shape: VolumeShape,
    _sample: PhantomData<T>,
}

impl<T: Sample> FileVolume<T> {
    /// Create (or truncate) `path` as a zero-filled volume of `shape`.
    pub fn create(path: impl AsRef<Path>, shape: VolumeShape) -> Result<Self, StorageError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(Self::byte_len(shape))?;
        Ok(Self {
            file: Mutex::new(file),
            shape,
            _sample: PhantomData,
        })
    }

    /// Open an existing volume file, checking its length against `shape`.
    pub fn open(path: impl AsRef<Path>, shape: VolumeShape) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let len = file.metadata()?.len();
        if len != Self::byte_len(shape) {
            return Err(StorageError::Io {
                reason: format!(
                    "{} holds {len} bytes, expected {} for {}x{}x{} samples",
                    path.display(),
                    Self::byte_len(shape),
                    shape.slices,
                    shape.rows,
                    shape.cols,
                ),
            });
        }
        Ok(Self {
            file: Mutex::new(file),
            shape,
            _sample: PhantomData,
        })
    }

    /// Flush written slices to disk.
    pub fn sync(&mut self) -> Result<(), StorageError> {
        self.file_mut()?.sync_data()?;
        Ok(())
    }

    fn byte_len(shape: VolumeShape) -> u64 {
        (shape.slices * shape.slice_len() * T::BYTES) as u64
    }

    fn offset(&self, index: usize) -> u64 {
        (index * self.shape.slice_len() * T::BYTES) as u64
    }

    fn file_mut(&mut self) -> Result<&mut File, StorageError> {
        self.file.get_mut().map_err(|_| StorageError::Io {
            reason: "volume file lock poisoned".to_string(),
        })
    }
}

impl<T: Sample> SliceStore<T> for FileVolume<T> {
    fn shape(&self) -> VolumeShape {
        self.shape
    }

    fn get(&self, index: usize, out: &mut Plane<T>) -> Result<(), StorageError> {
        self.shape.check(index, out.shape())?;
        let mut bytes = vec![0u8; self.shape.slice_len() * T::BYTES];
        {
            let mut file = self.file.lock().map_err(|_| StorageError::Io {
                reason: "volume file lock poisoned".to_string(),
            })?;
            file.seek(SeekFrom::Start(self.offset(index)))?;
            file.read_exact(&mut bytes)?;
        }
        for (dst, chunk) in out
            .as_mut_slice()
            .iter_mut()
            .zip(bytes.chunks_exact(T::BYTES))
        {
            *dst = T::read_le(chunk);
        }
        Ok(())
    }

    fn put(&mut self, index: usize, data: &Plane<T>) -> Result<(), StorageError> {
        self.shape.check(index, data.shape())?;
        let mut bytes = vec![0u8; self.shape.slice_len() * T::BYTES];
        for (&src, chunk) in data
            .as_slice()
            .iter()
            .zip(bytes.chunks_exact_mut(T::BYTES))
        {
            src.write_le(chunk);
        }
        let offset = self.offset(index);
        let file = self.file_mut()?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "plunge-store-{tag}-{}-{:?}.bin",
            std::process::id(),
            std::thread::current().id()
        ))
    }

    #[test]
    fn memory_volume_get_put() {
        let shape = VolumeShape::new(3, 2, 2);
        let mut vol = MemoryVolume::<f32>::new(shape);
        let p = Plane::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        vol.put(1, &p).unwrap();

        let mut out = Plane::new(2, 2);
        vol.get(1, &mut out).unwrap();
        assert_eq!(out, p);
        vol.get(0, &mut out).unwrap();
        assert!(out.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn memory_volume_rejects_out_of_range() {
        let vol = MemoryVolume::<f32>::new(VolumeShape::new(2, 2, 2));
        let mut out = Plane::new(2, 2);
        match vol.get(2, &mut out) {
            Err(StorageError::IndexOutOfRange { index: 2, count: 2 }) => {}
            other => panic!("expected IndexOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn memory_volume_rejects_wrong_plane_shape() {
        let mut vol = MemoryVolume::<f32>::new(VolumeShape::new(2, 2, 3));
        let p: Plane<f32> = Plane::new(3, 2);
        match vol.put(0, &p) {
            Err(StorageError::ShapeMismatch {
                expected: (2, 3),
                actual: (3, 2),
            }) => {}
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn memory_volume_from_vec_checks_length() {
        let shape = VolumeShape::new(2, 2, 2);
        match MemoryVolume::from_vec(shape, vec![0.0f32; 7]) {
            Err(StorageError::LengthMismatch {
                expected: 8,
                actual: 7,
            }) => {}
            other => panic!("expected LengthMismatch, got {other:?}"),
        }
        let vol = MemoryVolume::from_vec(shape, (0..8).map(|v| v as f32).collect()).unwrap();
        assert_eq!(vol.slice(1), &[4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn file_volume_complex_slices_survive_reopen() {
        let path = temp_path("complex");
        let shape = VolumeShape::new(4, 2, 3);
        let written = Plane::from_vec(
            2,
            3,
            (0..6).map(|i| Complex32::new(i as f32, -(i as f32) * 0.5)).collect(),
        )
        .unwrap();
        {
            let mut vol = FileVolume::<Complex32>::create(&path, shape).unwrap();
            vol.put(2, &written).unwrap();
            vol.sync().unwrap();
        }

        let vol = FileVolume::<Complex32>::open(&path, shape).unwrap();
        let mut out = Plane::new(2, 3);
        vol.get(2, &mut out).unwrap();
        assert_eq!(out, written);
        vol.get(3, &mut out).unwrap();
        assert!(out.as_slice().iter().all(|c| *c == Complex32::new(0.0, 0.0)));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn file_volume_open_rejects_wrong_length() {
        let path = temp_path("length");
        {
            FileVolume::<f32>::create(&path, VolumeShape::new(2, 2, 2)).unwrap();
        }
        match FileVolume::<f32>::open(&path, VolumeShape::new(3, 2, 2)) {
            Err(StorageError::Io { reason }) => assert!(reason.contains("expected 48")),
            other => panic!("expected Io length error, got {other:?}"),
        }
        std::fs::remove_file(&path).unwrap();
    }
}
