//! Owned, growable sample storage for the crossfade engine.
//!
//! A [`SampleBuffer`] is a fixed allocation of zero-initialised samples. It
//! never shrinks: growth allocates a fresh buffer, copies the samples the
//! caller asks to keep and then replaces the old allocation. How many of the
//! stored samples are meaningful is tracked by the owner.

use alloc::collections::TryReserveError;
use alloc::vec::Vec;

use crate::num::Float;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer<T: Float> {
    data: Vec<T>,
}

impl<T: Float> Default for SampleBuffer<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

impl<T: Float> SampleBuffer<T> {
    /// An empty buffer that owns no allocation yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate `capacity` zeroed samples.
    pub fn with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut buffer = Self::new();
        buffer.grow(capacity, 0)?;
        Ok(buffer)
    }

    /// Number of samples the buffer can hold.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Ensure room for `new_capacity` samples, keeping the first `preserve`.
    ///
    /// Does nothing when the buffer is already large enough. Otherwise a new
    /// allocation replaces the old one; samples past `preserve` are zero.
    /// `preserve` is clamped to the current capacity.
    pub fn grow(&mut self, new_capacity: usize, preserve: usize) -> Result<(), TryReserveError> {
        if new_capacity <= self.data.len() {
            return Ok(());
        }
        let preserve = preserve.min(self.data.len());
        let mut grown = Vec::new();
        grown.try_reserve_exact(new_capacity)?;
        grown.extend_from_slice(&self.data[..preserve]);
        grown.resize(new_capacity, T::zero());
        self.data = grown;
        Ok(())
    }

    /// Move `keep` samples starting at `offset` to the front of the buffer.
    ///
    /// # Panics
    /// Panics if `offset + keep` exceeds the capacity.
    pub fn shift_left(&mut self, offset: usize, keep: usize) {
        self.data.copy_within(offset..offset + keep, 0);
    }
}
