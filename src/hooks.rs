//! Host-supplied collaborators of the crossfade engine.
//!
//! The engine pulls raw samples through a [`SampleSource`] and lets a
//! [`SpectralHooks`] implementation rewrite each window, once in the
//! frequency domain and once in the time domain.

use crate::crossfade::PlayDirection;
use crate::num::Float;

/// Failure reported by a [`SampleSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceError {
    /// The requested range lies outside anything the host can produce.
    OutOfRange,
    /// The host failed to produce samples.
    Failed,
}

impl core::fmt::Display for SourceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SourceError::OutOfRange => write!(f, "requested samples are out of range"),
            SourceError::Failed => write!(f, "sample source failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SourceError {}

/// Raw sample provider for the engine.
pub trait SampleSource<T: Float> {
    /// Fill `dest` with consecutive samples beginning at `start`.
    ///
    /// Samples are written in playback order: for
    /// [`PlayDirection::Reverse`] `dest[i]` holds position `start - i`.
    /// Returns the number of samples written; anything short of
    /// `dest.len()` means the media ended.
    fn read_samples(
        &mut self,
        start: i64,
        direction: PlayDirection,
        dest: &mut [T],
    ) -> Result<usize, SourceError>;
}

impl<T, F> SampleSource<T> for F
where
    T: Float,
    F: FnMut(i64, PlayDirection, &mut [T]) -> Result<usize, SourceError>,
{
    fn read_samples(
        &mut self,
        start: i64,
        direction: PlayDirection,
        dest: &mut [T],
    ) -> Result<usize, SourceError> {
        self(start, direction, dest)
    }
}

/// An in-memory signal is a source whose position `p` is element `p`.
///
/// Reads stop at either end of the slice, so running off the media is
/// reported as a short read rather than an error.
impl<T: Float> SampleSource<T> for [T] {
    fn read_samples(
        &mut self,
        start: i64,
        direction: PlayDirection,
        dest: &mut [T],
    ) -> Result<usize, SourceError> {
        let len = self.len() as i64;
        let step = direction.step();
        let mut written = 0;
        for (i, out) in dest.iter_mut().enumerate() {
            let position = start + step * i as i64;
            if position < 0 || position >= len {
                break;
            }
            *out = self[position as usize];
            written += 1;
        }
        Ok(written)
    }
}

/// Per-window effect callbacks.
///
/// Both methods default to no-ops, so an effect overrides only the stage it
/// needs. Neither can fail; an effect handles its own errors.
pub trait SpectralHooks<T: Float> {
    /// Rewrite the spectrum of the current window in place.
    fn signal_process(&mut self, freq_real: &mut [T], freq_imag: &mut [T]) {
        let _ = (freq_real, freq_imag);
    }

    /// Rewrite the time-domain result of the current window before it is
    /// crossfaded into the output.
    fn post_process(&mut self, output_real: &mut [T], output_imag: &mut [T]) {
        let _ = (output_real, output_imag);
    }
}

/// Hooks that leave every window untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl<T: Float> SpectralHooks<T> for Identity {}

impl<T: Float, H: SpectralHooks<T> + ?Sized> SpectralHooks<T> for &mut H {
    fn signal_process(&mut self, freq_real: &mut [T], freq_imag: &mut [T]) {
        (**self).signal_process(freq_real, freq_imag)
    }

    fn post_process(&mut self, output_real: &mut [T], output_imag: &mut [T]) {
        (**self).post_process(output_real, output_imag)
    }
}
