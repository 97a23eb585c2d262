//! Window-size configuration for the crossfade engine.

use crate::crossfade::CrossfadeError;

/// Window size used when none is configured.
pub const DEFAULT_WINDOW_SIZE: usize = 4096;

/// Smallest window; anything smaller has no half window to crossfade.
pub const MIN_WINDOW_SIZE: usize = 2;

/// Largest window the engine will allocate.
pub const MAX_WINDOW_SIZE: usize = 131_072;

/// Environment variable consulted by [`WindowSize::from_env`].
#[cfg(feature = "std")]
pub const WINDOW_SIZE_ENV: &str = "CROSSFFT_WINDOW_SIZE";

/// A power-of-two window size within
/// [`MIN_WINDOW_SIZE`]`..=`[`MAX_WINDOW_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowSize(usize);

impl WindowSize {
    /// Normalise a requested size: round up to the next power of two, then
    /// clamp into the supported range.
    pub fn new(requested: usize) -> Self {
        let rounded = requested
            .checked_next_power_of_two()
            .unwrap_or(MAX_WINDOW_SIZE);
        Self(rounded.clamp(MIN_WINDOW_SIZE, MAX_WINDOW_SIZE))
    }

    /// Accept `size` only if it needs no correction.
    pub fn exact(size: usize) -> Result<Self, CrossfadeError> {
        let normalized = Self::new(size);
        if normalized.0 == size {
            Ok(normalized)
        } else {
            Err(CrossfadeError::InvalidWindowSize(size))
        }
    }

    /// Read the window size from `CROSSFFT_WINDOW_SIZE`.
    ///
    /// Missing or unparsable values fall back to [`DEFAULT_WINDOW_SIZE`];
    /// parsed values are normalised like [`WindowSize::new`].
    #[cfg(feature = "std")]
    pub fn from_env() -> Self {
        std::env::var(WINDOW_SIZE_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn get(self) -> usize {
        self.0
    }

    pub fn half(self) -> usize {
        self.0 / 2
    }

    /// One full window plus the half-window look-ahead.
    ///
    /// Hosts add this to positions when they need to know how far ahead of
    /// the playback cursor the engine reads.
    pub fn latency(self) -> usize {
        self.0 + self.half()
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self(DEFAULT_WINDOW_SIZE)
    }
}

impl From<WindowSize> for usize {
    fn from(size: WindowSize) -> Self {
        size.0
    }
}
