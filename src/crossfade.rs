//! Windowed overlap-add engine for frequency-domain effects.
//!
//! [`CrossfadeFft`] pulls raw samples from a [`SampleSource`], slices them
//! into windows that overlap by half their length, and runs every window
//! through a forward transform, the effect's [`SpectralHooks`] and an
//! inverse transform. Consecutive windows are joined with a triangular
//! crossfade over their shared half window, so independently processed
//! windows reconstruct one continuous stream.
//!
//! Requests may have any length and may jump to any position. A request
//! whose position differs from where the previous one ended, or which plays
//! in the other direction, is treated as a seek: accumulated state is
//! discarded and reconstruction starts over with an unblended first window.
//!
//! # Example
//! ```
//! use crossfft::crossfade::{CrossfadeFft, Request};
//! use crossfft::hooks::Identity;
//!
//! let mut signal: Vec<f64> = (0..64).map(|i| i as f64).collect();
//! let mut engine = CrossfadeFft::<f64>::new(8);
//! let mut block = [0.0; 8];
//! engine
//!     .request(Request::forward(0, 8), Some(&mut block[..]), &mut signal[..], &mut Identity)
//!     .unwrap();
//! assert!((block[5] - 5.0).abs() < 1e-9);
//! ```

use alloc::collections::TryReserveError;

use crate::buffer::SampleBuffer;
use crate::config::WindowSize;
use crate::fft::{FftError, FftImpl, RecurrenceFft};
use crate::hooks::{SampleSource, SourceError, SpectralHooks};
use crate::num::Float;

/// Playback direction of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayDirection {
    #[default]
    Forward,
    Reverse,
}

impl PlayDirection {
    /// Position increment per sample: `+1` forward, `-1` in reverse.
    pub fn step(self) -> i64 {
        match self {
            PlayDirection::Forward => 1,
            PlayDirection::Reverse => -1,
        }
    }
}

/// A block of output the host wants rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    /// Absolute stream position of the first output sample.
    pub position: i64,
    /// Number of samples to render.
    pub count: usize,
    pub direction: PlayDirection,
}

impl Request {
    pub fn forward(position: i64, count: usize) -> Self {
        Self {
            position,
            count,
            direction: PlayDirection::Forward,
        }
    }

    pub fn reverse(position: i64, count: usize) -> Self {
        Self {
            position,
            count,
            direction: PlayDirection::Reverse,
        }
    }

    /// Position the following contiguous request starts at.
    pub fn next_position(&self) -> i64 {
        self.position + self.direction.step() * self.count as i64
    }
}

/// Errors reported by [`CrossfadeFft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossfadeError {
    /// A window size needed rounding or clamping.
    InvalidWindowSize(usize),
    /// A working buffer could not be grown, or its size overflowed.
    OutOfMemory,
    /// The caller's output buffer is shorter than the request.
    OutputTooSmall { needed: usize, len: usize },
    /// The request reached past the end of the media. The output buffer was
    /// filled, but only its first `delivered` of `requested` samples come
    /// from real input; the rest render silence.
    ShortRead { requested: usize, delivered: usize },
    /// The source failed. Nothing was written to the output buffer and the
    /// stream restarts at the requested position on the next call.
    Source(SourceError),
    /// The transform rejected a window.
    Transform(FftError),
}

impl CrossfadeError {
    /// Whether the request still produced a complete block of output.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CrossfadeError::ShortRead { .. })
    }
}

impl core::fmt::Display for CrossfadeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CrossfadeError::InvalidWindowSize(size) => write!(
                f,
                "window size {size} is not a power of two between {} and {}",
                crate::config::MIN_WINDOW_SIZE,
                crate::config::MAX_WINDOW_SIZE
            ),
            CrossfadeError::OutOfMemory => write!(f, "failed to grow a sample buffer"),
            CrossfadeError::OutputTooSmall { needed, len } => {
                write!(f, "output buffer holds {len} samples but {needed} were requested")
            }
            CrossfadeError::ShortRead {
                requested,
                delivered,
            } => write!(
                f,
                "media ended after {delivered} of {requested} samples; remainder rendered as silence"
            ),
            CrossfadeError::Source(e) => write!(f, "source error: {e}"),
            CrossfadeError::Transform(e) => write!(f, "transform error: {e}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CrossfadeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CrossfadeError::Source(e) => Some(e),
            CrossfadeError::Transform(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FftError> for CrossfadeError {
    fn from(e: FftError) -> Self {
        CrossfadeError::Transform(e)
    }
}

impl From<SourceError> for CrossfadeError {
    fn from(e: SourceError) -> Self {
        CrossfadeError::Source(e)
    }
}

impl From<TryReserveError> for CrossfadeError {
    fn from(_: TryReserveError) -> Self {
        CrossfadeError::OutOfMemory
    }
}

/// Blend `incoming` into `existing` with a linear ramp.
///
/// Sample `i` of `n` becomes `existing·(n−i)/n + incoming·i/n`: the start
/// keeps the existing signal and the weight shifts to `incoming` one step
/// per sample.
pub fn crossfade<T: Float>(existing: &mut [T], incoming: &[T]) {
    let len = existing.len();
    let span = T::from_usize(len);
    for (i, (dst, &src)) in existing.iter_mut().zip(incoming).enumerate() {
        let src_level = T::from_usize(i) / span;
        let dst_level = T::from_usize(len - i) / span;
        *dst = *dst * dst_level + src * src_level;
    }
}

enum EngineState<T: Float> {
    Uninitialized,
    Streaming(Stream<T>),
}

/// Buffers and cursors of an engine that has produced output.
struct Stream<T: Float> {
    /// Raw samples not yet consumed by a window, in playback order.
    input: SampleBuffer<T>,
    input_size: usize,
    /// Next source position to read.
    input_sample: i64,
    /// Reconstructed samples; `output_size` are final, the following half
    /// window still awaits its crossfade.
    output: SampleBuffer<T>,
    output_size: usize,
    /// Stream position of `output[0]`.
    output_sample: i64,
    direction: PlayDirection,
    /// First position the source could not deliver, once a read came back
    /// short.
    end_of_media: Option<i64>,
    first_window: bool,
    freq_real: SampleBuffer<T>,
    freq_imag: SampleBuffer<T>,
    output_real: SampleBuffer<T>,
    output_imag: SampleBuffer<T>,
}

impl<T: Float> Stream<T> {
    fn allocate(window: WindowSize, request: Request) -> Result<Self, CrossfadeError> {
        let size = window.get();
        Ok(Self {
            input: SampleBuffer::new(),
            input_size: 0,
            input_sample: request.position,
            output: SampleBuffer::with_capacity(size)?,
            output_size: 0,
            output_sample: request.position,
            direction: request.direction,
            end_of_media: None,
            first_window: true,
            freq_real: SampleBuffer::with_capacity(size)?,
            freq_imag: SampleBuffer::with_capacity(size)?,
            output_real: SampleBuffer::with_capacity(size)?,
            output_imag: SampleBuffer::with_capacity(size)?,
        })
    }

    fn seek(&mut self, request: Request) {
        self.input_size = 0;
        self.output_size = 0;
        self.first_window = true;
        self.input_sample = request.position;
        self.output_sample = request.position;
        self.direction = request.direction;
        self.end_of_media = None;
    }

    /// Samples of `request` that lie before the end of the media.
    fn real_samples(&self, request: Request) -> usize {
        match self.end_of_media {
            None => request.count,
            Some(end) => {
                let available = end
                    .saturating_sub(request.position)
                    .saturating_mul(request.direction.step());
                usize::try_from(available.max(0)).map_or(request.count, |n| n.min(request.count))
            }
        }
    }

    fn process<F, S, H>(
        &mut self,
        fft: &F,
        window: WindowSize,
        request: Request,
        output: Option<&mut [T]>,
        source: &mut S,
        hooks: &mut H,
    ) -> Result<(), CrossfadeError>
    where
        F: FftImpl<T>,
        S: SampleSource<T> + ?Sized,
        H: SpectralHooks<T> + ?Sized,
    {
        let half = window.half();
        self.provision(request, half, source)?;

        while self.output_size < request.count {
            if let Err(e) = self.render_window(fft, window, hooks) {
                self.seek(request);
                return Err(e);
            }
        }

        if let Some(out) = output {
            out[..request.count].copy_from_slice(&self.output.as_slice()[..request.count]);
        }

        let keep = self.output_size + half - request.count;
        self.output.shift_left(request.count, keep);
        self.output_size -= request.count;
        self.output_sample = request.next_position();

        let delivered = self.real_samples(request);
        if delivered < request.count {
            return Err(CrossfadeError::ShortRead {
                requested: request.count,
                delivered,
            });
        }
        Ok(())
    }

    /// Read enough input for the windows this request needs.
    ///
    /// The input is kept at a whole number of half windows covering the
    /// output deficit, plus one half window of look-ahead. Samples past the
    /// end of the media are zero and the end position is remembered.
    fn provision<S>(
        &mut self,
        request: Request,
        half: usize,
        source: &mut S,
    ) -> Result<(), CrossfadeError>
    where
        S: SampleSource<T> + ?Sized,
    {
        let deficit = request.count.saturating_sub(self.output_size);
        let Some(need) = deficit
            .div_ceil(half)
            .checked_mul(half)
            .and_then(|n| n.checked_add(half))
        else {
            self.seek(request);
            return Err(CrossfadeError::OutOfMemory);
        };
        if need <= self.input_size {
            return Ok(());
        }

        if need > self.input.capacity() {
            debug_log!(
                "growing input buffer {} -> {} samples",
                self.input.capacity(),
                need
            );
        }
        if let Err(e) = self.input.grow(need, self.input_size) {
            self.seek(request);
            return Err(e.into());
        }

        let wanted = need - self.input_size;
        let dest = &mut self.input.as_mut_slice()[self.input_size..need];
        let delivered = match source.read_samples(self.input_sample, request.direction, dest) {
            Ok(n) => n.min(wanted),
            Err(e) => {
                warn_log!(
                    "source failed at position {}: {}; restarting at {}",
                    self.input_sample,
                    e,
                    request.position
                );
                self.seek(request);
                return Err(e.into());
            }
        };
        let step = request.direction.step();
        if delivered < wanted {
            dest[delivered..].fill(T::zero());
            if self.end_of_media.is_none() {
                self.end_of_media = Some(self.input_sample + step * delivered as i64);
            }
            debug_log!(
                "short read at position {}: {} of {} samples",
                self.input_sample,
                delivered,
                wanted
            );
        }
        trace_log!(
            "read {} samples at {} (input {} -> {})",
            wanted,
            self.input_sample,
            self.input_size,
            need
        );

        self.input_sample += step * wanted as i64;
        self.input_size = need;
        Ok(())
    }

    fn render_window<F, H>(
        &mut self,
        fft: &F,
        window: WindowSize,
        hooks: &mut H,
    ) -> Result<(), CrossfadeError>
    where
        F: FftImpl<T>,
        H: SpectralHooks<T> + ?Sized,
    {
        let size = window.get();
        let half = window.half();

        fft.forward(
            &self.input.as_slice()[..size],
            None,
            self.freq_real.as_mut_slice(),
            self.freq_imag.as_mut_slice(),
        )?;
        hooks.signal_process(self.freq_real.as_mut_slice(), self.freq_imag.as_mut_slice());
        fft.inverse(
            self.freq_real.as_slice(),
            self.freq_imag.as_slice(),
            self.output_real.as_mut_slice(),
            self.output_imag.as_mut_slice(),
        )?;
        hooks.post_process(
            self.output_real.as_mut_slice(),
            self.output_imag.as_mut_slice(),
        );

        // The next window blends into the half window after output_size,
        // so growth must carry it over.
        let end = self.output_size + size;
        if end > self.output.capacity() {
            debug_log!(
                "growing output buffer {} -> {} samples",
                self.output.capacity(),
                end
            );
            self.output.grow(end, self.output_size + half)?;
        }

        let rendered = self.output_real.as_slice();
        let dst = &mut self.output.as_mut_slice()[self.output_size..end];
        if self.first_window {
            dst.copy_from_slice(rendered);
            self.first_window = false;
        } else {
            crossfade(&mut dst[..half], &rendered[..half]);
            dst[half..].copy_from_slice(&rendered[half..]);
        }
        trace_log!(
            "window rendered at output offset {} (stream position {})",
            self.output_size,
            self.output_sample
        );

        self.output_size += half;
        self.input.shift_left(half, self.input_size - half);
        self.input_size -= half;
        Ok(())
    }
}

/// Streaming overlap-add engine.
///
/// `T` is the sample type and `F` the transform used for every window.
/// Buffers are allocated on the first request and reused until the window
/// size changes; all state is private to one engine.
pub struct CrossfadeFft<T: Float, F: FftImpl<T> = RecurrenceFft> {
    window: WindowSize,
    fft: F,
    state: EngineState<T>,
}

impl<T: Float> CrossfadeFft<T> {
    /// Engine with [`RecurrenceFft`] and a normalised `window_size`.
    pub fn new(window_size: usize) -> Self {
        Self::with_fft(window_size, RecurrenceFft)
    }
}

impl<T: Float, F: FftImpl<T> + Default> Default for CrossfadeFft<T, F> {
    fn default() -> Self {
        Self {
            window: WindowSize::default(),
            fft: F::default(),
            state: EngineState::Uninitialized,
        }
    }
}

impl<T: Float, F: FftImpl<T>> CrossfadeFft<T, F> {
    pub fn with_fft(window_size: usize, fft: F) -> Self {
        let mut engine = Self {
            window: WindowSize::default(),
            fft,
            state: EngineState::Uninitialized,
        };
        engine.configure(window_size);
        engine
    }

    /// Change the window size, releasing every buffer.
    ///
    /// The size is rounded up to a power of two and clamped; the corrected
    /// value is returned.
    pub fn configure(&mut self, window_size: usize) -> WindowSize {
        let window = WindowSize::new(window_size);
        if window.get() != window_size {
            warn_log!(
                "window size {} corrected to {}",
                window_size,
                window.get()
            );
        }
        self.window = window;
        self.state = EngineState::Uninitialized;
        window
    }

    /// Release every buffer while keeping the window size.
    pub fn reset(&mut self) {
        self.state = EngineState::Uninitialized;
    }

    pub fn window_size(&self) -> usize {
        self.window.get()
    }

    pub fn half_window(&self) -> usize {
        self.window.half()
    }

    /// Processing latency hosts compensate for: one window plus a half
    /// window of look-ahead.
    pub fn latency(&self) -> usize {
        self.window.latency()
    }

    pub fn fft(&self) -> &F {
        &self.fft
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.state, EngineState::Streaming(_))
    }

    /// Stream position the next contiguous request must start at.
    pub fn position(&self) -> Option<i64> {
        match &self.state {
            EngineState::Streaming(stream) => Some(stream.output_sample),
            EngineState::Uninitialized => None,
        }
    }

    /// Raw samples read ahead but not yet consumed by a window.
    pub fn buffered_input(&self) -> usize {
        match &self.state {
            EngineState::Streaming(stream) => stream.input_size,
            EngineState::Uninitialized => 0,
        }
    }

    /// Reconstructed samples ready for the next request.
    pub fn buffered_output(&self) -> usize {
        match &self.state {
            EngineState::Streaming(stream) => stream.output_size,
            EngineState::Uninitialized => 0,
        }
    }

    /// Whether the next window is copied without a crossfade.
    pub fn is_first_window(&self) -> bool {
        match &self.state {
            EngineState::Streaming(stream) => stream.first_window,
            EngineState::Uninitialized => true,
        }
    }

    /// Render `request.count` samples starting at `request.position`.
    ///
    /// When `output` is given the samples are copied into its first
    /// `request.count` elements; passing `None` advances the stream without
    /// copying. A position or direction that does not continue the previous
    /// request is a seek and restarts reconstruction there.
    ///
    /// # Errors
    /// - [`CrossfadeError::ShortRead`] when the request reaches past the end
    ///   of the media; the output is still complete, with silence after the
    ///   last real sample.
    /// - [`CrossfadeError::Source`] when the source failed; the output is
    ///   untouched.
    /// - [`CrossfadeError::OutputTooSmall`], [`CrossfadeError::OutOfMemory`]
    ///   and [`CrossfadeError::Transform`] abort the request.
    pub fn request<S, H>(
        &mut self,
        request: Request,
        output: Option<&mut [T]>,
        source: &mut S,
        hooks: &mut H,
    ) -> Result<(), CrossfadeError>
    where
        S: SampleSource<T> + ?Sized,
        H: SpectralHooks<T> + ?Sized,
    {
        if let Some(out) = output.as_deref() {
            if out.len() < request.count {
                return Err(CrossfadeError::OutputTooSmall {
                    needed: request.count,
                    len: out.len(),
                });
            }
        }

        let mut stream = match core::mem::replace(&mut self.state, EngineState::Uninitialized) {
            EngineState::Streaming(mut stream) => {
                if stream.output_sample != request.position
                    || stream.direction != request.direction
                {
                    debug_log!(
                        "seek from {} ({:?}) to {} ({:?}); discarding {} buffered samples",
                        stream.output_sample,
                        stream.direction,
                        request.position,
                        request.direction,
                        stream.output_size
                    );
                    stream.seek(request);
                }
                stream
            }
            EngineState::Uninitialized => {
                debug_log!(
                    "allocating {}-sample window buffers at position {}",
                    self.window.get(),
                    request.position
                );
                Stream::allocate(self.window, request)?
            }
        };

        let result = stream.process(&self.fft, self.window, request, output, source, hooks);
        self.state = EngineState::Streaming(stream);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::Identity;
    use alloc::vec::Vec;

    fn ramp(len: usize) -> Vec<f64> {
        (0..len).map(|i| i as f64).collect()
    }

    #[test]
    fn starts_uninitialized() {
        let engine = CrossfadeFft::<f64>::new(8);
        assert!(!engine.is_streaming());
        assert_eq!(engine.position(), None);
        assert!(engine.is_first_window());
        assert_eq!(engine.latency(), 12);
    }

    #[test]
    fn first_request_allocates_and_advances() {
        let mut signal = ramp(64);
        let mut engine = CrossfadeFft::<f64>::new(8);
        engine
            .request(Request::forward(0, 8), None, &mut signal[..], &mut Identity)
            .unwrap();
        assert!(engine.is_streaming());
        assert_eq!(engine.position(), Some(8));
        assert_eq!(engine.buffered_input(), 4);
        assert_eq!(engine.buffered_output(), 0);
        assert!(!engine.is_first_window());
    }

    #[test]
    fn seek_clears_state_before_processing() {
        let mut signal = ramp(128);
        let mut engine = CrossfadeFft::<f64>::new(8);
        engine
            .request(Request::forward(0, 6), None, &mut signal[..], &mut Identity)
            .unwrap();
        assert_eq!(engine.buffered_output(), 2);

        // A zero-length request renders nothing, exposing the reset.
        engine
            .request(Request::forward(40, 0), None, &mut signal[..], &mut Identity)
            .unwrap();
        assert_eq!(engine.position(), Some(40));
        assert_eq!(engine.buffered_output(), 0);
        assert!(engine.is_first_window());
    }

    #[test]
    fn configure_releases_buffers() {
        let mut signal = ramp(64);
        let mut engine = CrossfadeFft::<f64>::new(8);
        engine
            .request(Request::forward(0, 8), None, &mut signal[..], &mut Identity)
            .unwrap();
        let size = engine.configure(100);
        assert_eq!(size.get(), 128);
        assert!(!engine.is_streaming());
        assert_eq!(engine.window_size(), 128);
        assert_eq!(engine.half_window(), 64);
    }

    #[test]
    fn reset_keeps_window_size() {
        let mut signal = ramp(64);
        let mut engine = CrossfadeFft::<f64>::new(16);
        engine
            .request(Request::forward(0, 4), None, &mut signal[..], &mut Identity)
            .unwrap();
        engine.reset();
        assert!(!engine.is_streaming());
        assert_eq!(engine.window_size(), 16);
    }

    #[test]
    fn rejects_short_output_buffer() {
        let mut signal = ramp(64);
        let mut engine = CrossfadeFft::<f64>::new(8);
        let mut out = [0.0; 4];
        let err = engine
            .request(
                Request::forward(0, 8),
                Some(&mut out[..]),
                &mut signal[..],
                &mut Identity,
            )
            .unwrap_err();
        assert_eq!(err, CrossfadeError::OutputTooSmall { needed: 8, len: 4 });
        assert!(!engine.is_streaming());
    }

    #[test]
    fn oversized_request_reports_out_of_memory() {
        let mut signal = ramp(64);
        let mut engine = CrossfadeFft::<f64>::new(8);
        let err = engine
            .request(
                Request::forward(0, usize::MAX),
                None,
                &mut signal[..],
                &mut Identity,
            )
            .unwrap_err();
        assert_eq!(err, CrossfadeError::OutOfMemory);
        assert!(!err.is_recoverable());
        assert_eq!(engine.position(), Some(0));
    }

    #[test]
    fn failed_growth_restarts_at_request() {
        let mut signal = ramp(64);
        let mut engine = CrossfadeFft::<f64>::new(8);
        engine
            .request(Request::forward(0, 6), None, &mut signal[..], &mut Identity)
            .unwrap();

        let err = engine
            .request(
                Request::forward(6, usize::MAX / 4),
                None,
                &mut signal[..],
                &mut Identity,
            )
            .unwrap_err();
        assert_eq!(err, CrossfadeError::OutOfMemory);
        assert!(engine.is_streaming());
        assert_eq!(engine.position(), Some(6));
        assert_eq!(engine.buffered_input(), 0);
        assert_eq!(engine.buffered_output(), 0);
        assert!(engine.is_first_window());

        let mut out = [0.0; 8];
        engine
            .request(
                Request::forward(6, 8),
                Some(&mut out[..]),
                &mut signal[..],
                &mut Identity,
            )
            .unwrap();
        for (i, a) in out.iter().enumerate() {
            assert!((a - (6 + i) as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn crossfade_ramps_linearly() {
        let mut existing = [1.0f64; 4];
        crossfade(&mut existing, &[5.0; 4]);
        assert_eq!(existing, [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn request_next_position_follows_direction() {
        assert_eq!(Request::forward(10, 4).next_position(), 14);
        assert_eq!(Request::reverse(10, 4).next_position(), 6);
    }

    #[test]
    fn only_short_reads_are_recoverable() {
        assert!(CrossfadeError::ShortRead {
            requested: 4,
            delivered: 1
        }
        .is_recoverable());
        assert!(!CrossfadeError::Source(SourceError::Failed).is_recoverable());
        assert!(!CrossfadeError::OutOfMemory.is_recoverable());
    }
}
