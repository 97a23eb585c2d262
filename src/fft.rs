//! Radix-2 Fast Fourier Transform over split real/imaginary buffers.
//!
//! This module implements the iterative
//! [Cooley–Tukey algorithm](https://en.wikipedia.org/wiki/Cooley%E2%80%93Tukey_FFT_algorithm):
//! a bit-reversal copy from the input into the output buffers followed by
//! in-place butterfly passes of doubling block size. Transforms are
//! out-of-place, so callers keep their time-domain data while receiving the
//! spectrum in separate buffers.
//!
//! # Sign convention
//!
//! The forward kernel is `e^{+2πi·kn/N}` and the inverse kernel is
//! `e^{-2πi·kn/N}` scaled by `1/N`. Only the inverse is normalised, so a
//! forward/inverse pair is the identity. Effects that only touch magnitudes
//! are unaffected by the choice; phase-aware effects should take it into
//! account.

use crate::num::Float;

/// Errors produced by the transform primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftError {
    /// The transform length was zero.
    EmptyInput,
    /// The transform length was not a power of two.
    NonPowerOfTwo,
    /// Input and output slices did not share one length.
    MismatchedLengths,
}

impl core::fmt::Display for FftError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FftError::EmptyInput => write!(f, "transform length must be greater than zero"),
            FftError::NonPowerOfTwo => write!(f, "transform length must be a power of two"),
            FftError::MismatchedLengths => {
                write!(f, "input and output buffers must have the same length")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FftError {}

/// Direction of a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    /// Inverse transform, normalised by `1/N`.
    Inverse,
}

/// Number of bits needed to index `samples` elements.
///
/// Returns the position of the lowest set bit, which for the powers of two
/// the transform accepts is `log2(samples)`. Zero yields `usize::BITS`.
#[inline]
pub fn samples_to_bits(samples: usize) -> u32 {
    samples.trailing_zeros()
}

/// Reverse the lowest `bits` bits of `index`.
///
/// Bits above `bits` are discarded.
#[inline]
pub fn reverse_bits(mut index: usize, bits: u32) -> usize {
    let mut rev = 0;
    for _ in 0..bits {
        rev = (rev << 1) | (index & 1);
        index >>= 1;
    }
    rev
}

/// Complete the upper half of a spectrum that came from a real signal.
///
/// Entries `[size/2 + 1, size)` are overwritten with the conjugate mirror of
/// the lower half: `real[i] = real[size - i]`, `imag[i] = -imag[size - i]`.
/// Effects that only compute the lower half of a spectrum call this before
/// the inverse transform.
pub fn symmetry<T: Float>(real: &mut [T], imag: &mut [T]) -> Result<(), FftError> {
    let size = real.len();
    if size == 0 {
        return Err(FftError::EmptyInput);
    }
    if imag.len() != size {
        return Err(FftError::MismatchedLengths);
    }
    for i in size / 2 + 1..size {
        real[i] = real[size - i];
        imag[i] = -imag[size - i];
    }
    Ok(())
}

/// Transform `real_in`/`imag_in` into `real_out`/`imag_out` with the
/// three-term twiddle recurrence.
///
/// `imag_in` may be `None` for real input. All provided slices must share a
/// power-of-two length.
///
/// # Examples
/// ```
/// use crossfft::fft::{transform, Direction};
///
/// let signal = [1.0f64, 0.0, 0.0, 0.0];
/// let (mut re, mut im) = ([0.0; 4], [0.0; 4]);
/// transform(Direction::Forward, &signal, None, &mut re, &mut im).unwrap();
/// assert_eq!(re, [1.0; 4]);
/// ```
pub fn transform<T: Float>(
    direction: Direction,
    real_in: &[T],
    imag_in: Option<&[T]>,
    real_out: &mut [T],
    imag_out: &mut [T],
) -> Result<(), FftError> {
    RecurrenceFft.transform(direction, real_in, imag_in, real_out, imag_out)
}

/// A radix-2 transform the crossfade engine can drive.
///
/// Implementations must accept any power-of-two length and leave no state
/// behind between calls.
pub trait FftImpl<T: Float> {
    fn transform(
        &self,
        direction: Direction,
        real_in: &[T],
        imag_in: Option<&[T]>,
        real_out: &mut [T],
        imag_out: &mut [T],
    ) -> Result<(), FftError>;

    fn forward(
        &self,
        real_in: &[T],
        imag_in: Option<&[T]>,
        real_out: &mut [T],
        imag_out: &mut [T],
    ) -> Result<(), FftError> {
        self.transform(Direction::Forward, real_in, imag_in, real_out, imag_out)
    }

    fn inverse(
        &self,
        real_in: &[T],
        imag_in: &[T],
        real_out: &mut [T],
        imag_out: &mut [T],
    ) -> Result<(), FftError> {
        self.transform(Direction::Inverse, real_in, Some(imag_in), real_out, imag_out)
    }
}

/// Twiddles from the three-term trigonometric recurrence.
///
/// Each block needs only four `sin`/`cos` evaluations. Rounding error grows
/// with the block length, which stays negligible for the window sizes the
/// crossfade engine uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecurrenceFft;

/// Twiddles evaluated directly for every butterfly.
///
/// Slower than [`RecurrenceFft`] but free of accumulated drift; the
/// butterfly ordering is identical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectTwiddleFft;

impl<T: Float> FftImpl<T> for RecurrenceFft {
    fn transform(
        &self,
        direction: Direction,
        real_in: &[T],
        imag_in: Option<&[T]>,
        real_out: &mut [T],
        imag_out: &mut [T],
    ) -> Result<(), FftError> {
        let samples = validate(real_in, imag_in, real_out, imag_out)?;
        permute(real_in, imag_in, real_out, imag_out);
        butterflies(direction, samples, real_out, imag_out, Twiddles::Recurrence);
        if direction == Direction::Inverse {
            normalize(real_out, imag_out);
        }
        Ok(())
    }
}

impl<T: Float> FftImpl<T> for DirectTwiddleFft {
    fn transform(
        &self,
        direction: Direction,
        real_in: &[T],
        imag_in: Option<&[T]>,
        real_out: &mut [T],
        imag_out: &mut [T],
    ) -> Result<(), FftError> {
        let samples = validate(real_in, imag_in, real_out, imag_out)?;
        permute(real_in, imag_in, real_out, imag_out);
        butterflies(direction, samples, real_out, imag_out, Twiddles::Direct);
        if direction == Direction::Inverse {
            normalize(real_out, imag_out);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Twiddles {
    Recurrence,
    Direct,
}

fn validate<T: Float>(
    real_in: &[T],
    imag_in: Option<&[T]>,
    real_out: &[T],
    imag_out: &[T],
) -> Result<usize, FftError> {
    let samples = real_in.len();
    if samples == 0 {
        return Err(FftError::EmptyInput);
    }
    if !samples.is_power_of_two() {
        return Err(FftError::NonPowerOfTwo);
    }
    let imag_ok = imag_in.map_or(true, |im| im.len() == samples);
    if !imag_ok || real_out.len() != samples || imag_out.len() != samples {
        return Err(FftError::MismatchedLengths);
    }
    Ok(samples)
}

// Simultaneous copy and bit-reversal ordering into the outputs.
fn permute<T: Float>(
    real_in: &[T],
    imag_in: Option<&[T]>,
    real_out: &mut [T],
    imag_out: &mut [T],
) {
    let num_bits = samples_to_bits(real_in.len());
    for (i, &re) in real_in.iter().enumerate() {
        let j = reverse_bits(i, num_bits);
        real_out[j] = re;
        imag_out[j] = imag_in.map_or(T::zero(), |im| im[i]);
    }
}

fn butterflies<T: Float>(
    direction: Direction,
    samples: usize,
    real: &mut [T],
    imag: &mut [T],
    twiddles: Twiddles,
) {
    let two_pi = T::pi() + T::pi();
    let angle_numerator = match direction {
        Direction::Forward => two_pi,
        Direction::Inverse => -two_pi,
    };

    let mut block_end = 1;
    let mut block_size = 2;
    while block_size <= samples {
        let delta = angle_numerator / T::from_usize(block_size);
        let (sm1, cm1) = (-delta).sin_cos();
        let (sm2, cm2) = (-(delta + delta)).sin_cos();
        let w = cm1 + cm1;

        for start in (0..samples).step_by(block_size) {
            // ar/ai hold cos/sin of the two previous angles; the recurrence
            // starts from -2Δ and -Δ so the first twiddle is angle zero.
            let (mut ar1, mut ar2) = (cm1, cm2);
            let (mut ai1, mut ai2) = (sm1, sm2);

            for (n, j) in (start..start + block_end).enumerate() {
                let (ar0, ai0) = match twiddles {
                    Twiddles::Recurrence => {
                        let ar0 = w * ar1 - ar2;
                        ar2 = ar1;
                        ar1 = ar0;
                        let ai0 = w * ai1 - ai2;
                        ai2 = ai1;
                        ai1 = ai0;
                        (ar0, ai0)
                    }
                    Twiddles::Direct => {
                        let (s, c) = (delta * T::from_usize(n)).sin_cos();
                        (c, s)
                    }
                };

                let k = j + block_end;
                let tr = ar0 * real[k] - ai0 * imag[k];
                let ti = ar0 * imag[k] + ai0 * real[k];

                real[k] = real[j] - tr;
                imag[k] = imag[j] - ti;

                real[j] += tr;
                imag[j] += ti;
            }
        }

        block_end = block_size;
        block_size <<= 1;
    }
}

fn normalize<T: Float>(real: &mut [T], imag: &mut [T]) {
    let denom = T::from_usize(real.len());
    for (re, im) in real.iter_mut().zip(imag.iter_mut()) {
        *re /= denom;
        *im /= denom;
    }
}
