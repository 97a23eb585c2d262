//! # crossfft - Streaming frequency-domain effects for Rust
//!
//! A small DSP library for effects that work on the spectrum of an audio
//! stream: pitch shifting, filtering, spectral gating and anything else that
//! edits a window of FFT bins at a time. The engine handles the plumbing:
//! it reads samples from the host, windows them with 50% overlap, runs each
//! window through your hooks and crossfades the results back into one
//! continuous signal.
//!
//! ## Features
//!
//! - **Radix-2 FFT** with the classic trigonometric-recurrence kernel and a
//!   direct-twiddle alternative behind the [`fft::FftImpl`] trait
//! - **Overlap-add streaming** with arbitrary request lengths, seeking and
//!   reverse playback
//! - **Effect hooks** for the frequency domain and the time domain
//! - **`no_std` + `alloc`** core; `std` only adds error impls and
//!   environment configuration
//!
//! ## Cargo Features
//!
//! - `std` (default): Enable standard library features
//! - `verbose-logging`: Emit `debug`/`trace`/`warn` records through the
//!   [`log`](https://docs.rs/log) crate under the `crossfft` target
//!
//! ## Examples
//!
//! Run the demos with:
//! ```bash
//! cargo run --example basic_usage
//! cargo run --example custom_effect
//! cargo run --example verbose_logging --features verbose-logging
//! ```
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or https://www.apache.org/licenses/LICENSE-2.0)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or https://opensource.org/licenses/MIT)
//!
//! at your option.

#![no_std]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod logging;

/// Floating-point abstraction shared by every module.
pub mod num;

/// Radix-2 complex FFT with a selectable twiddle strategy.
pub mod fft;

/// Growable zero-initialised sample storage.
pub mod buffer;

/// Window-size normalisation and environment configuration.
pub mod config;

/// Sample sources and spectral effect hooks supplied by the host.
pub mod hooks;

/// Overlap-add streaming engine.
pub mod crossfade;

pub use config::WindowSize;
pub use crossfade::{CrossfadeError, CrossfadeFft, PlayDirection, Request};
pub use fft::{Direction, DirectTwiddleFft, FftError, FftImpl, RecurrenceFft};
pub use hooks::{Identity, SampleSource, SourceError, SpectralHooks};
pub use num::Float;
