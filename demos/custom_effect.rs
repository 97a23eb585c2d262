//! A brick-wall low-pass filter built on the crossfade engine.
//!
//! The effect zeroes every bin above a cutoff in the lower half of the
//! spectrum and lets `symmetry` rebuild the upper half, so the output stays
//! real.

use crossfft::crossfade::{CrossfadeFft, PlayDirection, Request};
use crossfft::fft::symmetry;
use crossfft::hooks::{SourceError, SpectralHooks};

struct LowPass {
    cutoff_bin: usize,
}

impl SpectralHooks<f32> for LowPass {
    fn signal_process(&mut self, freq_real: &mut [f32], freq_imag: &mut [f32]) {
        let half = freq_real.len() / 2;
        for bin in self.cutoff_bin.min(half + 1)..=half {
            freq_real[bin] = 0.0;
            freq_imag[bin] = 0.0;
        }
        symmetry(freq_real, freq_imag).expect("spectrum halves have equal length");
    }
}

fn main() {
    let sample_rate = 8000.0f32;
    let tone = |hz: f32, n: i64| (2.0 * std::f32::consts::PI * hz * n as f32 / sample_rate).sin();

    // A generated source: a 200 Hz tone with a 3 kHz whine on top.
    let mut source = |start: i64, direction: PlayDirection, dest: &mut [f32]| {
        for (i, sample) in dest.iter_mut().enumerate() {
            let n = start + direction.step() * i as i64;
            *sample = tone(200.0, n) + 0.5 * tone(3000.0, n);
        }
        Ok::<usize, SourceError>(dest.len())
    };

    let window = 512;
    let mut engine = CrossfadeFft::<f32>::new(window);
    // 1 kHz cutoff.
    let mut effect = LowPass {
        cutoff_bin: 1000 * window / sample_rate as usize,
    };

    let mut block = vec![0.0f32; 1024];
    engine
        .request(Request::forward(0, block.len()), Some(&mut block[..]), &mut source, &mut effect)
        .unwrap();

    let residual = block
        .iter()
        .enumerate()
        .map(|(n, s)| (s - tone(200.0, n as i64)).abs())
        .fold(0.0f32, f32::max);
    println!("low-passed {} samples; largest deviation from the 200 Hz tone: {:.3}", block.len(), residual);
}
