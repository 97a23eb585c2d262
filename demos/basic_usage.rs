//! Basic usage example for crossfft
//!
//! Transforms a short signal, then streams a longer one through the
//! crossfade engine without any effect and checks it comes back intact.

use crossfft::crossfade::{CrossfadeFft, Request};
use crossfft::fft::{transform, Direction};
use crossfft::hooks::Identity;

fn main() {
    println!("=== crossfft Basic Usage Example ===\n");

    // 1. One-shot transform
    println!("1. Fast Fourier Transform (FFT)");
    let signal = [1.0f64, 2.0, 3.0, 4.0];
    let (mut re, mut im) = ([0.0; 4], [0.0; 4]);
    transform(Direction::Forward, &signal, None, &mut re, &mut im).unwrap();
    println!("   Input: {:?}", signal);
    println!(
        "   FFT: {:?}",
        re.iter()
            .zip(&im)
            .map(|(r, i)| format!("{:.2}{:+.2}i", r, i))
            .collect::<Vec<_>>()
    );

    let (mut back_re, mut back_im) = ([0.0; 4], [0.0; 4]);
    transform(Direction::Inverse, &re, Some(&im[..]), &mut back_re, &mut back_im).unwrap();
    println!("   IFFT: {:?}", back_re);
    println!();

    // 2. Streaming
    println!("2. Overlap-add streaming");
    let mut input: Vec<f64> = (0..4096).map(|i| (i as f64 * 0.05).sin()).collect();
    let mut engine = CrossfadeFft::<f64>::new(256);
    println!(
        "   Window: {} samples, latency to compensate: {} samples",
        engine.window_size(),
        engine.latency()
    );

    let mut block = vec![0.0; 300];
    let mut position = 0i64;
    let mut worst: f64 = 0.0;
    while position + 300 <= 3000 {
        let request = Request::forward(position, block.len());
        engine
            .request(request, Some(&mut block[..]), &mut input[..], &mut Identity)
            .unwrap();
        for (i, sample) in block.iter().enumerate() {
            worst = worst.max((sample - input[position as usize + i]).abs());
        }
        position = request.next_position();
    }
    println!("   Streamed {} samples, max deviation {:.2e}", position, worst);
}
