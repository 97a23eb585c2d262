//! Demonstrates enabling verbose logging for crossfft.
use crossfft::crossfade::{CrossfadeFft, Request};
use crossfft::hooks::Identity;

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .init();

    let mut signal: Vec<f32> = (0..256).map(|i| i as f32).collect();
    let mut engine = CrossfadeFft::<f32>::new(48);
    let mut out = [0.0f32; 40];

    engine
        .request(Request::forward(0, 40), Some(&mut out[..]), &mut signal[..], &mut Identity)
        .unwrap();
    // Jumping ahead logs a seek.
    engine
        .request(Request::forward(200, 40), Some(&mut out[..]), &mut signal[..], &mut Identity)
        .unwrap_or_else(|e| log::warn!("{e}"));
}
