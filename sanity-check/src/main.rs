use clap::Parser;
use crossfft::config::WindowSize;
use sanity_check::{read_audio, spectrum_parity, stream, write_wav};
use std::error::Error;
use std::path::PathBuf;

/// Stream an audio file through crossfft and compare it with rustfft.
#[derive(Parser)]
struct Args {
    /// Path to input audio (WAV, FLAC or MP3)
    input: PathBuf,

    /// Window length; defaults to CROSSFFT_WINDOW_SIZE or 4096
    #[arg(long)]
    window: Option<usize>,

    /// Samples per request
    #[arg(long, default_value_t = 1024)]
    block: usize,

    /// Gain applied to every spectral bin
    #[arg(long, default_value_t = 1.0)]
    gain: f32,

    /// Largest tolerated sample error
    #[arg(long, default_value_t = 1e-3)]
    tolerance: f32,

    /// Optional path to save the streamed output as WAV
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let window = match args.window {
        Some(size) => WindowSize::new(size),
        None => WindowSize::from_env(),
    };
    let (samples, sample_rate) = read_audio(&args.input)?;
    log::info!(
        "{}: {} samples at {} Hz, window {}",
        args.input.display(),
        samples.len(),
        sample_rate,
        window.get()
    );

    let parity = spectrum_parity(&samples, window.get())?;
    println!("Max bin difference against rustfft: {:.6}", parity);

    let report = stream(&samples, window.get(), args.block, args.gain)?;
    println!(
        "Max streaming error: {:.6} ({} short reads)",
        report.max_error, report.short_reads
    );

    if let Some(path) = &args.output {
        write_wav(path, &report.output, sample_rate)?;
        println!("Saved {}", path.display());
    }

    if report.max_error > args.tolerance {
        return Err(format!(
            "streaming error {} exceeds tolerance {}",
            report.max_error, args.tolerance
        )
        .into());
    }
    Ok(())
}
