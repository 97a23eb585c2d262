use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

use crossfft::crossfade::{CrossfadeError, CrossfadeFft, Request};
use crossfft::fft::{FftImpl, RecurrenceFft};
use crossfft::hooks::SpectralHooks;
use rustfft::num_complex::Complex32;
use rustfft::FftPlanner;

/// Decode `path` to mono `f32` samples and its sample rate.
pub fn read_audio(path: &Path) -> Result<(Vec<f32>, u32), Box<dyn Error>> {
    if path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
    {
        return read_wav(path);
    }
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }
    let probed = get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "no supported audio tracks"))?;
    let params = track.codec_params.clone();
    let mut decoder = get_codecs().make(&params, &DecoderOptions::default())?;
    let sample_rate = params
        .sample_rate
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "unknown sample rate"))?;

    let mut samples = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    loop {
        match format.next_packet() {
            Ok(packet) => {
                let decoded = decoder.decode(&packet)?;
                let channels = decoded.spec().channels.count();
                let buf = sample_buf.get_or_insert_with(|| {
                    SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec())
                });
                buf.copy_interleaved_ref(decoded);
                for frame in buf.samples().chunks(channels) {
                    samples.push(frame.iter().sum::<f32>() / channels as f32);
                }
            }
            Err(SymphoniaError::IoError(err)) if err.kind() == io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => decoder.reset(),
            Err(e) => return Err(Box::new(e)),
        }
    }
    if let Some(n) = params.n_frames {
        samples.truncate(n as usize);
    }
    Ok((samples, sample_rate))
}

fn read_wav(path: &Path) -> Result<(Vec<f32>, u32), Box<dyn Error>> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));
    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
            .collect::<Result<_, _>>()?,
    };
    let samples = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();
    Ok((samples, spec.sample_rate))
}

/// Write mono 16-bit PCM, clipping to full scale.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), Box<dyn Error>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &s in samples {
        writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Largest bin difference between crossfft and rustfft over every
/// half-overlapping frame of `samples`.
///
/// crossfft's forward kernel is `e^{+i}`, which is rustfft's unnormalised
/// inverse.
pub fn spectrum_parity(samples: &[f32], window: usize) -> Result<f32, Box<dyn Error>> {
    let hop = window / 2;
    let mut planner = FftPlanner::<f32>::new();
    let reference = planner.plan_fft_inverse(window);
    let (mut re, mut im) = (vec![0.0f32; window], vec![0.0f32; window]);
    let mut frame = vec![0.0f32; window];
    let mut buffer = vec![Complex32::new(0.0, 0.0); window];
    let mut max_diff = 0.0f32;

    let mut start = 0;
    while start < samples.len() {
        let end = (start + window).min(samples.len());
        frame.fill(0.0);
        frame[..end - start].copy_from_slice(&samples[start..end]);

        RecurrenceFft.forward(&frame, None, &mut re, &mut im)?;
        for (b, &x) in buffer.iter_mut().zip(&frame) {
            *b = Complex32::new(x, 0.0);
        }
        reference.process(&mut buffer);
        for ((b, r), i) in buffer.iter().zip(&re).zip(&im) {
            max_diff = max_diff.max((b.re - r).abs()).max((b.im - i).abs());
        }
        start += hop;
    }
    Ok(max_diff)
}

/// Scales every bin by a constant.
#[derive(Debug, Clone, Copy)]
pub struct SpectralGain(pub f32);

impl SpectralHooks<f32> for SpectralGain {
    fn signal_process(&mut self, freq_real: &mut [f32], freq_imag: &mut [f32]) {
        for (re, im) in freq_real.iter_mut().zip(freq_imag.iter_mut()) {
            *re *= self.0;
            *im *= self.0;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamReport {
    pub output: Vec<f32>,
    /// Largest deviation from `gain * input`.
    pub max_error: f32,
    pub short_reads: usize,
}

/// Stream `samples` through a crossfade engine in `block`-sized requests.
pub fn stream(
    samples: &[f32],
    window: usize,
    block: usize,
    gain: f32,
) -> Result<StreamReport, CrossfadeError> {
    let mut source = samples.to_vec();
    let mut engine = CrossfadeFft::<f32>::new(window);
    let mut hooks = SpectralGain(gain);
    let mut output = vec![0.0f32; samples.len()];
    let mut short_reads = 0;

    for (index, chunk) in output.chunks_mut(block.max(1)).enumerate() {
        let position = (index * block.max(1)) as i64;
        let request = Request::forward(position, chunk.len());
        match engine.request(request, Some(chunk), &mut source[..], &mut hooks) {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => {
                log::debug!("block at {}: {}", position, e);
                short_reads += 1;
            }
            Err(e) => return Err(e),
        }
    }

    let max_error = output
        .iter()
        .zip(samples)
        .map(|(o, s)| (o - gain * s).abs())
        .fold(0.0f32, f32::max);
    Ok(StreamReport {
        output,
        max_error,
        short_reads,
    })
}
