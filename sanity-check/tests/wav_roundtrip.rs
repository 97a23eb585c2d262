use hound::{SampleFormat, WavSpec, WavWriter};
use sanity_check::{read_audio, stream, write_wav};
use std::f32::consts::PI;

#[test]
fn detects_wav_extension_case_insensitive() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("case.WAV");
    let spec = WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&path, spec).unwrap();
    writer.write_sample(0i16).unwrap();
    writer.finalize().unwrap();
    let (_samples, sr) = read_audio(&path).unwrap();
    assert_eq!(sr, 8000);
}

#[test]
fn stereo_wav_is_mixed_to_mono() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("stereo.wav");
    let spec = WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&path, spec).unwrap();
    for _ in 0..100 {
        writer.write_sample(i16::MAX).unwrap();
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();
    let (samples, _) = read_audio(&path).unwrap();
    assert_eq!(samples.len(), 100);
    assert!(samples.iter().all(|s| (s - 0.5).abs() < 1e-4));
}

#[test]
fn streamed_tone_survives_wav_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("tone.wav");
    let input: Vec<f32> = (0..8000)
        .map(|i| 0.5 * (2.0 * PI * 440.0 * i as f32 / 8000.0).sin())
        .collect();

    let report = stream(&input, 512, 1000, 1.0).unwrap();
    assert!(report.max_error < 1e-4);
    write_wav(&path, &report.output, 8000).unwrap();

    let (samples, sr) = read_audio(&path).unwrap();
    assert_eq!(sr, 8000);
    assert_eq!(samples.len(), input.len());
    for (a, b) in samples.iter().zip(&input) {
        assert!((a - b).abs() < 1e-3);
    }
}
