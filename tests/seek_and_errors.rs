use crossfft::crossfade::{CrossfadeError, CrossfadeFft, PlayDirection, Request};
use crossfft::hooks::{Identity, SourceError, SpectralHooks};

fn ramp(len: usize) -> Vec<f64> {
    (0..len).map(|i| i as f64).collect()
}

/// Fills every window with its running index, starting at 1.
#[derive(Default)]
struct CountingWindows {
    rendered: usize,
}

impl SpectralHooks<f64> for CountingWindows {
    fn post_process(&mut self, output_real: &mut [f64], _output_imag: &mut [f64]) {
        self.rendered += 1;
        output_real.fill(self.rendered as f64);
    }
}

#[test]
fn seek_restarts_with_unblended_window() {
    let mut signal = ramp(256);
    let mut hooks = CountingWindows::default();
    let mut engine = CrossfadeFft::<f64>::new(8);
    engine
        .request(Request::forward(0, 8), None, &mut signal[..], &mut hooks)
        .unwrap();
    assert_eq!(hooks.rendered, 2);

    let mut out = [0.0; 4];
    engine
        .request(Request::forward(100, 4), Some(&mut out[..]), &mut signal[..], &mut hooks)
        .unwrap();
    assert_eq!(hooks.rendered, 3);
    assert_eq!(out, [3.0; 4]);
}

#[test]
fn seek_output_matches_source_at_new_position() {
    let mut signal = ramp(256);
    let mut engine = CrossfadeFft::<f64>::new(16);
    let mut out = [0.0; 12];
    engine
        .request(Request::forward(0, 12), Some(&mut out[..]), &mut signal[..], &mut Identity)
        .unwrap();
    engine
        .request(Request::forward(77, 12), Some(&mut out[..]), &mut signal[..], &mut Identity)
        .unwrap();
    for (i, a) in out.iter().enumerate() {
        assert!((a - (77 + i) as f64).abs() < 1e-9);
    }
}

#[test]
fn short_read_pads_with_silence_and_completes() {
    let mut signal = ramp(20);
    let mut engine = CrossfadeFft::<f64>::new(8);
    let mut out = [9.0; 8];
    let err = engine
        .request(Request::forward(16, 8), Some(&mut out[..]), &mut signal[..], &mut Identity)
        .unwrap_err();

    assert_eq!(
        err,
        CrossfadeError::ShortRead {
            requested: 8,
            delivered: 4
        }
    );
    assert!(err.is_recoverable());
    for (i, a) in out[..4].iter().enumerate() {
        assert!((a - (16 + i) as f64).abs() < 1e-9);
    }
    for a in &out[4..] {
        assert!(a.abs() < 1e-9);
    }
    assert_eq!(engine.position(), Some(24));
}

#[test]
fn short_read_counts_real_output_samples() {
    let mut signal = ramp(20);
    let mut engine = CrossfadeFft::<f64>::new(8);
    let mut out = [9.0; 6];
    let err = engine
        .request(Request::forward(16, 6), Some(&mut out[..]), &mut signal[..], &mut Identity)
        .unwrap_err();
    assert_eq!(
        err,
        CrossfadeError::ShortRead {
            requested: 6,
            delivered: 4
        }
    );
    assert!(out[4..].iter().all(|a| a.abs() < 1e-9));

    // Served from look-ahead read during the previous call.
    let mut tail = [9.0; 2];
    let err = engine
        .request(Request::forward(22, 2), Some(&mut tail[..]), &mut signal[..], &mut Identity)
        .unwrap_err();
    assert_eq!(
        err,
        CrossfadeError::ShortRead {
            requested: 2,
            delivered: 0
        }
    );
    assert!(tail.iter().all(|a| a.abs() < 1e-9));
    assert_eq!(engine.position(), Some(24));
}

#[test]
fn look_ahead_past_the_end_is_not_a_short_read() {
    let mut signal = ramp(10);
    let mut engine = CrossfadeFft::<f64>::new(8);
    let mut out = [0.0; 8];
    engine
        .request(Request::forward(0, 8), Some(&mut out[..]), &mut signal[..], &mut Identity)
        .unwrap();
    for (i, a) in out.iter().enumerate() {
        assert!((a - i as f64).abs() < 1e-9);
    }
}

#[test]
fn seek_forgets_the_end_of_media() {
    let mut clip = ramp(20);
    let mut full = ramp(64);
    let mut engine = CrossfadeFft::<f64>::new(8);
    let mut out = [0.0; 8];
    let err = engine
        .request(Request::forward(16, 8), Some(&mut out[..]), &mut clip[..], &mut Identity)
        .unwrap_err();
    assert!(err.is_recoverable());

    // The host swapped in longer media; the old end no longer applies.
    engine
        .request(Request::forward(30, 8), Some(&mut out[..]), &mut full[..], &mut Identity)
        .unwrap();
    for (i, a) in out.iter().enumerate() {
        assert!((a - (30 + i) as f64).abs() < 1e-9);
    }
}

#[test]
fn source_failure_leaves_output_untouched() {
    let mut signal = ramp(64);
    let mut engine = CrossfadeFft::<f64>::new(8);
    engine
        .request(Request::forward(0, 8), None, &mut signal[..], &mut Identity)
        .unwrap();

    let mut failing =
        |_start: i64, _dir: PlayDirection, _dest: &mut [f64]| Err::<usize, _>(SourceError::Failed);
    let mut out = [7.0; 8];
    let err = engine
        .request(Request::forward(8, 8), Some(&mut out[..]), &mut failing, &mut Identity)
        .unwrap_err();
    assert_eq!(err, CrossfadeError::Source(SourceError::Failed));
    assert!(!err.is_recoverable());
    assert_eq!(out, [7.0; 8]);
    assert_eq!(engine.position(), Some(8));
    assert_eq!(engine.buffered_output(), 0);
    assert!(engine.is_first_window());

    engine
        .request(Request::forward(8, 8), Some(&mut out[..]), &mut signal[..], &mut Identity)
        .unwrap();
    for (i, a) in out.iter().enumerate() {
        assert!((a - (8 + i) as f64).abs() < 1e-9);
    }
}

#[test]
fn zero_length_request_only_primes_input() {
    let mut signal = ramp(64);
    let mut engine = CrossfadeFft::<f64>::new(8);
    engine
        .request(Request::forward(5, 0), None, &mut signal[..], &mut Identity)
        .unwrap();
    assert!(engine.is_streaming());
    assert_eq!(engine.position(), Some(5));
    assert_eq!(engine.buffered_input(), 4);
    assert_eq!(engine.buffered_output(), 0);
}

#[test]
fn reconfigure_restarts_stream() {
    let mut signal = ramp(512);
    let mut engine = CrossfadeFft::<f64>::new(8);
    let mut out = [0.0; 16];
    engine
        .request(Request::forward(0, 16), Some(&mut out[..]), &mut signal[..], &mut Identity)
        .unwrap();
    engine.configure(64);
    engine
        .request(Request::forward(16, 16), Some(&mut out[..]), &mut signal[..], &mut Identity)
        .unwrap();
    for (i, a) in out.iter().enumerate() {
        assert!((a - (16 + i) as f64).abs() < 1e-9);
    }
    assert_eq!(engine.buffered_input(), 32);
}

#[cfg(feature = "std")]
#[test]
fn errors_display_their_cause() {
    let err = CrossfadeError::from(SourceError::OutOfRange);
    assert_eq!(
        err.to_string(),
        "source error: requested samples are out of range"
    );
    let boxed: Box<dyn std::error::Error> = Box::new(err);
    assert!(boxed.source().is_some());
}
