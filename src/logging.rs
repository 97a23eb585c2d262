//! Opt-in diagnostics.
//!
//! With the `verbose-logging` feature these macros forward to the [`log`]
//! crate. Without it they expand to nothing but still type-check their
//! arguments, so call sites never produce unused-variable warnings.

#[cfg(feature = "verbose-logging")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        log::debug!(target: "crossfft", $($arg)*)
    };
}

#[cfg(not(feature = "verbose-logging"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

#[cfg(feature = "verbose-logging")]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        log::trace!(target: "crossfft", $($arg)*)
    };
}

#[cfg(not(feature = "verbose-logging"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

#[cfg(feature = "verbose-logging")]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        log::warn!(target: "crossfft", $($arg)*)
    };
}

#[cfg(not(feature = "verbose-logging"))]
macro_rules! warn_log {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}
