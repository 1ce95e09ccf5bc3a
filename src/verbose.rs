//! Diagnostic output, gated by a process-wide verbosity level.
//!
//! Native builds write to stderr so table output on stdout stays clean;
//! wasm builds forward to the browser console.

use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet = 0,
    Default = 1,
    Verbose = 2,
}

static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Default as u8);

pub fn init(quiet: bool, verbose: bool) {
    let level = if quiet {
        Verbosity::Quiet
    } else if verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Default
    };
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

pub fn verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Default,
    }
}

pub fn is_verbose() -> bool {
    verbosity() == Verbosity::Verbose
}

pub fn is_quiet() -> bool {
    verbosity() == Verbosity::Quiet
}

#[cfg(not(target_arch = "wasm32"))]
pub fn emit(message: &str) {
    eprintln!("{message}");
}

#[cfg(target_arch = "wasm32")]
pub fn emit(message: &str) {
    web_sys::console::log_1(&message.into());
}

/// Like `println!`, only in verbose mode.
macro_rules! vprintln {
    ($($arg:tt)*) => {
        if $crate::verbose::is_verbose() {
            $crate::verbose::emit(&format!($($arg)*));
        }
    };
}

pub(crate) use vprintln;

/// Like `println!`, suppressed in quiet mode.
macro_rules! dprintln {
    ($($arg:tt)*) => {
        if !$crate::verbose::is_quiet() {
            $crate::verbose::emit(&format!($($arg)*));
        }
    };
}

pub(crate) use dprintln;

/// Prints the elapsed time of a labeled operation on drop (verbose only).
#[cfg(not(target_arch = "wasm32"))]
pub struct Timer {
    label: &'static str,
    start: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl Timer {
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Drop for Timer {
    fn drop(&mut self) {
        if is_verbose() {
            emit(&format!("  {}: {:.1?}", self.label, self.start.elapsed()));
        }
    }
}
