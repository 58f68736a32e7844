//! Error types returned at the boundary between the core and its callers.
//!
//! Structural stalls, division by zero, out-of-range memory accesses, and
//! invalid branch targets are never represented here: all of those are
//! recoverable, in-band conditions (a stall report, a silently-zeroed
//! result, a PC fallback), not failures. `SimError` is reserved for the
//! two things that actually stop a run before it starts: a program that
//! doesn't parse, and a program file that can't be read.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can prevent a program from being loaded and run.
#[derive(Debug, Error)]
pub enum SimError {
    /// The assembler rejected a line of source.
    #[error("line {line}: {message}")]
    Decode {
        /// 1-based source line number.
        line: usize,
        /// Human-readable reason the line was rejected.
        message: String,
    },

    /// The program file could not be read from disk.
    #[error("could not read program file {path}")]
    Io {
        /// Path that failed to open/read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}
