// Error taxonomy for a single upload attempt. Every variant is terminal:
// the tool never retries, and `main` maps any of these to one
// `error: ...` line on stderr and exit code 1.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between argv and a temp.sh URL.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The input path does not exist. Caught before any network call.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exceeds temp.sh's documented 4 GiB ceiling. Caught
    /// before the stream is opened.
    #[error("file too large (max 4gb)")]
    TooLarge,

    /// Read failure on the local side, e.g. the file disappears while
    /// the transport is draining it.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Transport-level failure: DNS, connection refused, timeout.
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with something other than 200.
    #[error("upload failed (status {0})")]
    Server(u16),

    /// Stdin was piped but delivered zero bytes.
    #[error("no data received")]
    EmptyInput,
}
