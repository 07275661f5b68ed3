// Library root
// -----------
// This crate exposes a small library surface for the `tempsh` binary.
// The binary (`main.rs`) only handles argv and exit codes; everything
// else lives here so the upload path can be tested without a network.
//
// Module responsibilities:
// - `config`: fixed endpoint/limits, built once at startup and passed
//   explicitly into the upload client.
// - `error`: the error taxonomy for a single upload attempt.
// - `multipart`: streaming multipart/form-data encoder with a byte-read
//   hook for progress observation.
// - `progress`: transferred-byte accounting and the in-place terminal
//   progress line.
// - `api`: the upload client and the HTTP transport seam.
// - `ui`: help text and everything printed for a human.
pub mod api;
pub mod config;
pub mod error;
pub mod multipart;
pub mod progress;
pub mod ui;
