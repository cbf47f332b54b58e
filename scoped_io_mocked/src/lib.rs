//! Test doubles for scoped writers.
//!
//! - `RecordingTransport` is an object store that counts opens and commits.
//! - `MockBackend` is a third acquisition strategy that counts acquire/release
//!   calls and can fail on write or release.
//! - `WANT_OPEN_ERROR` in a URI makes `open_write` fail.
//! - `WANT_COMMIT_ERROR` in a URI makes `commit` fail.

pub mod backend;
pub mod recording;

pub use backend::{MockBackend, MockSink, MockWriter};
pub use recording::RecordingTransport;

pub const WANT_OPEN_ERROR: char = '\u{0001}';
pub const WANT_COMMIT_ERROR: char = '\u{0002}';
