//! Shared in-memory byte sink
//!
//! Backs the memory backend and the test sinks.

use parking_lot::{Mutex, MutexGuard};
use std::io;
use std::ops::Deref;
use std::sync::Arc;

/// Read-only guard to buffer contents
///
/// Holds the lock and provides read-only access to the underlying data.
/// The lock is released when the guard is dropped.
pub struct BufferReadGuard<'a>(MutexGuard<'a, Vec<u8>>);

impl Deref for BufferReadGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for BufferReadGuard<'_> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Shared buffer with internal locking
///
/// A thread-safe buffer backed by `Arc<Mutex<Vec<u8>>>`. Multiple clones
/// share the same underlying data, so a caller can keep one clone for
/// inspection while a writer owns another.
///
/// # Example
///
/// ```
/// use scoped_io::Buffer;
/// use std::io::Write;
///
/// let buffer = Buffer::new();
/// let mut sink = buffer.clone();
/// sink.write_all(b"id,name\n").unwrap();
///
/// assert_eq!(buffer.to_string_lossy(), "id,name\n");
/// ```
#[derive(Clone, Default)]
pub struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }

    #[must_use]
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self(Arc::new(Mutex::new(data)))
    }

    pub fn append(&self, data: &[u8]) {
        self.0.lock().extend_from_slice(data);
    }

    /// Drop the contents, keeping the buffer shared
    pub fn clear(&self) {
        self.0.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Lock the buffer for reading
    ///
    /// The lock is held until the guard is dropped.
    #[must_use]
    pub fn lock(&self) -> BufferReadGuard<'_> {
        BufferReadGuard(self.0.lock())
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.lock().clone()
    }

    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// True if both handles share the same storage
    #[must_use]
    pub fn same_as(&self, other: &Buffer) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer").field("len", &self.len()).finish()
    }
}
