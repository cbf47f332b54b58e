//! A backend over a fault-injecting in-memory sink.

use scoped_io::{Buffer, CsvCodec, Error, FieldSchema, ScopedResource, ScopedWriter};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Writer produced by [`MockBackend`]
pub type MockWriter = ScopedWriter<CsvCodec<MockSink>>;

/// Sink that appends to a [`Buffer`] and fails once its byte budget is spent
pub struct MockSink {
    buffer: Buffer,
    remaining: Option<usize>,
}

impl MockSink {
    #[must_use]
    pub fn new(buffer: Buffer, budget: Option<usize>) -> Self {
        Self {
            buffer,
            remaining: budget,
        }
    }
}

impl Write for MockSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = match self.remaining {
            None => buf.len(),
            Some(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    "Failed to write: budget exhausted",
                ))
            }
            Some(left) => {
                let n = left.min(buf.len());
                self.remaining = Some(left - n);
                n
            }
        };
        self.buffer.append(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// CSV backend that counts acquire/release calls
///
/// - `with_write_budget(n)`: the sink accepts `n` bytes, then fails
/// - `fail_release(true)`: release closes the writer, then reports an error
pub struct MockBackend {
    schema: FieldSchema,
    output: Buffer,
    write_budget: Option<usize>,
    fail_release: AtomicBool,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl MockBackend {
    #[must_use]
    pub fn new(schema: FieldSchema) -> Self {
        Self {
            schema,
            output: Buffer::new(),
            write_budget: None,
            fail_release: AtomicBool::new(false),
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_write_budget(mut self, bytes: usize) -> Self {
        self.write_budget = Some(bytes);
        self
    }

    pub fn fail_release(&self, fail: bool) {
        self.fail_release.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn output(&self) -> String {
        self.output.to_string_lossy()
    }
}

impl ScopedResource for MockBackend {
    type Resource = MockWriter;

    fn acquire(&self) -> scoped_io::Result<MockWriter> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        let sink = MockSink::new(self.output.clone(), self.write_budget);
        Ok(ScopedWriter::new("mock", CsvCodec::new(self.schema.clone(), sink)))
    }

    fn release(&self, mut writer: MockWriter) -> scoped_io::Result<()> {
        self.released.fetch_add(1, Ordering::SeqCst);
        let closed = writer.close();
        if self.fail_release.load(Ordering::SeqCst) {
            return Err(Error::release(
                "mock",
                io::Error::new(io::ErrorKind::Other, "Failed to close"),
            ));
        }
        closed.map(|_| ())
    }
}
