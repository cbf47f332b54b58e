//! In-memory backend writing into a shared [`Buffer`]

use crate::buffer::Buffer;
use crate::codec::{CodecFormat, FormatCodec};
use crate::error::Result;
use crate::row::FieldSchema;
use crate::scope::ScopedResource;
use crate::writer::ScopedWriter;
use tracing::debug;

/// Writer produced by [`MemoryBackend`]
pub type MemoryWriter = ScopedWriter<FormatCodec<Buffer>>;

/// Writes rows into a [`Buffer`], clearing it on acquire
///
/// Keep a clone of the buffer to read the output after the scope.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    buffer: Buffer,
    schema: FieldSchema,
    format: CodecFormat,
}

impl MemoryBackend {
    pub fn new(buffer: Buffer, schema: FieldSchema) -> Self {
        Self {
            buffer,
            schema,
            format: CodecFormat::default(),
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: CodecFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[must_use]
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }
}

impl ScopedResource for MemoryBackend {
    type Resource = MemoryWriter;

    fn acquire(&self) -> Result<MemoryWriter> {
        self.buffer.clear();
        let codec = self.format.codec(self.schema.clone(), self.buffer.clone());
        Ok(ScopedWriter::new("memory", codec))
    }

    fn release(&self, mut writer: MemoryWriter) -> Result<()> {
        writer.close()?;
        debug!(bytes = self.buffer.len(), "released memory writer");
        Ok(())
    }
}
