//! Local filesystem backend

use crate::codec::{CodecFormat, FormatCodec};
use crate::error::{Error, Result};
use crate::row::FieldSchema;
use crate::scope::ScopedResource;
use crate::writer::ScopedWriter;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writer produced by [`LocalBackend`]
pub type LocalWriter = ScopedWriter<FormatCodec<BufWriter<File>>>;

/// Writes rows to a file, creating or truncating it on acquire
///
/// Two scopes must not write the same path at the same time.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    path: PathBuf,
    schema: FieldSchema,
    format: CodecFormat,
}

impl LocalBackend {
    pub fn new(path: impl Into<PathBuf>, schema: FieldSchema) -> Self {
        Self {
            path: path.into(),
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
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    fn target(&self) -> String {
        self.path.display().to_string()
    }
}

impl ScopedResource for LocalBackend {
    type Resource = LocalWriter;

    fn acquire(&self) -> Result<LocalWriter> {
        let target = self.target();
        let file = File::create(&self.path).map_err(|e| Error::acquisition(&target, e))?;
        debug!(path = %target, "opened local file");
        let codec = self.format.codec(self.schema.clone(), BufWriter::new(file));
        Ok(ScopedWriter::new(target, codec))
    }

    fn release(&self, mut writer: LocalWriter) -> Result<()> {
        let Some(mut sink) = writer.close()? else {
            return Ok(());
        };
        let target = writer.target();
        sink.flush().map_err(|e| Error::release(target, e))?;
        let file = sink
            .into_inner()
            .map_err(|e| Error::release(target, e.into_error()))?;
        drop(file);
        debug!(path = %target, rows = writer.rows_written(), "closed local file");
        Ok(())
    }
}
