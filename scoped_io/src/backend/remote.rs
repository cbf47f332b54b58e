//! Remote object-store backend

use crate::codec::{CodecFormat, FormatCodec};
use crate::error::{Error, Result};
use crate::row::FieldSchema;
use crate::scope::ScopedResource;
use crate::transport::{Transport, TransportParams};
use crate::writer::ScopedWriter;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Writer produced by [`RemoteBackend`]
pub type RemoteWriter<T> = ScopedWriter<FormatCodec<<T as Transport>::Stream>>;

/// Writes rows to an object behind a [`Transport`]
///
/// Acquire opens a stream for the URI, release commits it. The parameters are
/// handed to the transport untouched.
pub struct RemoteBackend<T: Transport> {
    uri: String,
    params: TransportParams,
    schema: FieldSchema,
    format: CodecFormat,
    transport: Arc<T>,
}

impl<T: Transport> RemoteBackend<T> {
    pub fn new(uri: impl Into<String>, schema: FieldSchema, transport: Arc<T>) -> Self {
        Self {
            uri: uri.into(),
            params: TransportParams::new(),
            schema,
            format: CodecFormat::default(),
            transport,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: TransportParams) -> Self {
        self.params = params;
        self
    }

    /// Add one transport parameter
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: CodecFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[must_use]
    pub fn params(&self) -> &TransportParams {
        &self.params
    }

    #[must_use]
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    #[must_use]
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }
}

impl<T: Transport> ScopedResource for RemoteBackend<T> {
    type Resource = RemoteWriter<T>;

    fn acquire(&self) -> Result<RemoteWriter<T>> {
        let stream = self
            .transport
            .open_write(&self.uri, &self.params)
            .map_err(|e| Error::acquisition(&self.uri, e))?;
        debug!(uri = %self.uri, "opened remote stream");
        let codec = self.format.codec(self.schema.clone(), stream);
        Ok(ScopedWriter::new(&self.uri, codec))
    }

    fn release(&self, mut writer: RemoteWriter<T>) -> Result<()> {
        let Some(stream) = writer.close()? else {
            return Ok(());
        };
        self.transport
            .commit(stream)
            .map_err(|e| Error::release(&self.uri, e))?;
        debug!(uri = %self.uri, rows = writer.rows_written(), "committed remote stream");
        Ok(())
    }
}

impl<T: Transport> fmt::Debug for RemoteBackend<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Params may carry credentials
        f.debug_struct("RemoteBackend")
            .field("uri", &self.uri)
            .field("params", &self.params.keys().collect::<Vec<_>>())
            .field("schema", &self.schema)
            .field("format", &self.format)
            .finish()
    }
}
