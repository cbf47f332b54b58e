//! Backends: where a scoped writer's transport comes from
//!
//! Every backend implements [`ScopedResource`] with a [`ScopedWriter`](crate::ScopedWriter) as the
//! resource. Adding a backend means implementing that trait; the writer and
//! codecs stay as they are.
//!
//! | Backend | Transport | Acquire | Release |
//! |---------|-----------|---------|---------|
//! | [`LocalBackend`] | `BufWriter<File>` | create or truncate | flush, close |
//! | [`RemoteBackend`] | [`Transport::Stream`] | `open_write(uri, params)` | `commit` |
//! | [`MemoryBackend`] | [`Buffer`](crate::Buffer) | clear buffer | flush |
//!
//! [`BackendDescriptor`] picks one of them at runtime, e.g. from configuration.

pub mod local;
pub mod memory;
pub mod remote;

pub use local::{LocalBackend, LocalWriter};
pub use memory::{MemoryBackend, MemoryWriter};
pub use remote::{RemoteBackend, RemoteWriter};

use crate::error::{Error, Result};
use crate::row::{FieldSchema, HeaderAliases, Row};
use crate::scope::ScopedResource;
use crate::transport::{MemStore, Transport};
use crate::writer::RowWriter;
use std::fmt;

/// One of the backends, chosen at runtime
pub enum BackendDescriptor<T: Transport = MemStore> {
    Local(LocalBackend),
    Remote(RemoteBackend<T>),
    Memory(MemoryBackend),
}

impl<T: Transport> BackendDescriptor<T> {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Remote(_) => "remote",
            Self::Memory(_) => "memory",
        }
    }

    #[must_use]
    pub fn schema(&self) -> &FieldSchema {
        match self {
            Self::Local(b) => b.schema(),
            Self::Remote(b) => b.schema(),
            Self::Memory(b) => b.schema(),
        }
    }
}

impl<T: Transport> fmt::Debug for BackendDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(b) => f.debug_tuple("Local").field(b).finish(),
            Self::Remote(b) => f.debug_tuple("Remote").field(b).finish(),
            Self::Memory(b) => f.debug_tuple("Memory").field(b).finish(),
        }
    }
}

impl<T: Transport> From<LocalBackend> for BackendDescriptor<T> {
    fn from(backend: LocalBackend) -> Self {
        Self::Local(backend)
    }
}

impl<T: Transport> From<RemoteBackend<T>> for BackendDescriptor<T> {
    fn from(backend: RemoteBackend<T>) -> Self {
        Self::Remote(backend)
    }
}

impl<T: Transport> From<MemoryBackend> for BackendDescriptor<T> {
    fn from(backend: MemoryBackend) -> Self {
        Self::Memory(backend)
    }
}

/// Writer of whichever backend a [`BackendDescriptor`] holds
pub enum AnyWriter<T: Transport> {
    Local(LocalWriter),
    Remote(RemoteWriter<T>),
    Memory(MemoryWriter),
}

impl<T: Transport> AnyWriter<T> {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Remote(_) => "remote",
            Self::Memory(_) => "memory",
        }
    }

    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Local(w) => w.target(),
            Self::Remote(w) => w.target(),
            Self::Memory(w) => w.target(),
        }
    }

    #[must_use]
    pub fn rows_written(&self) -> usize {
        match self {
            Self::Local(w) => w.rows_written(),
            Self::Remote(w) => w.rows_written(),
            Self::Memory(w) => w.rows_written(),
        }
    }
}

impl<T: Transport> RowWriter for AnyWriter<T> {
    fn write_header(&mut self, aliases: Option<&HeaderAliases>) -> Result<()> {
        match self {
            Self::Local(w) => w.write_header(aliases),
            Self::Remote(w) => w.write_header(aliases),
            Self::Memory(w) => w.write_header(aliases),
        }
    }

    fn write_rows(&mut self, rows: &[Row]) -> Result<()> {
        match self {
            Self::Local(w) => w.write_rows(rows),
            Self::Remote(w) => w.write_rows(rows),
            Self::Memory(w) => w.write_rows(rows),
        }
    }
}

impl<T: Transport> ScopedResource for BackendDescriptor<T> {
    type Resource = AnyWriter<T>;

    fn acquire(&self) -> Result<AnyWriter<T>> {
        Ok(match self {
            Self::Local(b) => AnyWriter::Local(b.acquire()?),
            Self::Remote(b) => AnyWriter::Remote(b.acquire()?),
            Self::Memory(b) => AnyWriter::Memory(b.acquire()?),
        })
    }

    fn release(&self, writer: AnyWriter<T>) -> Result<()> {
        match (self, writer) {
            (Self::Local(b), AnyWriter::Local(w)) => b.release(w),
            (Self::Remote(b), AnyWriter::Remote(w)) => b.release(w),
            (Self::Memory(b), AnyWriter::Memory(w)) => b.release(w),
            (backend, writer) => Err(Error::Config(format!(
                "{} writer for '{}' released through a {} backend",
                writer.kind(),
                writer.target(),
                backend.kind()
            ))),
        }
    }
}
