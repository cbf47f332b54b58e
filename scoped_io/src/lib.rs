//! Scoped row writers with pluggable backends.
//!
//! A backend describes where rows go; entering a scope opens the transport,
//! wraps it in a format codec and hands out a writer. Leaving the scope
//! releases the transport on every path, including faults.
//!
//! ```text
//! caller ──with_scope()──▶ backend.acquire() ──▶ ScopedWriter<codec<transport>>
//!    │                                                 │ write_header / write_rows
//!    └──────────────── scope ends ──▶ backend.release() (flush, close, commit)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use scoped_io::{with_scope, FieldSchema, HeaderAliases, LocalBackend, Row, RowWriter};
//!
//! let schema = FieldSchema::new(["id", "name"])?;
//! let backend = LocalBackend::new("people.csv", schema);
//! let aliases = HeaderAliases::new().with("id", "ID").with("name", "Full Name");
//!
//! with_scope(&backend, |writer| {
//!     writer.write_header(Some(&aliases))?;
//!     writer.write_rows(&[Row::new().with("id", 1).with("name", "Ann")])
//! })?;
//! # Ok::<(), scoped_io::Error>(())
//! ```

pub mod backend;
pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod row;
pub mod scope;
pub mod transport;
pub mod writer;

// Re-export the data model for convenience
pub use row::{FieldSchema, HeaderAliases, Row, Value};

pub use error::{Error, Result};

pub use buffer::{Buffer, BufferReadGuard};

pub use codec::{CodecFormat, CsvCodec, FormatCodec, JsonLinesCodec, RowCodec};

pub use writer::{RowWriter, ScopedWriter};

pub use scope::{with_scope, ScopeGuard, ScopedResource};

// Re-export backends for convenience
pub use backend::{
    AnyWriter, BackendDescriptor, LocalBackend, LocalWriter, MemoryBackend, MemoryWriter,
    RemoteBackend, RemoteWriter,
};

pub use transport::{MemStore, StagedObject, Transport, TransportError, TransportParams};
#[cfg(feature = "sqlite")]
pub use transport::SqliteStore;

pub use config::BackendConfig;
