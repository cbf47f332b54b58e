//! Remote object-store transports
//!
//! A transport opens write streams to URIs and commits them. The remote
//! backend only talks to the [`Transport`] trait; retries, credentials and
//! the like belong to the transport.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  RemoteBackend                      │
//! │  - uri + opaque params              │
//! │  - codec over the stream            │
//! └─────────────────────────────────────┘
//!          │ open_write()      ▲ commit()
//!          ▼                   │
//! ┌─────────────────────────────────────┐
//! │  Transport                          │
//! │  - stages bytes in a stream         │
//! │  - makes the object visible on      │
//! │    commit only                      │
//! └─────────────────────────────────────┘
//!      ▲              ▲
//!      │              │
//!   MemStore     SqliteStore
//! ```

pub mod memstore;
#[cfg(feature = "sqlite")]
pub mod sqlitestore;

pub use memstore::MemStore;
#[cfg(feature = "sqlite")]
pub use sqlitestore::SqliteStore;

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

/// Transport options (credentials, region, timeout, ...), passed through verbatim
pub type TransportParams = BTreeMap<String, String>;

/// Errors reported by a transport
#[derive(Debug)]
pub enum TransportError {
    /// The URI scheme is not served by this transport
    UnsupportedScheme(String),
    /// The URI could not be parsed
    InvalidUri(String),
    /// The bucket or container does not exist
    NotFound(String),
    Io(io::Error),
    /// Store-specific failure
    Backend(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedScheme(scheme) => write!(f, "Unsupported URI scheme: {scheme}"),
            Self::InvalidUri(uri) => write!(f, "Invalid URI: {uri}"),
            Self::NotFound(what) => write!(f, "Not found: {what}"),
            Self::Io(err) => write!(f, "Transport I/O error: {err}"),
            Self::Backend(msg) => write!(f, "Transport error: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Object-store client used by the remote backend
pub trait Transport: Send + Sync {
    /// Write stream handed to the codec
    type Stream: Write + Send;

    /// Open a write stream for `uri`.
    ///
    /// # Errors
    /// Unknown scheme, malformed URI, missing bucket, or a store failure.
    fn open_write(&self, uri: &str, params: &TransportParams)
        -> Result<Self::Stream, TransportError>;

    /// Flush the stream and make the object visible.
    ///
    /// # Errors
    /// Store failure; the object is not visible afterwards.
    fn commit(&self, stream: Self::Stream) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    type Stream = T::Stream;

    fn open_write(
        &self,
        uri: &str,
        params: &TransportParams,
    ) -> Result<Self::Stream, TransportError> {
        (**self).open_write(uri, params)
    }

    fn commit(&self, stream: Self::Stream) -> Result<(), TransportError> {
        (**self).commit(stream)
    }
}

/// Parsed `scheme://bucket/key` URI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectUri<'a> {
    pub scheme: &'a str,
    pub bucket: &'a str,
    pub key: &'a str,
}

impl<'a> ObjectUri<'a> {
    /// Split a URI into scheme, bucket and key.
    ///
    /// # Errors
    /// `TransportError::InvalidUri` if a part is missing.
    pub fn parse(uri: &'a str) -> Result<Self, TransportError> {
        let invalid = || TransportError::InvalidUri(uri.to_string());
        let (scheme, rest) = uri.split_once("://").ok_or_else(invalid)?;
        let (bucket, key) = rest.split_once('/').ok_or_else(invalid)?;
        if scheme.is_empty() || bucket.is_empty() || key.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            scheme,
            bucket,
            key,
        })
    }

    /// Parse and check the scheme.
    ///
    /// # Errors
    /// As [`ObjectUri::parse`], plus `UnsupportedScheme`.
    pub fn parse_for(uri: &'a str, scheme: &str) -> Result<Self, TransportError> {
        let parsed = Self::parse(uri)?;
        if parsed.scheme != scheme {
            return Err(TransportError::UnsupportedScheme(parsed.scheme.to_string()));
        }
        Ok(parsed)
    }
}

/// Bytes staged for one object until the transport commits them
#[derive(Debug)]
pub struct StagedObject {
    uri: String,
    params: TransportParams,
    data: Vec<u8>,
}

impl StagedObject {
    #[must_use]
    pub fn new(uri: impl Into<String>, params: TransportParams) -> Self {
        Self {
            uri: uri.into(),
            params,
            data: Vec::new(),
        }
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
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn into_parts(self) -> (String, TransportParams, Vec<u8>) {
        (self.uri, self.params, self.data)
    }
}

impl Write for StagedObject {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
