//! Backend configuration loaded from JSON.
//!
//! ```json
//! {
//!   "backend": "remote",
//!   "uri": "mem://reports/people.csv",
//!   "params": { "region": "eu-west-1", "timeout": 30 },
//!   "fields": ["id", "name"],
//!   "aliases": { "name": "Full Name" },
//!   "format": "csv"
//! }
//! ```
//!
//! `backend` is one of `local` (needs `path`), `remote` (needs `uri`, optional
//! `params`) or `memory`. Parameter values that are not strings are passed to
//! the transport in their JSON text form.

use crate::backend::{BackendDescriptor, LocalBackend, MemoryBackend, RemoteBackend};
use crate::buffer::Buffer;
use crate::codec::CodecFormat;
use crate::error::{Error, Result};
use crate::row::{FieldSchema, HeaderAliases};
use crate::transport::{Transport, TransportParams};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Field layout shared by all backend kinds
#[derive(Deserialize, Debug, Clone)]
pub struct LayoutConfig {
    pub fields: Vec<String>,
    #[serde(default)]
    pub aliases: Option<HeaderAliases>,
    #[serde(default)]
    pub format: CodecFormat,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum BackendConfig {
    Local {
        path: PathBuf,
        #[serde(flatten)]
        layout: LayoutConfig,
    },
    Remote {
        uri: String,
        #[serde(default, deserialize_with = "params_from_json")]
        params: TransportParams,
        #[serde(flatten)]
        layout: LayoutConfig,
    },
    Memory {
        #[serde(flatten)]
        layout: LayoutConfig,
    },
}

fn params_from_json<'de, D>(deserializer: D) -> std::result::Result<TransportParams, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}

impl BackendConfig {
    /// Read a config from a JSON stream.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if:
    /// - The JSON input is invalid or malformed
    /// - There are I/O errors reading from the provided reader
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| Error::Config(format!("Failed to parse backend config: {e}")))
    }

    /// Build a config from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the value does not describe a backend.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::Config(format!("Failed to parse backend config: {e}")))
    }

    #[must_use]
    pub fn layout(&self) -> &LayoutConfig {
        match self {
            Self::Local { layout, .. } | Self::Remote { layout, .. } | Self::Memory { layout } => {
                layout
            }
        }
    }

    /// Header aliases to pass to `write_header`
    #[must_use]
    pub fn aliases(&self) -> Option<&HeaderAliases> {
        self.layout().aliases.as_ref()
    }

    /// Validate the layout and build the backend.
    ///
    /// `transport` is required for `remote` configs and ignored otherwise.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidSchema` if the field list is empty or has duplicates
    /// - `Error::Config` if a remote config comes without a transport
    pub fn into_descriptor<T: Transport>(
        self,
        transport: Option<Arc<T>>,
    ) -> Result<BackendDescriptor<T>> {
        match self {
            Self::Local { path, layout } => {
                let schema = FieldSchema::new(layout.fields)?;
                Ok(LocalBackend::new(path, schema)
                    .with_format(layout.format)
                    .into())
            }
            Self::Remote {
                uri,
                params,
                layout,
            } => {
                let transport = transport.ok_or_else(|| {
                    Error::Config(format!("remote backend for '{uri}' needs a transport"))
                })?;
                let schema = FieldSchema::new(layout.fields)?;
                Ok(RemoteBackend::new(uri, schema, transport)
                    .with_params(params)
                    .with_format(layout.format)
                    .into())
            }
            Self::Memory { layout } => {
                let schema = FieldSchema::new(layout.fields)?;
                Ok(MemoryBackend::new(Buffer::new(), schema)
                    .with_format(layout.format)
                    .into())
            }
        }
    }
}

impl FromStr for BackendConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_str(s)
            .map_err(|e| Error::Config(format!("Failed to parse backend config: {e}")))
    }
}
