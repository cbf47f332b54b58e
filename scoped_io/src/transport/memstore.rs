//! In-memory object store

use super::{ObjectUri, StagedObject, Transport, TransportError, TransportParams};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A committed object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub params: TransportParams,
}

/// In-memory implementation of [`Transport`]
///
/// Hash map based storage keyed by URI, useful for testing and single-process
/// use. Objects become visible on commit. By default any bucket is accepted;
/// [`MemStore::with_buckets`] restricts writes to known buckets.
pub struct MemStore {
    scheme: String,
    buckets: Option<HashSet<String>>,
    objects: Mutex<HashMap<String, StoredObject>>,
}

impl MemStore {
    /// Create an empty store serving `mem://` URIs
    #[must_use]
    pub fn new() -> Self {
        Self {
            scheme: "mem".to_string(),
            buckets: None,
            objects: Mutex::new(HashMap::new()),
        }
    }

    /// Serve a different URI scheme, e.g. to stand in for `s3`
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Only accept writes to the given buckets
    #[must_use]
    pub fn with_buckets<I, S>(mut self, buckets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.buckets = Some(buckets.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Contents of a committed object
    #[must_use]
    pub fn get(&self, uri: &str) -> Option<Vec<u8>> {
        self.objects.lock().get(uri).map(|o| o.data.clone())
    }

    /// Parameters the object was committed with
    #[must_use]
    pub fn params(&self, uri: &str) -> Option<TransportParams> {
        self.objects.lock().get(uri).map(|o| o.params.clone())
    }

    /// List committed URIs with given prefix, sorted.
    ///
    /// If the prefix does not end with '/', one is added for matching.
    #[must_use]
    pub fn list(&self, prefix: &str) -> Vec<String> {
        let prefix = if prefix.ends_with('/') {
            prefix.to_string()
        } else {
            format!("{prefix}/")
        };
        let objects = self.objects.lock();
        let mut uris: Vec<String> = objects
            .keys()
            .filter(|uri| uri.starts_with(&prefix))
            .cloned()
            .collect();
        uris.sort();
        uris
    }

    pub fn remove(&self, uri: &str) -> Option<StoredObject> {
        self.objects.lock().remove(uri)
    }

    /// Drop all objects
    pub fn clear(&self) {
        self.objects.lock().clear();
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemStore {
    type Stream = StagedObject;

    fn open_write(
        &self,
        uri: &str,
        params: &TransportParams,
    ) -> Result<StagedObject, TransportError> {
        let parsed = ObjectUri::parse_for(uri, &self.scheme)?;
        if let Some(buckets) = &self.buckets {
            if !buckets.contains(parsed.bucket) {
                return Err(TransportError::NotFound(format!("bucket '{}'", parsed.bucket)));
            }
        }
        Ok(StagedObject::new(uri, params.clone()))
    }

    fn commit(&self, stream: StagedObject) -> Result<(), TransportError> {
        let (uri, params, data) = stream.into_parts();
        debug!(uri = %uri, bytes = data.len(), "committing object");
        self.objects.lock().insert(uri, StoredObject { data, params });
        Ok(())
    }
}
