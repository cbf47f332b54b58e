//! Object store that records what the remote backend does with it.

use crate::{WANT_COMMIT_ERROR, WANT_OPEN_ERROR};
use parking_lot::Mutex;
use scoped_io::{StagedObject, Transport, TransportError, TransportParams};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory transport with call counters and fault injection
///
/// Accepts any URI scheme.
#[derive(Default)]
pub struct RecordingTransport {
    opens: AtomicUsize,
    commits: AtomicUsize,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    params: Mutex<Vec<TransportParams>>,
}

impl RecordingTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Successful `open_write` calls
    #[must_use]
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// `commit` calls, failed ones included
    #[must_use]
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn get(&self, uri: &str) -> Option<Vec<u8>> {
        self.objects.lock().get(uri).cloned()
    }

    #[must_use]
    pub fn get_string(&self, uri: &str) -> Option<String> {
        self.get(uri)
            .map(|data| String::from_utf8_lossy(&data).into_owned())
    }

    /// Parameters seen by `open_write`, in call order
    #[must_use]
    pub fn seen_params(&self) -> Vec<TransportParams> {
        self.params.lock().clone()
    }
}

impl Transport for RecordingTransport {
    type Stream = StagedObject;

    fn open_write(
        &self,
        uri: &str,
        params: &TransportParams,
    ) -> Result<StagedObject, TransportError> {
        if uri.contains(WANT_OPEN_ERROR) {
            return Err(TransportError::NotFound(uri.to_string()));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.params.lock().push(params.clone());
        Ok(StagedObject::new(uri, params.clone()))
    }

    fn commit(&self, stream: StagedObject) -> Result<(), TransportError> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        if stream.uri().contains(WANT_COMMIT_ERROR) {
            return Err(TransportError::Backend(format!(
                "Failed to commit {}",
                stream.uri()
            )));
        }
        let (uri, _params, data) = stream.into_parts();
        self.objects.lock().insert(uri, data);
        Ok(())
    }
}
