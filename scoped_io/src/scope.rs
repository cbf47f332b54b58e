//! Acquire/release protocol and the guaranteed-release scope.
//!
//! A [`ScopedResource`] is anything that can hand out a resource and take it
//! back. [`with_scope`] runs a closure between the two and releases on every
//! exit path: normal return, `Err` return, or panic.
//!
//! Release failures never hide a fault from the closure. When both fail, the
//! closure's error is returned and the release error is logged.
//!
//! # Example
//!
//! ```
//! use scoped_io::{with_scope, Buffer, FieldSchema, MemoryBackend, Row, RowWriter};
//!
//! let buffer = Buffer::new();
//! let backend = MemoryBackend::new(buffer.clone(), FieldSchema::new(["id", "name"])?);
//!
//! with_scope(&backend, |writer| {
//!     writer.write_header(None)?;
//!     writer.write_rows(&[Row::new().with("id", 1).with("name", "Ann")])
//! })?;
//!
//! assert_eq!(buffer.to_string_lossy(), "id,name\n1,Ann\n");
//! # Ok::<(), scoped_io::Error>(())
//! ```

use crate::error::{Error, Result};
use std::fmt;
use std::ops::{Deref, DerefMut};
use tracing::{debug, warn};

/// Acquire/release contract of a resource-owning backend
///
/// `release` is called exactly once for every successful `acquire`. It must
/// succeed for a resource that is already closed.
pub trait ScopedResource {
    type Resource;

    /// Open the underlying transport.
    ///
    /// # Errors
    /// `Error::Acquisition` if the transport cannot be opened.
    fn acquire(&self) -> Result<Self::Resource>;

    /// Close the transport behind `resource`.
    ///
    /// # Errors
    /// `Error::Release` if flushing or closing fails.
    fn release(&self, resource: Self::Resource) -> Result<()>;

    /// Acquire and wrap the resource in a guard that releases it on drop.
    ///
    /// # Errors
    /// Same as [`ScopedResource::acquire`].
    fn enter(&self) -> Result<ScopeGuard<'_, Self>>
    where
        Self: Sized,
    {
        let resource = self.acquire()?;
        Ok(ScopeGuard {
            owner: self,
            resource: Some(resource),
        })
    }
}

/// Holds an acquired resource and releases it exactly once
///
/// Call [`ScopeGuard::close`] to observe the release result. If the guard is
/// dropped instead (early return, panic), the resource is released and any
/// failure is logged.
pub struct ScopeGuard<'a, S: ScopedResource> {
    owner: &'a S,
    // Some until close() or drop
    resource: Option<S::Resource>,
}

impl<S: ScopedResource> ScopeGuard<'_, S> {
    /// Release the resource now.
    ///
    /// # Errors
    /// The backend's release error.
    pub fn close(mut self) -> Result<()> {
        match self.resource.take() {
            Some(resource) => self.owner.release(resource),
            None => Ok(()),
        }
    }
}

impl<S: ScopedResource> Deref for ScopeGuard<'_, S> {
    type Target = S::Resource;

    #[allow(clippy::expect_used)]
    fn deref(&self) -> &S::Resource {
        self.resource
            .as_ref()
            .expect("scope guard holds its resource until released")
    }
}

impl<S: ScopedResource> DerefMut for ScopeGuard<'_, S> {
    #[allow(clippy::expect_used)]
    fn deref_mut(&mut self) -> &mut S::Resource {
        self.resource
            .as_mut()
            .expect("scope guard holds its resource until released")
    }
}

impl<S: ScopedResource> Drop for ScopeGuard<'_, S> {
    fn drop(&mut self) {
        let Some(resource) = self.resource.take() else {
            return;
        };
        if std::thread::panicking() {
            debug!("releasing scoped resource during unwind");
        }
        if let Err(err) = self.owner.release(resource) {
            warn!(error = %err, "release failed for a scope that was not closed explicitly");
        }
    }
}

impl<S: ScopedResource> fmt::Debug for ScopeGuard<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeGuard")
            .field("held", &self.resource.is_some())
            .finish()
    }
}

/// Run `body` with the acquired resource and release it afterwards.
///
/// - acquire fails: the error is returned and `body` never runs
/// - `body` succeeds, release fails: the release error is returned
/// - `body` fails: its error is returned; a release failure is only logged
/// - `body` panics: the resource is released while unwinding
///
/// # Errors
/// See above. Backend errors are converted into `E`.
pub fn with_scope<S, T, E, F>(resource: &S, body: F) -> std::result::Result<T, E>
where
    S: ScopedResource,
    F: FnOnce(&mut S::Resource) -> std::result::Result<T, E>,
    E: From<Error>,
{
    let mut guard = resource.enter()?;
    match body(&mut *guard) {
        Ok(value) => {
            guard.close()?;
            Ok(value)
        }
        Err(fault) => {
            if let Err(release_err) = guard.close() {
                warn!(error = %release_err, "release failed after a fault in scope, keeping the fault");
            }
            Err(fault)
        }
    }
}
