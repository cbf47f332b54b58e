//! Row writer bound to one transport for the lifetime of a scope.
//!
//! # Lifecycle
//!
//! ```text
//! Pending ──attach()──▶ Active ──close()──▶ Closed
//! ```
//!
//! Only an `Active` writer accepts `write_header` / `write_rows`; in any other
//! state they fail with [`Error::NotInitialized`]. A closed writer cannot be
//! attached again.
//!
//! # Thread Safety
//!
//! All write operations take `&mut self`, so one writer cannot be used from
//! two threads at once. Two writers must not target the same path or URI at
//! the same time; nothing here coordinates them.

use crate::codec::RowCodec;
use crate::error::{Error, Result};
use crate::row::{HeaderAliases, Row};
use std::fmt;
use tracing::trace;

/// Row-oriented write capability, independent of the storage medium
pub trait RowWriter {
    /// Write the header record.
    ///
    /// # Errors
    /// - `Error::AlreadyWritten` on a second call, also after a failed first one
    /// - `Error::NotInitialized` outside an active scope
    fn write_header(&mut self, aliases: Option<&HeaderAliases>) -> Result<()>;

    /// Append rows in input order. Rows may come before the header.
    ///
    /// # Errors
    /// - `Error::NotInitialized` outside an active scope
    /// - transport errors; rows before the failing one stay written
    fn write_rows(&mut self, rows: &[Row]) -> Result<()>;

    /// Append a single row.
    ///
    /// # Errors
    /// Same as [`RowWriter::write_rows`].
    fn write_row(&mut self, row: &Row) -> Result<()> {
        self.write_rows(std::slice::from_ref(row))
    }
}

enum State<C> {
    Pending,
    Active(C),
    Closed,
}

/// Writer over a codec, tracking the scope state and the header flag
pub struct ScopedWriter<C: RowCodec> {
    target: String,
    state: State<C>,
    header_written: bool,
    rows_written: usize,
}

impl<C: RowCodec> ScopedWriter<C> {
    /// Create an active writer over `codec`
    pub fn new(target: impl Into<String>, codec: C) -> Self {
        Self {
            target: target.into(),
            state: State::Active(codec),
            header_written: false,
            rows_written: 0,
        }
    }

    /// Create a writer whose codec is bound later with [`ScopedWriter::attach`].
    ///
    /// Writes fail with `Error::NotInitialized` until then.
    pub fn pending(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            state: State::Pending,
            header_written: false,
            rows_written: 0,
        }
    }

    /// Bind a pending writer to its codec.
    ///
    /// # Errors
    /// `Error::NotInitialized` if the writer is already active or was closed;
    /// a writer instance is never reused.
    pub fn attach(&mut self, codec: C) -> Result<()> {
        match self.state {
            State::Pending => {
                self.state = State::Active(codec);
                Ok(())
            }
            State::Active(_) | State::Closed => Err(Error::NotInitialized),
        }
    }

    /// Path or URI of the transport
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, State::Active(_))
    }

    #[must_use]
    pub fn header_written(&self) -> bool {
        self.header_written
    }

    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush the codec and detach the sink for the backend to release.
    ///
    /// Returns `None` if the writer was never attached or is already closed.
    ///
    /// # Errors
    /// `Error::Release` if the final flush fails. The writer is closed either way.
    pub fn close(&mut self) -> Result<Option<C::Sink>> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Active(codec) => codec
                .finish()
                .map(Some)
                .map_err(|err| Error::release(self.target.clone(), err)),
            State::Pending | State::Closed => Ok(None),
        }
    }

    fn codec(&mut self) -> Result<&mut C> {
        match &mut self.state {
            State::Active(codec) => Ok(codec),
            State::Pending | State::Closed => Err(Error::NotInitialized),
        }
    }
}

impl<C: RowCodec> RowWriter for ScopedWriter<C> {
    fn write_header(&mut self, aliases: Option<&HeaderAliases>) -> Result<()> {
        // Scope check first: a closed writer reports NotInitialized
        self.codec()?;
        if self.header_written {
            return Err(Error::AlreadyWritten);
        }
        // Set before writing: a failed header may be partly on the sink
        self.header_written = true;
        self.codec()?.write_header(aliases)
    }

    /// `rows_written` counts only batches that completed.
    fn write_rows(&mut self, rows: &[Row]) -> Result<()> {
        self.codec()?.write_rows(rows)?;
        self.rows_written += rows.len();
        trace!(target_uri = %self.target, rows = rows.len(), "rows written");
        Ok(())
    }
}

impl<C: RowCodec> fmt::Debug for ScopedWriter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            State::Pending => "pending",
            State::Active(_) => "active",
            State::Closed => "closed",
        };
        write!(
            f,
            "ScopedWriter(target={}, state={state}, header_written={}, rows_written={})",
            self.target, self.header_written, self.rows_written
        )
    }
}
