//! SQLite-backed object store
//!
//! Stores committed objects in a SQLite database, providing persistence
//! across program runs. Streams are staged in memory and written in a single
//! statement on release, with whatever was staged by then.

use super::{ObjectUri, StagedObject, Transport, TransportError, TransportParams};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::debug;

impl From<rusqlite::Error> for TransportError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

/// SQLite-backed implementation of [`Transport`] for `sqlite://bucket/key` URIs
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at the given path
    ///
    /// Creates the table if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if database cannot be opened or table creation fails.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, TransportError> {
        Self::from_connection(Connection::open(db_path)?)
    }

    /// Create a store in a private in-memory database
    ///
    /// # Errors
    ///
    /// Returns error if table creation fails.
    pub fn in_memory() -> Result<Self, TransportError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, TransportError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS objects (
                uri TEXT PRIMARY KEY,
                data BLOB NOT NULL,
                params TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Load a committed object
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub fn get(&self, uri: &str) -> Result<Option<Vec<u8>>, TransportError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT data FROM objects WHERE uri = ?")?;
        match stmt.query_row(params![uri], |row| row.get::<_, Vec<u8>>(0)) {
            Ok(data) => Ok(Some(data)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Parameters the object was committed with
    ///
    /// # Errors
    ///
    /// Returns error if the query fails or the stored parameters are corrupt.
    pub fn params(&self, uri: &str) -> Result<Option<TransportParams>, TransportError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT params FROM objects WHERE uri = ?")?;
        let text = match stmt.query_row(params![uri], |row| row.get::<_, String>(0)) {
            Ok(text) => text,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| TransportError::Backend(format!("corrupt params for {uri}: {e}")))
    }

    /// List committed URIs with given prefix, sorted.
    ///
    /// If the prefix does not end with '/', one is added for matching.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub fn list(&self, prefix: &str) -> Result<Vec<String>, TransportError> {
        let prefix = if prefix.ends_with('/') {
            prefix.to_string()
        } else {
            format!("{prefix}/")
        };
        let conn = self.conn.lock();
        // substr and length both count characters
        let mut stmt = conn.prepare(
            "SELECT uri FROM objects WHERE substr(uri, 1, length(?1)) = ?1 ORDER BY uri",
        )?;
        let uris = stmt
            .query_map(params![prefix], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(uris)
    }
}

impl Transport for SqliteStore {
    type Stream = StagedObject;

    fn open_write(
        &self,
        uri: &str,
        params: &TransportParams,
    ) -> Result<StagedObject, TransportError> {
        ObjectUri::parse_for(uri, "sqlite")?;
        Ok(StagedObject::new(uri, params.clone()))
    }

    fn commit(&self, stream: StagedObject) -> Result<(), TransportError> {
        let (uri, params, data) = stream.into_parts();
        let params_text = serde_json::to_string(&params)
            .map_err(|e| TransportError::Backend(e.to_string()))?;
        debug!(uri = %uri, bytes = data.len(), "committing object to sqlite");
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO objects (uri, data, params) VALUES (?, ?, ?)",
            params![uri, data, params_text],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_commit_then_get() {
        let store = SqliteStore::in_memory().unwrap();
        let mut params = TransportParams::new();
        params.insert("region".to_string(), "local".to_string());

        let mut stream = store.open_write("sqlite://b/a.csv", &params).unwrap();
        stream.write_all(b"id\n1\n").unwrap();
        assert_eq!(store.get("sqlite://b/a.csv").unwrap(), None);

        store.commit(stream).unwrap();
        assert_eq!(store.get("sqlite://b/a.csv").unwrap(), Some(b"id\n1\n".to_vec()));
        assert_eq!(store.params("sqlite://b/a.csv").unwrap(), Some(params));
    }

    #[test]
    fn test_list_with_prefix() {
        let store = SqliteStore::in_memory().unwrap();
        for uri in ["sqlite://b/x/1", "sqlite://b/x/2", "sqlite://b/x_y/3"] {
            let stream = store.open_write(uri, &TransportParams::new()).unwrap();
            store.commit(stream).unwrap();
        }
        assert_eq!(
            store.list("sqlite://b/x").unwrap(),
            vec!["sqlite://b/x/1", "sqlite://b/x/2"]
        );
    }

    #[test]
    fn test_list_with_non_ascii_prefix() {
        let store = SqliteStore::in_memory().unwrap();
        for uri in ["sqlite://bücket/a.csv", "sqlite://bücket/ü/b.csv", "sqlite://bucket/c.csv"] {
            let stream = store.open_write(uri, &TransportParams::new()).unwrap();
            store.commit(stream).unwrap();
        }
        assert_eq!(
            store.list("sqlite://bücket").unwrap(),
            vec!["sqlite://bücket/a.csv", "sqlite://bücket/ü/b.csv"]
        );
        assert_eq!(
            store.list("sqlite://bücket/ü/").unwrap(),
            vec!["sqlite://bücket/ü/b.csv"]
        );
    }

    #[test]
    fn test_rejects_other_scheme() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(matches!(
            store.open_write("mem://b/a", &TransportParams::new()),
            Err(TransportError::UnsupportedScheme(_))
        ));
    }
}
