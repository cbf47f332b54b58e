//! Write the same rows to a local file and to an in-memory object store.
//!
//! Run with `RUST_LOG=debug` to see acquire/release events.

use scoped_io::{
    with_scope, FieldSchema, HeaderAliases, LocalBackend, MemStore, RemoteBackend, Row, RowWriter,
};
use std::sync::Arc;
use tracing::info;

fn people() -> Vec<Row> {
    vec![
        Row::new().with("id", 1).with("name", "Ann"),
        Row::new().with("id", 2).with("name", "Bob"),
    ]
}

fn main() -> Result<(), scoped_io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let schema = FieldSchema::new(["id", "name"])?;
    let aliases = HeaderAliases::new().with("id", "ID").with("name", "Full Name");
    let rows = people();

    let path = std::env::temp_dir().join("people.csv");
    let local = LocalBackend::new(&path, schema.clone());
    with_scope(&local, |writer| {
        writer.write_header(Some(&aliases))?;
        writer.write_rows(&rows)
    })?;
    info!(path = %path.display(), "wrote local file");

    let store = Arc::new(MemStore::new());
    let remote = RemoteBackend::new("mem://reports/people.csv", schema, Arc::clone(&store))
        .with_param("region", "local");
    with_scope(&remote, |writer| {
        writer.write_header(Some(&aliases))?;
        writer.write_rows(&rows)
    })?;

    for uri in store.list("mem://reports") {
        let bytes = store.get(&uri).map_or(0, |data| data.len());
        info!(uri = %uri, bytes, "committed object");
    }
    Ok(())
}
