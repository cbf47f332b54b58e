#[macro_use]
extern crate hamcrest;
use hamcrest::prelude::*;
use scoped_io::{
    with_scope, BackendConfig, BackendDescriptor, Error, FieldSchema, HeaderAliases, MemStore,
    RemoteBackend, Row, RowWriter, ScopedResource, TransportParams,
};
use scoped_io_mocked::{RecordingTransport, WANT_COMMIT_ERROR, WANT_OPEN_ERROR};
use std::sync::Arc;

fn schema() -> FieldSchema {
    FieldSchema::new(["id", "name"]).unwrap()
}

fn ann() -> Row {
    Row::new().with("id", 1).with("name", "Ann")
}

#[test]
fn object_committed_on_release() {
    let store = Arc::new(MemStore::new());
    let backend = RemoteBackend::new("mem://reports/people.csv", schema(), Arc::clone(&store));

    let mut guard = backend.enter().unwrap();
    guard.write_header(None).unwrap();
    guard.write_rows(&[ann()]).unwrap();
    assert_eq!(store.get("mem://reports/people.csv"), None);

    guard.close().unwrap();
    assert_that!(
        store.get("mem://reports/people.csv"),
        equal_to(Some(b"id,name\n1,Ann\n".to_vec()))
    );
}

#[test]
fn params_passed_through_verbatim() {
    let transport = Arc::new(RecordingTransport::new());
    let backend = RemoteBackend::new("s3://bucket/key.csv", schema(), Arc::clone(&transport))
        .with_param("region", "eu-west-1")
        .with_param("credentials", "profile:reports");

    with_scope(&backend, |writer| writer.write_rows(&[ann()])).unwrap();

    let mut expected = TransportParams::new();
    expected.insert("region".to_string(), "eu-west-1".to_string());
    expected.insert("credentials".to_string(), "profile:reports".to_string());
    assert_that!(transport.seen_params(), equal_to(vec![expected]));
    assert_that!(transport.opens(), equal_to(1));
    assert_that!(transport.commits(), equal_to(1));
    assert_that!(
        transport.get_string("s3://bucket/key.csv"),
        equal_to(Some("1,Ann\n".to_string()))
    );
}

#[test]
fn open_failure_is_acquisition_error() {
    let transport = Arc::new(RecordingTransport::new());
    let uri = format!("s3://bucket/missing{WANT_OPEN_ERROR}.csv");
    let backend = RemoteBackend::new(uri, schema(), Arc::clone(&transport));

    let err = with_scope(&backend, |writer| writer.write_header(None)).unwrap_err();

    assert!(matches!(err, Error::Acquisition { .. }), "got {err:?}");
    assert_that!(transport.commits(), equal_to(0));
}

#[test]
fn unknown_bucket_is_acquisition_error() {
    let store = Arc::new(MemStore::new().with_buckets(["reports"]));
    let backend = RemoteBackend::new("mem://archive/people.csv", schema(), store);

    let err = backend.acquire().unwrap_err();
    assert!(err.to_string().contains("archive"), "got {err}");
}

#[test]
fn commit_failure_is_release_error() {
    let transport = Arc::new(RecordingTransport::new());
    let uri = format!("s3://bucket/flaky{WANT_COMMIT_ERROR}.csv");
    let backend = RemoteBackend::new(uri.clone(), schema(), Arc::clone(&transport));

    let err = with_scope(&backend, |writer| writer.write_rows(&[ann()])).unwrap_err();

    assert!(matches!(err, Error::Release { .. }), "got {err:?}");
    assert_that!(transport.commits(), equal_to(1));
    assert_that!(transport.get(&uri), equal_to(None::<Vec<u8>>));
}

#[test]
fn descriptor_from_config() {
    let config: BackendConfig = r#"{
        "backend": "remote",
        "uri": "mem://reports/people.csv",
        "params": {"timeout": 30},
        "fields": ["id", "name"],
        "aliases": {"id": "ID", "name": "Full Name"}
    }"#
    .parse()
    .unwrap();
    let aliases: HeaderAliases = config.aliases().cloned().unwrap_or_default();
    let store = Arc::new(MemStore::new());
    let descriptor = config.into_descriptor(Some(Arc::clone(&store))).unwrap();
    assert_that!(descriptor.kind(), equal_to("remote"));

    with_scope(&descriptor, |writer| {
        writer.write_header(Some(&aliases))?;
        writer.write_rows(&[ann().with("extra", "x")])
    })
    .unwrap();

    assert_that!(
        store.get("mem://reports/people.csv"),
        equal_to(Some(b"ID,Full Name\n1,Ann\n".to_vec()))
    );
    assert_that!(
        store
            .params("mem://reports/people.csv")
            .and_then(|p| p.get("timeout").cloned()),
        equal_to(Some("30".to_string()))
    );
}

#[test]
fn memory_descriptor_writes_into_its_buffer() {
    let config = BackendConfig::from_value(serde_json::json!({
        "backend": "memory",
        "fields": ["id", "name"]
    }))
    .unwrap();
    let descriptor: BackendDescriptor = config.into_descriptor(None).unwrap();
    let BackendDescriptor::Memory(backend) = &descriptor else {
        panic!("Expected memory backend");
    };
    let buffer = backend.buffer().clone();

    with_scope(&descriptor, |writer| writer.write_rows(&[ann()])).unwrap();
    assert_that!(buffer.to_string_lossy(), equal_to("1,Ann\n".to_string()));
}
