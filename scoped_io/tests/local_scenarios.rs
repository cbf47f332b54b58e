#[macro_use]
extern crate hamcrest;
use hamcrest::prelude::*;
use scoped_io::{
    with_scope, CodecFormat, Error, FieldSchema, HeaderAliases, LocalBackend, Row, RowWriter,
    ScopedResource,
};
use std::path::Path;
use tempfile::TempDir;

fn schema() -> FieldSchema {
    FieldSchema::new(["id", "name"]).expect("valid schema")
}

fn ann() -> Row {
    Row::new().with("id", 1).with("name", "Ann")
}

fn write_csv(path: &Path, aliases: Option<&HeaderAliases>, rows: &[Row]) -> String {
    let backend = LocalBackend::new(path, schema());
    with_scope(&backend, |writer| {
        writer.write_header(aliases)?;
        writer.write_rows(rows)
    })
    .expect("scope should succeed");
    std::fs::read_to_string(path).expect("output file should exist")
}

#[test]
fn header_from_field_names() {
    let dir = TempDir::new().unwrap();
    let output = write_csv(&dir.path().join("a.csv"), None, &[ann()]);

    assert_that!(output, equal_to("id,name\n1,Ann\n".to_string()));
}

#[test]
fn header_from_aliases() {
    let dir = TempDir::new().unwrap();
    let aliases = HeaderAliases::new().with("id", "ID").with("name", "Full Name");
    let output = write_csv(&dir.path().join("b.csv"), Some(&aliases), &[ann()]);

    assert_that!(output, equal_to("ID,Full Name\n1,Ann\n".to_string()));
}

#[test]
fn extra_fields_are_dropped() {
    let dir = TempDir::new().unwrap();
    let row = ann().with("extra", "x");
    let output = write_csv(&dir.path().join("c.csv"), None, &[row]);

    assert_that!(output, equal_to("id,name\n1,Ann\n".to_string()));
}

#[test]
fn unwritable_path_fails_on_acquire() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no-such-dir").join("d.csv");
    let backend = LocalBackend::new(&path, schema());

    let mut reached = false;
    let err = with_scope(&backend, |_writer| {
        reached = true;
        Ok::<_, Error>(())
    })
    .unwrap_err();

    assert!(matches!(err, Error::Acquisition { .. }), "got {err:?}");
    assert!(!reached, "body must not run when acquire fails");
    assert!(!path.exists());
}

#[test]
fn existing_file_is_truncated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("e.csv");
    std::fs::write(&path, "old,content\nthat,is\nlonger,than\nthe,new\n").unwrap();

    let output = write_csv(&path, None, &[ann()]);
    assert_that!(output, equal_to("id,name\n1,Ann\n".to_string()));
}

#[test]
fn written_rows_read_back_projected() {
    let cases: Vec<(Vec<&str>, Vec<Row>)> = vec![
        (vec!["id"], vec![Row::new().with("id", 1), Row::new().with("id", 2)]),
        (
            vec!["id", "name", "note"],
            vec![
                Row::new().with("id", 1).with("name", "Ann").with("note", "a, b"),
                Row::new().with("name", "Bob"),
                Row::new().with("note", "multi\nline \"quoted\"").with("id", 3),
            ],
        ),
        (vec!["x", "y"], vec![]),
    ];

    let dir = TempDir::new().unwrap();
    for (i, (fields, rows)) in cases.into_iter().enumerate() {
        let path = dir.path().join(format!("roundtrip-{i}.csv"));
        let schema = FieldSchema::new(fields.clone()).unwrap();
        let backend = LocalBackend::new(&path, schema.clone());
        with_scope(&backend, |writer| {
            writer.write_header(None)?;
            writer.write_rows(&rows)
        })
        .unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(header, fields);

        let read_back: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        let expected: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                row.project(&schema)
                    .map(|cell| cell.map(ToString::to_string).unwrap_or_default())
                    .collect()
            })
            .collect();
        assert_eq!(read_back, expected, "case {i}");
    }
}

#[test]
fn jsonl_format_on_local_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.jsonl");
    let backend = LocalBackend::new(&path, schema()).with_format(CodecFormat::JsonLines);

    with_scope(&backend, |writer| writer.write_rows(&[ann()])).unwrap();

    let line = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
    assert_eq!(value, serde_json::json!({"id": 1, "name": "Ann"}));
}

#[test]
fn release_of_closed_writer_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("f.csv");
    let backend = LocalBackend::new(&path, schema());

    let mut writer = backend.acquire().unwrap();
    writer.write_header(None).unwrap();
    writer.close().unwrap();

    assert!(matches!(
        writer.write_rows(&[ann()]),
        Err(Error::NotInitialized)
    ));
    backend.release(writer).unwrap();
    assert_that!(
        std::fs::read_to_string(&path).unwrap(),
        equal_to("id,name\n".to_string())
    );
}
