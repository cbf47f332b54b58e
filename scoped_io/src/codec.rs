//! Format codecs: turn rows into records on a byte sink.
//!
//! A codec owns the declared field schema and the sink. It does not track
//! whether the header was written; that is the writer's job.
//!
//! ```text
//! ScopedWriter ──(header-once, scope state)──▶ RowCodec ──(bytes)──▶ sink
//!                                              ├─ CsvCodec
//!                                              └─ JsonLinesCodec
//! ```

use crate::error::{Error, Result};
use crate::row::{FieldSchema, HeaderAliases, Row, Value};
use serde::Deserialize;
use std::borrow::Cow;
use std::io::{self, Write};

/// Serializer of a header and data rows onto a sink
pub trait RowCodec {
    /// The transport the codec writes into
    type Sink: Write;

    fn schema(&self) -> &FieldSchema;

    /// Emit the header record: aliases in field order, or the field names.
    ///
    /// # Errors
    /// Fails if the sink rejects the write.
    fn write_header(&mut self, aliases: Option<&HeaderAliases>) -> Result<()>;

    /// Emit one record per row, in order.
    ///
    /// Undeclared fields are ignored, missing ones are written empty.
    ///
    /// # Errors
    /// Fails on the first row the sink rejects; earlier rows stay written.
    fn write_rows(&mut self, rows: &[Row]) -> Result<()>;

    /// Flush buffered records and hand back the sink.
    ///
    /// # Errors
    /// Fails if the final flush fails.
    fn finish(self) -> Result<Self::Sink>;
}

/// Output format selector, as used in backend configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum CodecFormat {
    #[default]
    #[serde(rename = "csv")]
    Csv,
    #[serde(rename = "jsonl")]
    JsonLines,
}

impl CodecFormat {
    /// Build the codec for this format over `sink`
    pub fn codec<W: Write>(self, schema: FieldSchema, sink: W) -> FormatCodec<W> {
        match self {
            Self::Csv => FormatCodec::Csv(CsvCodec::new(schema, sink)),
            Self::JsonLines => FormatCodec::JsonLines(JsonLinesCodec::new(schema, sink)),
        }
    }
}

/// RFC 4180 CSV codec, `\n` record terminator
pub struct CsvCodec<W: Write> {
    schema: FieldSchema,
    inner: csv::Writer<W>,
}

impl<W: Write> CsvCodec<W> {
    pub fn new(schema: FieldSchema, sink: W) -> Self {
        let inner = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(sink);
        Self { schema, inner }
    }
}

impl<W: Write> RowCodec for CsvCodec<W> {
    type Sink = W;

    fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    fn write_header(&mut self, aliases: Option<&HeaderAliases>) -> Result<()> {
        self.inner.write_record(self.schema.header(aliases))?;
        Ok(())
    }

    fn write_rows(&mut self, rows: &[Row]) -> Result<()> {
        for row in rows {
            let fields: Vec<Cow<'_, str>> = row
                .project(&self.schema)
                .map(|cell| cell.map_or(Cow::Borrowed(""), Value::render))
                .collect();
            self.inner.write_record(fields.iter().map(|f| f.as_bytes()))?;
        }
        Ok(())
    }

    fn finish(self) -> Result<W> {
        self.inner.into_inner().map_err(|err| {
            let cause = err.error();
            Error::Io(io::Error::new(cause.kind(), cause.to_string()))
        })
    }
}

/// JSON Lines codec: one object per row, keys in schema order.
///
/// The header, if requested, is a JSON array of labels on its own line.
pub struct JsonLinesCodec<W: Write> {
    schema: FieldSchema,
    sink: W,
}

impl<W: Write> JsonLinesCodec<W> {
    pub fn new(schema: FieldSchema, sink: W) -> Self {
        Self { schema, sink }
    }
}

impl<W: Write> RowCodec for JsonLinesCodec<W> {
    type Sink = W;

    fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    fn write_header(&mut self, aliases: Option<&HeaderAliases>) -> Result<()> {
        serde_json::to_writer(&mut self.sink, &self.schema.header(aliases))?;
        self.sink.write_all(b"\n")?;
        Ok(())
    }

    fn write_rows(&mut self, rows: &[Row]) -> Result<()> {
        for row in rows {
            // serde_json::Map sorts keys, so the object is assembled by hand
            self.sink.write_all(b"{")?;
            for (i, (name, cell)) in self.schema.iter().zip(row.project(&self.schema)).enumerate() {
                if i > 0 {
                    self.sink.write_all(b",")?;
                }
                serde_json::to_writer(&mut self.sink, name)?;
                self.sink.write_all(b":")?;
                let value = cell.map_or(serde_json::Value::Null, Value::to_json);
                serde_json::to_writer(&mut self.sink, &value)?;
            }
            self.sink.write_all(b"}\n")?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<W> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}

/// Codec chosen at runtime from a [`CodecFormat`]
pub enum FormatCodec<W: Write> {
    Csv(CsvCodec<W>),
    JsonLines(JsonLinesCodec<W>),
}

impl<W: Write> RowCodec for FormatCodec<W> {
    type Sink = W;

    fn schema(&self) -> &FieldSchema {
        match self {
            Self::Csv(c) => c.schema(),
            Self::JsonLines(c) => c.schema(),
        }
    }

    fn write_header(&mut self, aliases: Option<&HeaderAliases>) -> Result<()> {
        match self {
            Self::Csv(c) => c.write_header(aliases),
            Self::JsonLines(c) => c.write_header(aliases),
        }
    }

    fn write_rows(&mut self, rows: &[Row]) -> Result<()> {
        match self {
            Self::Csv(c) => c.write_rows(rows),
            Self::JsonLines(c) => c.write_rows(rows),
        }
    }

    fn finish(self) -> Result<W> {
        match self {
            Self::Csv(c) => c.finish(),
            Self::JsonLines(c) => c.finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FieldSchema {
        FieldSchema::new(["id", "name"]).unwrap()
    }

    fn csv_output(rows: &[Row], aliases: Option<&HeaderAliases>) -> String {
        let mut codec = CsvCodec::new(schema(), Vec::new());
        codec.write_header(aliases).unwrap();
        codec.write_rows(rows).unwrap();
        String::from_utf8(codec.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_csv_header_and_row() {
        let rows = [Row::new().with("id", 1).with("name", "Ann")];
        assert_eq!(csv_output(&rows, None), "id,name\n1,Ann\n");
    }

    #[test]
    fn test_csv_quotes_separators_and_newlines() {
        let rows = [
            Row::new().with("id", 1).with("name", "Doe, Jane"),
            Row::new().with("id", 2).with("name", "line1\nline2"),
            Row::new().with("id", 3).with("name", "say \"hi\""),
        ];
        assert_eq!(
            csv_output(&rows, None),
            "id,name\n1,\"Doe, Jane\"\n2,\"line1\nline2\"\n3,\"say \"\"hi\"\"\"\n"
        );
    }

    #[test]
    fn test_csv_missing_and_null_fields_are_empty() {
        let rows = [
            Row::new().with("name", "Bob"),
            Row::new().with("id", 7).with("name", Value::Null),
        ];
        assert_eq!(csv_output(&rows, None), "id,name\n,Bob\n7,\n");
    }

    #[test]
    fn test_csv_rows_without_header() {
        let mut codec = CsvCodec::new(schema(), Vec::new());
        codec
            .write_rows(&[Row::new().with("name", "Ann").with("id", 1)])
            .unwrap();
        assert_eq!(codec.finish().unwrap(), b"1,Ann\n");
    }

    #[test]
    fn test_jsonl_keeps_schema_order() {
        let mut codec = JsonLinesCodec::new(schema(), Vec::new());
        let aliases = HeaderAliases::new().with("id", "ID");
        codec.write_header(Some(&aliases)).unwrap();
        codec
            .write_rows(&[
                Row::new().with("name", "Ann").with("id", 1).with("extra", "x"),
                Row::new().with("id", 2),
            ])
            .unwrap();

        let output = String::from_utf8(codec.finish().unwrap()).unwrap();
        assert_eq!(
            output,
            "[\"ID\",\"name\"]\n{\"id\":1,\"name\":\"Ann\"}\n{\"id\":2,\"name\":null}\n"
        );
    }

    #[test]
    fn test_format_selects_codec() {
        let mut codec = CodecFormat::JsonLines.codec(schema(), Vec::new());
        assert!(matches!(codec, FormatCodec::JsonLines(_)));
        codec.write_rows(&[Row::new().with("id", 1)]).unwrap();
        assert_eq!(codec.finish().unwrap(), b"{\"id\":1,\"name\":null}\n");
    }
}
