//! Header-first CSV reader.
//!
//! The header row is parsed when the reader is constructed, so the schema is
//! known before (and independently of) any data row. Records are then pulled
//! in file order, either one at a time, as a bounded prefix, as a whole, or as
//! contiguous fixed-size chunks. Chunks partition the data rows exactly: no
//! overlap, no gaps, last chunk possibly short.
//!
//! Ragged rows and invalid UTF-8 are parse errors; nothing is skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use ::csv::{ReaderBuilder, StringRecord};
use sieve_core::schema::Schema;
use sieve_core::types::{Scalar, Table};

use crate::error::{Error, Result};

/// Parser buffer used when the caller does not pick one.
pub const DEFAULT_BUFFER_BYTES: usize = 64 * 1024;

pub struct CsvReader<R: Read> {
    inner: ::csv::Reader<R>,
    source: String,
    schema: Schema,
    record: StringRecord,
    rows_read: u64,
}

impl CsvReader<File> {
    /// Open `path` and read its header row.
    pub fn from_path(path: impl AsRef<Path>, buffer_bytes: usize) -> Result<Self> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let file = File::open(path).map_err(|e| Error::io(&label, e))?;
        Self::with_buffer(file, label, buffer_bytes)
    }
}

impl<R: Read> CsvReader<R> {
    /// Wrap any byte source; `source` labels errors and log lines.
    pub fn from_reader(reader: R, source: impl Into<String>) -> Result<Self> {
        Self::with_buffer(reader, source, DEFAULT_BUFFER_BYTES)
    }

    pub fn with_buffer(reader: R, source: impl Into<String>, buffer_bytes: usize) -> Result<Self> {
        let source = source.into();
        let mut inner = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .buffer_capacity(buffer_bytes.max(1))
            .from_reader(reader);

        let header = inner
            .headers()
            .map_err(|e| Error::from_csv(&source, e))?;
        if header.is_empty() {
            return Err(Error::MissingHeader { path: source });
        }
        let schema = Schema::from_names(header.iter());
        tracing::debug!(source = %source, columns = schema.len(), "read csv header");

        Ok(Self {
            inner,
            source,
            schema,
            record: StringRecord::new(),
            rows_read: 0,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Data rows consumed so far (header excluded).
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Bytes consumed by the parser so far, header included.
    pub fn bytes_scanned(&self) -> u64 {
        self.inner.position().byte()
    }

    /// Next data row in file order, or `None` at end of input.
    pub fn next_record(&mut self) -> Result<Option<Vec<Scalar>>> {
        let more = self
            .inner
            .read_record(&mut self.record)
            .map_err(|e| Error::from_csv(&self.source, e))?;
        if !more {
            return Ok(None);
        }
        self.rows_read += 1;
        Ok(Some(self.record.iter().map(Scalar::from_field).collect()))
    }

    /// Read up to `limit_rows` rows as one table.
    ///
    /// Returns `None` only when the input is exhausted before a single row
    /// was read; a short final batch is returned as `Some`. `limit_rows == 0`
    /// yields an empty table without touching the input.
    pub fn next_batch(&mut self, limit_rows: usize) -> Result<Option<Table>> {
        let mut batch = Table::with_capacity(&self.schema, limit_rows.min(4096));
        if limit_rows == 0 {
            return Ok(Some(batch));
        }
        while batch.num_rows() < limit_rows {
            match self.next_record()? {
                Some(values) => batch.push_record(values)?,
                None => break,
            }
        }
        if batch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(batch))
        }
    }

    /// The first `n` remaining rows (fewer if the input ends first).
    pub fn read_prefix(&mut self, n: u64) -> Result<Table> {
        let mut table = Table::with_capacity(&self.schema, n.min(4096) as usize);
        let mut taken = 0u64;
        while taken < n {
            match self.next_record()? {
                Some(values) => table.push_record(values)?,
                None => break,
            }
            taken += 1;
        }
        Ok(table)
    }

    /// Every remaining row, with no bound on memory.
    pub fn read_to_end(&mut self) -> Result<Table> {
        let mut table = Table::empty(&self.schema);
        while let Some(values) = self.next_record()? {
            table.push_record(values)?;
        }
        Ok(table)
    }

    /// Turn the reader into an iterator of contiguous `chunk_size`-row tables.
    pub fn into_chunks(self, chunk_size: usize) -> CsvChunks<R> {
        CsvChunks {
            reader: self,
            chunk_size: chunk_size.max(1),
            chunks_read: 0,
            done: false,
        }
    }
}

/// Iterator over contiguous row chunks. Stops after the first error.
pub struct CsvChunks<R: Read> {
    reader: CsvReader<R>,
    chunk_size: usize,
    chunks_read: u64,
    done: bool,
}

impl<R: Read> CsvChunks<R> {
    pub fn schema(&self) -> &Schema {
        self.reader.schema()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunks_read(&self) -> u64 {
        self.chunks_read
    }

    pub fn reader(&self) -> &CsvReader<R> {
        &self.reader
    }
}

impl<R: Read> Iterator for CsvChunks<R> {
    type Item = Result<Table>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_batch(self.chunk_size) {
            Ok(Some(chunk)) => {
                self.chunks_read += 1;
                Some(Ok(chunk))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEWS: &str = "headline,publisher,publication_date\n\
        Stocks rally,Reuters,2020-06-05\n\
        \"Fed holds, signals patience\",Bloomberg,2020-06-06\n\
        Oil slips,,2020-06-07\n";

    fn reader(data: &'static str) -> CsvReader<&'static [u8]> {
        CsvReader::from_reader(data.as_bytes(), "inline").unwrap()
    }

    #[test]
    fn header_is_read_eagerly() {
        let r = reader(NEWS);
        assert_eq!(
            r.schema().names(),
            vec!["headline", "publisher", "publication_date"]
        );
        assert_eq!(r.rows_read(), 0);
    }

    #[test]
    fn quoted_commas_and_empty_fields() {
        let mut r = reader(NEWS);
        let t = r.read_to_end().unwrap();
        assert_eq!(t.num_rows(), 3);
        assert_eq!(
            t.columns[0].values[1],
            Scalar::Str("Fed holds, signals patience".into())
        );
        assert!(t.columns[1].values[2].is_null());
    }

    #[test]
    fn prefix_respects_file_order() {
        let mut r = reader(NEWS);
        let t = r.read_prefix(2).unwrap();
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.columns[0].values[0], Scalar::Str("Stocks rally".into()));
        let mut r = reader(NEWS);
        assert_eq!(r.read_prefix(10).unwrap().num_rows(), 3);
    }

    #[test]
    fn chunks_partition_rows() {
        let chunks: Vec<Table> = reader(NEWS)
            .into_chunks(2)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].num_rows(), 2);
        assert_eq!(chunks[1].num_rows(), 1);
        assert_eq!(chunks[1].columns[0].values[0], Scalar::Str("Oil slips".into()));
    }

    #[test]
    fn header_only_has_no_chunks() {
        let mut chunks = reader("a,b\n").into_chunks(10);
        assert!(chunks.next().is_none());
        assert_eq!(chunks.chunks_read(), 0);
        assert_eq!(chunks.schema().names(), vec!["a", "b"]);
    }

    #[test]
    fn empty_input_is_missing_header() {
        let err = CsvReader::from_reader(&b""[..], "empty").err().unwrap();
        assert!(matches!(err, Error::MissingHeader { .. }));
    }

    #[test]
    fn ragged_row_is_parse_error_and_stops_chunks() {
        let mut chunks = reader("a,b\n1,2\n3\n4,5\n").into_chunks(1);
        assert!(chunks.next().unwrap().is_ok());
        let err = chunks.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "{err}");
        assert!(chunks.next().is_none());
    }

    #[test]
    fn invalid_utf8_is_parse_error() {
        let data: &[u8] = b"a,b\n1,\xff\xfe\n";
        let mut r = CsvReader::from_reader(data, "bytes").unwrap();
        assert!(matches!(r.next_record(), Err(Error::Parse { .. })));
    }

    #[test]
    fn zero_limit_batch_does_not_consume() {
        let mut r = reader(NEWS);
        assert_eq!(r.next_batch(0).unwrap().map(|t| t.num_rows()), Some(0));
        assert_eq!(r.rows_read(), 0);
    }
}
