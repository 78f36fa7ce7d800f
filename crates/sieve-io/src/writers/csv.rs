//! CSV table writer. Nulls are written as empty fields.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use sieve_core::types::Table;

use crate::error::{Error, Result};

pub struct CsvWriter<W: Write> {
    inner: ::csv::Writer<W>,
    target: String,
    header: Option<Vec<String>>,
}

impl CsvWriter<File> {
    pub fn to_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let target = path.display().to_string();
        let f = File::create(path).map_err(|e| Error::io(&target, e))?;
        Ok(Self::to_writer(f, target))
    }
}

impl<W: Write> CsvWriter<W> {
    pub fn to_writer(writer: W, target: impl Into<String>) -> Self {
        Self {
            inner: ::csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(writer),
            target: target.into(),
            header: None,
        }
    }

    /// Write `table`, emitting the header once (even for a zero-row table).
    /// Later tables must have the same columns.
    pub fn write_table(&mut self, table: &Table) -> Result<()> {
        let names: Vec<String> = table.columns.iter().map(|c| c.name.clone()).collect();
        match &self.header {
            None => {
                self.inner
                    .write_record(&names)
                    .map_err(|e| Error::from_csv(&self.target, e))?;
                self.header = Some(names);
            }
            Some(existing) if *existing != names => {
                return Err(Error::Core(sieve_core::Error::Schema(format!(
                    "writer expects columns {:?}, got {:?}",
                    existing, names
                ))));
            }
            Some(_) => {}
        }
        for r in 0..table.num_rows() {
            let fields = table
                .columns
                .iter()
                .map(|c| c.values[r].as_str().unwrap_or(""));
            self.inner
                .write_record(fields)
                .map_err(|e| Error::from_csv(&self.target, e))?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(|e| Error::io(&self.target, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_core::schema::Schema;
    use sieve_core::types::Scalar;

    #[test]
    fn writes_header_for_empty_table() {
        let mut out = Vec::new();
        {
            let mut w = CsvWriter::to_writer(&mut out, "mem");
            w.write_table(&Table::empty(&Schema::from_names(["a", "b"])))
                .unwrap();
            w.flush().unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "a,b\n");
    }

    #[test]
    fn quotes_and_nulls() {
        let mut t = Table::empty(&Schema::from_names(["headline", "publisher"]));
        t.push_record([Scalar::Str("Up, then down".into()), Scalar::Null])
            .unwrap();
        let mut out = Vec::new();
        {
            let mut w = CsvWriter::to_writer(&mut out, "mem");
            w.write_table(&t).unwrap();
            w.flush().unwrap();
        }
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "headline,publisher\n\"Up, then down\",\n"
        );
    }

    #[test]
    fn rejects_mismatched_columns() {
        let mut out = Vec::new();
        let mut w = CsvWriter::to_writer(&mut out, "mem");
        w.write_table(&Table::empty(&Schema::from_names(["a"])))
            .unwrap();
        assert!(w
            .write_table(&Table::empty(&Schema::from_names(["b"])))
            .is_err());
    }
}
