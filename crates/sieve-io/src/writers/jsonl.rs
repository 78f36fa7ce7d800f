//! Streaming NDJSON writer: one object per row, keys in column order.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::Value;
use sieve_core::types::{Scalar, Table};

use crate::error::{Error, Result};

pub struct JsonlWriter<W: Write> {
    writer: BufWriter<W>,
    target: String,
}

impl JsonlWriter<File> {
    pub fn to_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let target = path.display().to_string();
        let f = File::create(path).map_err(|e| Error::io(&target, e))?;
        Ok(Self::to_writer(f, target))
    }
}

impl<W: Write> JsonlWriter<W> {
    pub fn to_writer(writer: W, target: impl Into<String>) -> Self {
        Self {
            writer: BufWriter::new(writer),
            target: target.into(),
        }
    }

    pub fn write_table(&mut self, table: &Table) -> Result<()> {
        for r in 0..table.num_rows() {
            // serde_json keeps insertion order only with `preserve_order`;
            // build the line by hand so keys follow the header.
            let mut line = String::from("{");
            for (ci, col) in table.columns.iter().enumerate() {
                if ci > 0 {
                    line.push(',');
                }
                line.push_str(&serde_json::to_string(&col.name)?);
                line.push(':');
                line.push_str(&serde_json::to_string(&scalar_to_json(&col.values[r]))?);
            }
            line.push('}');
            writeln!(self.writer, "{}", line).map_err(|e| Error::io(&self.target, e))?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| Error::io(&self.target, e))
    }
}

fn scalar_to_json(v: &Scalar) -> Value {
    match v {
        Scalar::Null => Value::Null,
        Scalar::Str(s) => Value::String(s.clone()),
    }
}
