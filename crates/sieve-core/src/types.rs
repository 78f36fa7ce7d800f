//! Columnar result table handed back to callers.
//!
//! Values are kept as untyped text: the loader does no type inference, so a
//! cell is either a string or `Null` (an empty field in the source). Column
//! names live on the columns themselves, which means an empty table still
//! carries its full schema.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::Hash256;
use crate::schema::Schema;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scalar {
    Null,
    Str(String),
}

impl Scalar {
    /// Map a raw delimited field to a cell; empty fields become `Null`.
    pub fn from_field(raw: &str) -> Self {
        if raw.is_empty() {
            Scalar::Null
        } else {
            Scalar::Str(raw.to_string())
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Null => None,
            Scalar::Str(s) => Some(s),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Approximate resident size of this cell, inline part included.
    pub fn estimated_bytes(&self) -> usize {
        let inline = std::mem::size_of::<Scalar>();
        match self {
            Scalar::Null => inline,
            Scalar::Str(s) => inline + s.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Scalar>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// In-memory table with the same column schema as its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<Column>,
}

impl Table {
    /// Zero-row table whose columns match `schema` exactly.
    pub fn empty(schema: &Schema) -> Self {
        Self::with_capacity(schema, 0)
    }

    pub fn with_capacity(schema: &Schema, rows: usize) -> Self {
        Self {
            columns: schema
                .fields
                .iter()
                .map(|f| Column {
                    name: f.name.clone(),
                    values: Vec::with_capacity(rows),
                })
                .collect(),
        }
    }

    pub fn schema(&self) -> Schema {
        Schema::from_names(self.columns.iter().map(|c| c.name.clone()))
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Borrow one row in column order.
    pub fn row(&self, idx: usize) -> Option<Vec<&Scalar>> {
        if idx >= self.num_rows() {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[idx]).collect())
    }

    /// Append one record. The record must have exactly one value per column.
    pub fn push_record<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = Scalar>,
    {
        let values: Vec<Scalar> = values.into_iter().collect();
        if values.len() != self.columns.len() {
            return Err(Error::Schema(format!(
                "record has {} fields, table has {} columns",
                values.len(),
                self.columns.len()
            )));
        }
        for (col, v) in self.columns.iter_mut().zip(values) {
            col.values.push(v);
        }
        Ok(())
    }

    /// Keep the rows whose mask entry is `true`, in their original order.
    pub fn retain_rows(&self, mask: &[bool]) -> Result<Table> {
        if mask.len() != self.num_rows() {
            return Err(Error::Invariant(format!(
                "row mask has {} entries for {} rows",
                mask.len(),
                self.num_rows()
            )));
        }
        let kept = mask.iter().filter(|m| **m).count();
        let columns = self
            .columns
            .iter()
            .map(|col| {
                let mut values = Vec::with_capacity(kept);
                for (v, keep) in col.values.iter().zip(mask) {
                    if *keep {
                        values.push(v.clone());
                    }
                }
                Column {
                    name: col.name.clone(),
                    values,
                }
            })
            .collect();
        Ok(Table { columns })
    }

    /// First `n` rows (or all of them if there are fewer).
    pub fn head(&self, n: usize) -> Table {
        let take = n.min(self.num_rows());
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: c.values[..take].to_vec(),
                })
                .collect(),
        }
    }

    /// Move `other`'s rows onto the end of this table. Column names and
    /// order must match.
    pub fn append(&mut self, other: Table) -> Result<()> {
        let same_columns = self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|(a, b)| a.name == b.name);
        if !same_columns {
            return Err(Error::Schema(format!(
                "cannot append columns {:?} to {:?}",
                other.schema().names(),
                self.schema().names()
            )));
        }
        for (dst, src) in self.columns.iter_mut().zip(other.columns) {
            dst.values.extend(src.values);
        }
        Ok(())
    }

    /// Stack `parts` vertically, in order, under `schema`.
    ///
    /// Every part must carry exactly `schema`'s columns; zero parts yields
    /// `Table::empty(schema)`.
    pub fn concat_rows(schema: &Schema, parts: Vec<Table>) -> Result<Table> {
        let total: usize = parts.iter().map(|p| p.num_rows()).sum();
        let mut out = Table::with_capacity(schema, total);
        for part in parts {
            out.append(part)?;
        }
        Ok(out)
    }

    /// Approximate resident size of all cells plus column names.
    pub fn estimated_bytes(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.name.len() + c.values.iter().map(Scalar::estimated_bytes).sum::<usize>())
            .sum()
    }

    /// Stable content digest over column names and every cell, in order.
    ///
    /// Two tables have equal fingerprints iff they have the same columns in
    /// the same order and the same cells row by row.
    pub fn fingerprint(&self) -> Hash256 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.columns.len() as u64).to_le_bytes());
        hasher.update(&(self.num_rows() as u64).to_le_bytes());
        for col in &self.columns {
            hash_str(&col.name, &mut hasher);
        }
        for row in 0..self.num_rows() {
            for col in &self.columns {
                hash_scalar(&col.values[row], &mut hasher);
            }
        }
        Hash256(hasher.finalize().into())
    }
}

fn hash_str(s: &str, hasher: &mut blake3::Hasher) {
    // Length prefix keeps ("ab","c") distinct from ("a","bc").
    hasher.update(&(s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn hash_scalar(scalar: &Scalar, hasher: &mut blake3::Hasher) {
    match scalar {
        Scalar::Null => {
            hasher.update(&[0u8]);
        }
        Scalar::Str(s) => {
            hasher.update(&[1u8]);
            hash_str(s, hasher);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let schema = Schema::from_names(["headline", "publisher"]);
        let mut t = Table::empty(&schema);
        t.push_record([Scalar::from_field("a"), Scalar::from_field("x")])
            .unwrap();
        t.push_record([Scalar::from_field("b"), Scalar::from_field("")])
            .unwrap();
        t.push_record([Scalar::from_field("c"), Scalar::from_field("z")])
            .unwrap();
        t
    }

    #[test]
    fn empty_table_keeps_schema() {
        let schema = Schema::from_names(["a", "b"]);
        let t = Table::empty(&schema);
        assert_eq!(t.num_rows(), 0);
        assert_eq!(t.schema(), schema);
    }

    #[test]
    fn push_record_rejects_ragged_rows() {
        let mut t = Table::empty(&Schema::from_names(["a", "b"]));
        let err = t.push_record([Scalar::Null]).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
        assert_eq!(t.num_rows(), 0);
    }

    #[test]
    fn retain_rows_preserves_order() {
        let t = sample();
        let kept = t.retain_rows(&[true, false, true]).unwrap();
        assert_eq!(kept.num_rows(), 2);
        assert_eq!(kept.columns[0].values[1], Scalar::Str("c".into()));
        assert!(t.retain_rows(&[true]).is_err());
    }

    #[test]
    fn concat_rows_checks_schema() {
        let t = sample();
        let schema = t.schema();
        let joined = Table::concat_rows(&schema, vec![t.head(1), t.clone()]).unwrap();
        assert_eq!(joined.num_rows(), 4);
        assert_eq!(joined.columns[0].values[1], Scalar::Str("a".into()));
        let none = Table::concat_rows(&schema, vec![]).unwrap();
        assert_eq!(none.schema(), schema);
        let other = Table::empty(&Schema::from_names(["headline"]));
        assert!(Table::concat_rows(&schema, vec![other]).is_err());
    }

    #[test]
    fn empty_field_is_null() {
        let t = sample();
        assert!(t.columns[1].values[1].is_null());
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = sample();
        let b = sample();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), a.head(2).fingerprint());
        let schema = Schema::from_names(["headline", "publisher"]);
        assert_ne!(
            Table::empty(&schema).fingerprint(),
            Table::empty(&Schema::from_names(["headline"])).fingerprint()
        );
    }
}
