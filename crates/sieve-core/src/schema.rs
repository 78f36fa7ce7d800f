//! Header-derived schema. Pure data; column names are opaque strings.
//!
//! The loader never interprets or validates names beyond passing them
//! through, so a `Field` is nothing more than a name at a position.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Ordered column set of a source; equal to its header row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Build a schema from header names, preserving their order.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: names.into_iter().map(Field::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_names_keeps_header_order() {
        let schema = Schema::from_names(["headline", "publisher", "publication_date"]);
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.names(), vec!["headline", "publisher", "publication_date"]);
        assert_eq!(schema.index_of("publisher"), Some(1));
        assert_eq!(schema.index_of("stock"), None);
    }

    #[test]
    fn duplicate_names_resolve_to_first() {
        let schema = Schema::from_names(["a", "b", "a"]);
        assert_eq!(schema.index_of("a"), Some(0));
        assert_eq!(schema.field(2).map(|f| f.name.as_str()), Some("a"));
    }
}
