//! Row records
//!
//! The grid never owns application records. Rows are shared behind
//! [`RowRef`] and read through the [`RowData`] trait for the duration of a
//! render pass.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::value::CellValue;

/// Stable identity of a row, independent of its position after sorting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(pub u64);

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read access to an application record
pub trait RowData: fmt::Debug + Send + Sync {
    /// Stable key used for selection
    fn key(&self) -> RowKey;

    /// Value of the named field, `Null` when absent
    fn value(&self, field: &str) -> CellValue;

    /// Child rows for tree-shaped data
    fn children(&self) -> Vec<RowRef> {
        Vec::new()
    }
}

pub type RowRef = Arc<dyn RowData>;

/// A generic record: key plus named fields, optionally with children
#[derive(Debug, Clone, Default)]
pub struct Record {
    pub key: RowKey,
    pub fields: BTreeMap<String, CellValue>,
    pub children: Vec<RowRef>,
}

impl Record {
    pub fn new(key: u64) -> Self {
        Self {
            key: RowKey(key),
            fields: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style field setter
    pub fn with(mut self, field: &str, value: impl Into<CellValue>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<RowRef>) -> Self {
        self.children = children;
        self
    }

    pub fn into_ref(self) -> RowRef {
        Arc::new(self)
    }

    /// Build a record from a JSON object.
    ///
    /// Keys are drawn from `next_key` in pre-order: the record takes the
    /// current value, then each entry of a `children` array recurses. One
    /// counter shared across a whole document keeps every key unique.
    /// Non-object values produce an empty record.
    pub fn from_json(next_key: &mut u64, value: &serde_json::Value) -> Self {
        let mut record = Record::new(*next_key);
        *next_key += 1;
        let Some(object) = value.as_object() else {
            return record;
        };
        for (field, v) in object {
            if field == "children" {
                if let Some(items) = v.as_array() {
                    record.children = items
                        .iter()
                        .map(|child| Record::from_json(next_key, child).into_ref())
                        .collect();
                }
                continue;
            }
            record.fields.insert(field.clone(), CellValue::from(v));
        }
        record
    }
}

impl RowData for Record {
    fn key(&self) -> RowKey {
        self.key
    }

    fn value(&self, field: &str) -> CellValue {
        self.fields.get(field).cloned().unwrap_or_default()
    }

    fn children(&self) -> Vec<RowRef> {
        self.children.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let r = Record::new(7).with("name", "Ada").with("age", 36i64);
        assert_eq!(r.key(), RowKey(7));
        assert_eq!(r.value("name"), CellValue::Text("Ada".into()));
        assert_eq!(r.value("age"), CellValue::Int(36));
        assert_eq!(r.value("missing"), CellValue::Null);
    }

    #[test]
    fn test_record_from_json_with_children() {
        let json = serde_json::json!({
            "name": "root",
            "size": 10,
            "children": [{ "name": "a" }, { "name": "b" }]
        });
        let mut next_key = 1;
        let r = Record::from_json(&mut next_key, &json);
        assert_eq!(r.value("size"), CellValue::Int(10));
        let kids = r.children();
        assert_eq!(kids.len(), 2);
        assert_eq!(kids[1].value("name"), CellValue::Text("b".into()));
        assert_eq!(r.key(), RowKey(1));
        assert_eq!(kids[0].key(), RowKey(2));
        assert_eq!(kids[1].key(), RowKey(3));
        assert_eq!(next_key, 4);
    }
}
