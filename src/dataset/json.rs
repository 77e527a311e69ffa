//! JSON record arrays
//!
//! Accepts a top-level array of objects. Columns are the union of object
//! keys in first-seen order; a `children` array nests rows for tree mode.

use serde_json::Value;

use crate::error::{GridError, Result};
use crate::model::{Align, Column, Record, RowRef};

use super::Dataset;

pub fn parse_json(content: &str) -> Result<Dataset> {
    let value: Value = serde_json::from_str(content)?;
    from_value(&value)
}

pub fn from_value(value: &Value) -> Result<Dataset> {
    let Some(items) = value.as_array() else {
        return Err(GridError::Dataset("expected a JSON array of objects".to_string()));
    };

    let mut keys: Vec<(String, bool)> = Vec::new();
    let mut rows: Vec<RowRef> = Vec::with_capacity(items.len());
    let mut next_key = 1;
    for item in items {
        if let Some(object) = item.as_object() {
            for (key, v) in object {
                if key == "children" {
                    continue;
                }
                match keys.iter_mut().find(|(k, _)| k == key) {
                    Some((_, numeric)) => *numeric &= v.is_number() || v.is_null(),
                    None => keys.push((key.clone(), v.is_number())),
                }
            }
        }
        rows.push(Record::from_json(&mut next_key, item).into_ref());
    }

    let columns = keys
        .into_iter()
        .map(|(key, numeric)| {
            let align = if numeric { Align::Right } else { Align::Left };
            Column::new(&key, &key).align(align).sortable().filterable()
        })
        .collect();
    Ok(Dataset { columns, rows })
}
