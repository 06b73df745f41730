//! Records displayed by the grid.

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde_json::Value;

use crate::value::CellValue;

/// Fields checked, in order, for a record's own identifier.
pub const ROW_KEY_FIELDS: [&str; 4] = ["__key", "id", "Id", "key"];

/// A record that can be shown as a grid row.
///
/// The grid knows nothing about what a record means; it only looks fields
/// up by column key.
pub trait GridRecord {
    /// Looks up a field by key. Missing fields are [`CellValue::Null`].
    fn field(&self, key: &str) -> CellValue;

    /// Returns the record's conventional identifier, if it has one.
    fn conventional_key(&self) -> Option<String> {
        ROW_KEY_FIELDS
            .iter()
            .map(|key| self.field(key))
            .find(|value| !value.is_null())
            .map(|value| value.display())
    }
}

impl GridRecord for Value {
    fn field(&self, key: &str) -> CellValue {
        self.get(key).map_or(CellValue::Null, CellValue::from_json)
    }
}

impl GridRecord for BTreeMap<String, CellValue> {
    fn field(&self, key: &str) -> CellValue {
        self.get(key).cloned().unwrap_or_default()
    }
}

impl GridRecord for HashMap<String, CellValue> {
    fn field(&self, key: &str) -> CellValue {
        self.get(key).cloned().unwrap_or_default()
    }
}
