//! Cell values produced by column accessors.

use std::cmp::Ordering;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::state::SortDirection;

/// A displayable, sortable and filterable cell value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Absent value.
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Converts a JSON value. Arrays and objects become their JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }

    /// Returns `true` for [`CellValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the number, if this is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Display text. Null displays as the empty string.
    pub fn display(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
        }
    }

    /// Lowercased display text, used for filtering and text sorting.
    pub fn folded(&self) -> String {
        self.display().to_lowercase()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Orders two cells for sorting.
///
/// Nulls sort first ascending and last descending. Two numbers compare
/// numerically; any other pair compares lowercased display text.
pub fn compare_cells(a: &CellValue, b: &CellValue, direction: SortDirection) -> Ordering {
    let ordering = match (a, b) {
        (CellValue::Null, CellValue::Null) => return Ordering::Equal,
        (CellValue::Null, _) => Ordering::Less,
        (_, CellValue::Null) => Ordering::Greater,
        (CellValue::Number(x), CellValue::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        _ => a.folded().cmp(&b.folded()),
    };

    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

fn format_number(n: f64) -> String {
    // integral values print without a fraction, like JSON
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_json() {
        assert_eq!(CellValue::from_json(&json!(null)), CellValue::Null);
        assert_eq!(CellValue::from_json(&json!(3)), CellValue::Number(3.0));
        assert_eq!(CellValue::from_json(&json!("Suite")), CellValue::from("Suite"));
        assert_eq!(CellValue::from_json(&json!([1, 2])), CellValue::from("[1,2]"));
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Number(12.0).display(), "12");
        assert_eq!(CellValue::Number(12.5).display(), "12.5");
        assert_eq!(CellValue::Bool(true).display(), "true");
        assert_eq!(CellValue::Null.display(), "");
        assert_eq!(CellValue::from("Ocean View").folded(), "ocean view");
    }

    #[test]
    fn test_compare_nulls() {
        let null = CellValue::Null;
        let one = CellValue::Number(1.0);
        assert_eq!(compare_cells(&null, &null, SortDirection::Ascending), Ordering::Equal);
        assert_eq!(compare_cells(&null, &one, SortDirection::Ascending), Ordering::Less);
        assert_eq!(compare_cells(&null, &one, SortDirection::Descending), Ordering::Greater);
        assert_eq!(compare_cells(&one, &null, SortDirection::Descending), Ordering::Less);
    }

    #[test]
    fn test_compare_numbers_and_text() {
        let two = CellValue::Number(2.0);
        let ten = CellValue::Number(10.0);
        assert_eq!(compare_cells(&two, &ten, SortDirection::Ascending), Ordering::Less);

        // text comparison is lexicographic
        let two_text = CellValue::from("2");
        let ten_text = CellValue::from("10");
        assert_eq!(compare_cells(&two_text, &ten_text, SortDirection::Ascending), Ordering::Greater);

        let upper = CellValue::from("Bravo");
        let lower = CellValue::from("alpha");
        assert_eq!(compare_cells(&upper, &lower, SortDirection::Ascending), Ordering::Greater);
    }

    #[test]
    fn test_compare_mixed_falls_back_to_text() {
        let number = CellValue::Number(5.0);
        let text = CellValue::from("abc");
        assert_eq!(compare_cells(&number, &text, SortDirection::Ascending), Ordering::Less);
    }
}
