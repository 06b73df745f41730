//! Column descriptors.

use std::fmt;
use std::sync::Arc;

use crate::record::GridRecord;
use crate::value::CellValue;

/// Maps a record to the value used for display, sorting and filtering.
pub type Accessor<R> = Arc<dyn Fn(&R) -> CellValue + Send + Sync>;

/// Overrides how a cell is displayed. Sorting and filtering still use the
/// accessor value.
pub type CellRenderer<R> = Arc<dyn Fn(&R) -> String + Send + Sync>;

/// Column configuration.
///
/// Defaults: not sortable, not filterable, no width hint, values looked up
/// by `key`, displayed as their raw value. Sorting and filtering also need
/// the matching grid-level feature enabled.
///
/// `key` must be unique within a grid's column set.
///
/// # Examples
///
/// ```
/// use lodging_grid::Column;
/// use serde_json::Value;
///
/// let columns: Vec<Column<Value>> = vec![
///     Column::new("name", "Guest").sortable().filterable(),
///     Column::new("nights", "Nights").sortable().width(8),
///     Column::new("total", "Total")
///         .render(|r: &Value| format!("${}", r["total"])),
/// ];
/// ```
pub struct Column<R> {
    /// Unique column identifier, also the default lookup key.
    pub key: String,
    /// Header label.
    pub header: String,
    /// Whether clicking the header sorts by this column.
    pub sortable: bool,
    /// Whether this column offers a filter.
    pub filterable: bool,
    /// Layout width hint, in terminal cells.
    pub width: Option<u16>,
    accessor: Option<Accessor<R>>,
    render: Option<CellRenderer<R>>,
}

impl<R> Column<R> {
    /// Creates a column with default settings.
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            sortable: false,
            filterable: false,
            width: None,
            accessor: None,
            render: None,
        }
    }

    /// Makes the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Makes the column filterable.
    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    /// Sets the width hint.
    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets a custom accessor.
    pub fn accessor<F>(mut self, accessor: F) -> Self
    where
        F: Fn(&R) -> CellValue + Send + Sync + 'static,
    {
        self.accessor = Some(Arc::new(accessor));
        self
    }

    /// Sets a custom cell renderer.
    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(&R) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Returns `true` if a custom renderer is set.
    pub fn has_renderer(&self) -> bool {
        self.render.is_some()
    }
}

impl<R: GridRecord> Column<R> {
    /// Resolves the accessor value for a record.
    pub fn value(&self, record: &R) -> CellValue {
        match &self.accessor {
            Some(accessor) => accessor(record),
            None => record.field(&self.key),
        }
    }

    /// Resolves the display text for a record.
    pub fn display(&self, record: &R) -> String {
        match &self.render {
            Some(render) => render(record),
            None => self.value(record).display(),
        }
    }
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            header: self.header.clone(),
            sortable: self.sortable,
            filterable: self.filterable,
            width: self.width,
            accessor: self.accessor.clone(),
            render: self.render.clone(),
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("width", &self.width)
            .field("accessor", &self.accessor.is_some())
            .field("render", &self.render.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_defaults_use_key_lookup() {
        let column: Column<Value> = Column::new("name", "Name");
        let record = json!({ "name": "Ali" });
        assert!(!column.sortable && !column.filterable);
        assert_eq!(column.value(&record), CellValue::from("Ali"));
        assert_eq!(column.display(&record), "Ali");
    }

    #[test]
    fn test_render_does_not_change_value() {
        let column: Column<Value> = Column::new("rate", "Rate")
            .accessor(|r: &Value| CellValue::from_json(&r["pricing"]["rate"]))
            .render(|r: &Value| format!("{} USD", r["pricing"]["rate"]));
        let record = json!({ "pricing": { "rate": 120 } });

        assert_eq!(column.value(&record), CellValue::Number(120.0));
        assert_eq!(column.display(&record), "120 USD");
    }
}
