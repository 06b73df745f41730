//! The DataGrid: records, columns, options and state in one place.

use crate::column::Column;
use crate::options::GridOptions;
use crate::record::GridRecord;
use crate::render::EMPTY_MESSAGE;
use crate::render::FILTER_HINT;
use crate::render::FilterAffordance;
use crate::render::FilterPopup;
use crate::render::Footer;
use crate::render::HeaderCell;
use crate::render::RenderedBody;
use crate::render::RenderedCell;
use crate::render::RenderedGrid;
use crate::render::RenderedRow;
use crate::render::RowKey;
use crate::render::SortIndicator;
use crate::state::GridState;
use crate::sticky::StickyLayout;
use crate::view::GridView;
use crate::view::compute_view;

/// Resolves a row key from a record and its position within the page.
pub type RowKeyFn<R> = Box<dyn Fn(&R, usize) -> String + Send + Sync>;

/// Resolves extra row classes from a record and its position within the page.
pub type RowClassFn<R> = Box<dyn Fn(&R, usize) -> String + Send + Sync>;

/// Called with the clicked record.
pub type RowClickFn<R> = Box<dyn Fn(&R) + Send + Sync>;

/// A sortable, filterable, paginated grid over a record collection.
///
/// # Example
///
/// ```
/// use lodging_grid::{Column, DataGrid, GridOptions};
/// use serde_json::{json, Value};
///
/// let columns: Vec<Column<Value>> = vec![
///     Column::new("name", "Guest").sortable().filterable(),
///     Column::new("room", "Room").sortable(),
/// ];
/// let mut grid = DataGrid::new(columns, vec![
///     json!({ "id": 1, "name": "Alice", "room": 101 }),
///     json!({ "id": 2, "name": "Bob", "room": 102 }),
/// ])
/// .with_options(GridOptions::default().with_default_page_size(10));
///
/// grid.set_filter("name", "ali");
/// assert_eq!(grid.view().total, 1);
/// ```
pub struct DataGrid<R> {
    records: Vec<R>,
    columns: Vec<Column<R>>,
    options: GridOptions,
    state: GridState,
    sticky: StickyLayout,
    row_key: Option<RowKeyFn<R>>,
    row_class_name: Option<RowClassFn<R>>,
    on_row_click: Option<RowClickFn<R>>,
}

impl<R: GridRecord> DataGrid<R> {
    /// Creates a grid with default options.
    pub fn new(columns: Vec<Column<R>>, records: Vec<R>) -> Self {
        let options = GridOptions::default();
        Self {
            records,
            columns,
            state: GridState::new(&options),
            sticky: StickyLayout::new(options.frozen_column_count),
            options,
            row_key: None,
            row_class_name: None,
            on_row_click: None,
        }
    }

    /// Replaces the options and resets the state.
    pub fn with_options(mut self, options: GridOptions) -> Self {
        self.state = GridState::new(&options);
        self.sticky = StickyLayout::new(options.frozen_column_count);
        self.options = options;
        self
    }

    /// Sets the row key resolver.
    pub fn row_key<F>(mut self, f: F) -> Self
    where
        F: Fn(&R, usize) -> String + Send + Sync + 'static,
    {
        self.row_key = Some(Box::new(f));
        self
    }

    /// Sets the row class resolver.
    pub fn row_class_name<F>(mut self, f: F) -> Self
    where
        F: Fn(&R, usize) -> String + Send + Sync + 'static,
    {
        self.row_class_name = Some(Box::new(f));
        self
    }

    /// Sets the row click callback.
    pub fn on_row_click<F>(mut self, f: F) -> Self
    where
        F: Fn(&R) + Send + Sync + 'static,
    {
        self.on_row_click = Some(Box::new(f));
        self
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn sticky(&self) -> &StickyLayout {
        &self.sticky
    }

    /// Replaces the records and returns to page 1.
    ///
    /// Sort and filters are kept.
    pub fn set_data(&mut self, records: Vec<R>) {
        self.records = records;
        self.state.reset_page();
        self.sticky.invalidate();
    }

    /// Replaces the columns.
    pub fn set_columns(&mut self, columns: Vec<Column<R>>) {
        self.columns = columns;
        self.sticky.invalidate();
    }

    /// Changes the number of frozen columns.
    pub fn set_frozen_column_count(&mut self, count: usize) {
        self.options.frozen_column_count = count;
        self.sticky.set_frozen_count(count);
    }

    /// Notes a viewport width change.
    pub fn resize(&mut self) {
        self.sticky.invalidate();
    }

    /// Feeds measured header widths, in column order, to the sticky layout.
    pub fn measure_headers(&mut self, widths: &[u32]) {
        self.sticky.measure(widths);
    }

    /// Handles a header click. Returns `true` if the sort changed.
    pub fn click_header(&mut self, key: &str) -> bool {
        if !self.options.enable_sorting || !self.column(key).is_some_and(|c| c.sortable) {
            return false;
        }
        self.state.toggle_sort(key);
        true
    }

    /// Handles a filter button click. Returns `true` if handled.
    pub fn toggle_filter(&mut self, key: &str) -> bool {
        if !self.filter_enabled(key) {
            return false;
        }
        self.state.toggle_filter_popup(key);
        true
    }

    /// Sets a column's filter text.
    pub fn set_filter(&mut self, key: &str, value: impl Into<String>) {
        self.state.set_filter(key, value, &self.options);
    }

    /// Popup "Clear" action.
    pub fn clear_filter(&mut self, key: &str) {
        self.state.clear_filter(key, &self.options);
    }

    /// Popup "Done" action.
    pub fn close_filter(&mut self) {
        self.state.close_filter_popup();
    }

    /// Handles the Escape key. Returns `true` if a popup was closed.
    pub fn handle_escape(&mut self) -> bool {
        self.state.handle_escape()
    }

    /// Changes the page size.
    pub fn set_page_size(&mut self, size: usize) {
        self.state.set_page_size(size, &self.options);
    }

    pub fn first_page(&mut self) {
        self.state.first_page();
    }

    pub fn prev_page(&mut self) {
        self.state.prev_page();
    }

    pub fn next_page(&mut self) {
        let total_pages = self.view().total_pages;
        self.state.next_page(total_pages);
    }

    pub fn last_page(&mut self) {
        let total_pages = self.view().total_pages;
        self.state.last_page(total_pages);
    }

    /// Jumps to a 1-based page, clamped to the valid range.
    pub fn go_to_page(&mut self, page: usize) {
        self.state.page = page.max(1);
        self.view();
    }

    /// Computes the current view.
    ///
    /// An overflowing page is clamped and the view recomputed, so the
    /// result always shows a valid page.
    pub fn view(&mut self) -> GridView {
        let view = compute_view(&self.records, &self.columns, &self.state, &self.options);
        match view.clamp_to {
            Some(page) if self.options.enable_pagination => {
                self.state.clamp_page(page);
                compute_view(&self.records, &self.columns, &self.state, &self.options)
            }
            _ => view,
        }
    }

    /// Handles a click on the row at `position` within the current page.
    ///
    /// Returns `true` if a callback ran.
    pub fn click_row(&mut self, position: usize) -> bool {
        let view = self.view();
        let (Some(callback), Some(&index)) = (&self.on_row_click, view.rows.get(position)) else {
            return false;
        };
        callback(&self.records[index]);
        true
    }

    /// Resolves the key of `record` at `position` within the page.
    pub fn resolve_row_key(&self, record: &R, position: usize) -> RowKey {
        if let Some(row_key) = &self.row_key {
            return RowKey::Custom(row_key(record, position));
        }
        record
            .conventional_key()
            .map_or(RowKey::Index(position), RowKey::Field)
    }

    /// Builds the render model.
    ///
    /// Frozen column offsets are measured from the text layout unless the
    /// host already measured them.
    pub fn render(&mut self) -> RenderedGrid {
        let view = self.view();
        let mut grid = self.build(&view);

        if self.sticky.is_dirty() {
            let widths: Vec<u32> = grid
                .text_column_widths()
                .iter()
                .map(|w| u32::try_from(*w + 3).unwrap_or(u32::MAX))
                .collect();
            self.sticky.measure(&widths);
        }
        self.apply_sticky(&mut grid);
        grid
    }

    /// Renders the grid as a plain-text table.
    pub fn render_text(&mut self) -> String {
        self.render().render_text()
    }

    fn column(&self, key: &str) -> Option<&Column<R>> {
        self.columns.iter().find(|c| c.key == key)
    }

    fn filter_enabled(&self, key: &str) -> bool {
        self.options.enable_filtering && self.column(key).is_some_and(|c| c.filterable)
    }

    fn build(&self, view: &GridView) -> RenderedGrid {
        let headers = self
            .columns
            .iter()
            .map(|column| {
                let sortable = self.options.enable_sorting && column.sortable;
                let sorted = self.state.sort.key.as_deref() == Some(column.key.as_str());
                HeaderCell {
                    key: column.key.clone(),
                    label: column.header.clone(),
                    width: column.width,
                    clickable: sortable,
                    sort: sortable
                        .then(|| SortIndicator::for_column(sorted, self.state.sort.direction)),
                    filter: self.filter_enabled(&column.key).then(|| FilterAffordance {
                        title: format!("Filter {}", column.header),
                        open: self.state.open_filter.as_deref() == Some(column.key.as_str()),
                        applied: self.state.active_filter(&column.key).is_some(),
                    }),
                    sticky: None,
                }
            })
            .collect();

        let popup = self
            .state
            .open_filter
            .as_deref()
            .filter(|key| self.filter_enabled(key))
            .and_then(|key| self.column(key))
            .map(|column| FilterPopup {
                column_key: column.key.clone(),
                placeholder: format!("Search {}", column.header),
                value: self.state.filter(&column.key).to_string(),
                hint: FILTER_HINT,
            });

        let body = if view.rows.is_empty() {
            RenderedBody::Empty {
                message: EMPTY_MESSAGE,
                colspan: self.columns.len(),
            }
        } else {
            RenderedBody::Rows(
                view.rows
                    .iter()
                    .enumerate()
                    .map(|(position, &index)| self.build_row(position, index))
                    .collect(),
            )
        };

        let footer = self.options.enable_pagination.then(|| {
            Footer::new(
                view.from,
                view.to,
                view.total,
                view.page,
                view.total_pages,
                self.state.page_size,
                &self.options.page_size_options,
            )
        });

        RenderedGrid {
            headers,
            freeze_header: self.options.freeze_header,
            popup,
            body,
            footer,
        }
    }

    fn build_row(&self, position: usize, index: usize) -> RenderedRow {
        let record = &self.records[index];
        RenderedRow {
            key: self.resolve_row_key(record, position),
            record_index: index,
            class_name: self
                .row_class_name
                .as_ref()
                .map(|f| f(record, position))
                .unwrap_or_default(),
            clickable: self.on_row_click.is_some(),
            cells: self
                .columns
                .iter()
                .map(|column| RenderedCell {
                    text: column.display(record),
                    sticky: None,
                })
                .collect(),
        }
    }

    fn apply_sticky(&self, grid: &mut RenderedGrid) {
        if !self.sticky.is_enabled() {
            return;
        }
        for (i, header) in grid.headers.iter_mut().enumerate() {
            header.sticky = self.sticky.position(i, true);
        }
        if let RenderedBody::Rows(rows) = &mut grid.body {
            for row in rows {
                for (i, cell) in row.cells.iter_mut().enumerate() {
                    cell.sticky = self.sticky.position(i, false);
                }
            }
        }
    }
}
