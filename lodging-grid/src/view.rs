//! The filter, sort and paginate pipeline.

use serde_json::Value;

use crate::column::Column;
use crate::options::GridOptions;
use crate::record::GridRecord;
use crate::state::GridState;
use crate::value::compare_cells;

/// Result of one pipeline run.
///
/// `rows` holds indices into the input records, in display order, so the
/// input is never reordered or mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView {
    /// Records left after filtering.
    pub total: usize,
    /// Page count, at least 1.
    pub total_pages: usize,
    /// Page this view was computed for.
    pub page: usize,
    /// Input indices of the rows to show.
    pub rows: Vec<usize>,
    /// 1-based index of the first row shown, 0 when empty.
    pub from: usize,
    /// 1-based index of the last row shown, 0 when empty.
    pub to: usize,
    /// Page the state should clamp to before the next computation.
    pub clamp_to: Option<usize>,
}

impl GridView {
    /// Returns `true` if no row is shown.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Runs the pipeline over `records`.
///
/// Pure: identical inputs give identical output.
pub fn compute_view<R: GridRecord>(
    records: &[R],
    columns: &[Column<R>],
    state: &GridState,
    options: &GridOptions,
) -> GridView {
    let mut rows: Vec<usize> = (0..records.len()).collect();

    if options.enable_filtering {
        rows.retain(|&index| matches_filters(&records[index], columns, state));
    }

    if options.enable_sorting
        && let Some(key) = state.sort.key.as_deref()
        && let Some(column) = columns.iter().find(|c| c.key == key)
    {
        let direction = state.sort.direction;
        let values: Vec<_> = records.iter().map(|r| column.value(r)).collect();
        rows.sort_by(|&a, &b| compare_cells(&values[a], &values[b], direction));
    }

    let total = rows.len();
    let page_size = state.page_size.max(1);
    let total_pages = state.total_pages(total);

    if !options.enable_pagination {
        return GridView {
            total,
            total_pages,
            page: state.page,
            rows,
            from: if total == 0 { 0 } else { 1 },
            to: total,
            clamp_to: None,
        };
    }

    let page = state.page.max(1);
    let start = (page - 1).saturating_mul(page_size);
    let rows: Vec<usize> = rows.into_iter().skip(start).take(page_size).collect();
    let (from, to) = if total == 0 {
        (0, 0)
    } else {
        (start + 1, (page * page_size).min(total))
    };

    GridView {
        total,
        total_pages,
        page,
        rows,
        from,
        to,
        clamp_to: (page > total_pages).then_some(total_pages),
    }
}

/// Runs the pipeline over a JSON array. Anything else counts as no records.
pub fn compute_view_json(
    data: &Value,
    columns: &[Column<Value>],
    state: &GridState,
    options: &GridOptions,
) -> GridView {
    match data.as_array() {
        Some(records) => compute_view(records, columns, state, options),
        None => {
            log::debug!("grid data is not an array, showing no records");
            compute_view(&[], columns, state, options)
        }
    }
}

/// Returns `true` if `record` matches every active filter on a filterable
/// column.
pub fn matches_filters<R: GridRecord>(record: &R, columns: &[Column<R>], state: &GridState) -> bool {
    columns
        .iter()
        .filter(|column| column.filterable)
        .all(|column| match state.active_filter(&column.key) {
            Some(filter) => column.value(record).folded().contains(&filter.to_lowercase()),
            None => true,
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::state::SortDirection;

    fn columns() -> Vec<Column<Value>> {
        vec![
            Column::new("a", "A").sortable().filterable(),
            Column::new("b", "B").filterable(),
            Column::new("c", "C"),
        ]
    }

    #[test]
    fn test_sort_nulls_first_ascending() {
        let records = vec![json!({ "a": 2 }), json!({ "a": null }), json!({ "a": 1 })];
        let options = GridOptions::default();
        let mut state = GridState::new(&options);

        state.toggle_sort("a");
        let view = compute_view(&records, &columns(), &state, &options);
        assert_eq!(view.rows, vec![1, 2, 0]);

        state.toggle_sort("a");
        assert_eq!(state.sort.direction, SortDirection::Descending);
        let view = compute_view(&records, &columns(), &state, &options);
        assert_eq!(view.rows, vec![0, 2, 1]);
    }

    #[test]
    fn test_sort_is_stable() {
        let records = vec![
            json!({ "a": "x", "id": 1 }),
            json!({ "a": "X", "id": 2 }),
            json!({ "a": "w", "id": 3 }),
        ];
        let options = GridOptions::default();
        let mut state = GridState::new(&options);
        state.toggle_sort("a");

        let view = compute_view(&records, &columns(), &state, &options);
        assert_eq!(view.rows, vec![2, 0, 1]);
    }

    #[test]
    fn test_sort_disabled_or_unknown_key() {
        let records = vec![json!({ "a": 2 }), json!({ "a": 1 })];
        let options = GridOptions::default().with_sorting(false);
        let mut state = GridState::new(&options);
        state.toggle_sort("a");
        assert_eq!(compute_view(&records, &columns(), &state, &options).rows, vec![0, 1]);

        let options = GridOptions::default();
        state.toggle_sort("gone");
        assert_eq!(compute_view(&records, &columns(), &state, &options).rows, vec![0, 1]);
    }

    #[test]
    fn test_filters_and_compose() {
        let records = vec![
            json!({ "a": "Alice", "b": "Lobby", "c": "zzz" }),
            json!({ "a": "Alison", "b": "Garden", "c": "zzz" }),
            json!({ "a": "Bob", "b": "Lobby", "c": "zzz" }),
        ];
        let options = GridOptions::default();
        let mut state = GridState::new(&options);

        state.set_filter("a", "ALI", &options);
        assert_eq!(compute_view(&records, &columns(), &state, &options).rows, vec![0, 1]);

        state.set_filter("b", "lob", &options);
        assert_eq!(compute_view(&records, &columns(), &state, &options).rows, vec![0]);

        // short filters and filters on non-filterable columns are ignored
        state.set_filter("b", "lo", &options);
        state.set_filter("c", "nothing matches", &options);
        assert_eq!(compute_view(&records, &columns(), &state, &options).rows, vec![0, 1]);
    }

    #[test]
    fn test_filter_treats_missing_as_empty() {
        let records = vec![json!({ "b": "Lobby" }), json!({ "a": "Ali" })];
        let options = GridOptions::default();
        let mut state = GridState::new(&options);
        state.set_filter("a", "ali", &options);
        assert_eq!(compute_view(&records, &columns(), &state, &options).rows, vec![1]);
    }

    #[test]
    fn test_filtering_disabled() {
        let records = vec![json!({ "a": "Bob" })];
        let options = GridOptions::default().with_filtering(false);
        let mut state = GridState::new(&options);
        state.set_filter("a", "ali", &options);
        assert_eq!(compute_view(&records, &columns(), &state, &options).total, 1);
    }

    #[test]
    fn test_pagination_slices() {
        let records: Vec<Value> = (1..=23).map(|i| json!({ "a": i })).collect();
        let options = GridOptions::default();
        let mut state = GridState::new(&options);
        state.set_page_size(10, &options);

        let view = compute_view(&records, &columns(), &state, &options);
        assert_eq!(view.rows, (0..10).collect::<Vec<_>>());
        assert_eq!((view.total, view.total_pages, view.from, view.to), (23, 3, 1, 10));

        state.page = 3;
        let view = compute_view(&records, &columns(), &state, &options);
        assert_eq!(view.rows, vec![20, 21, 22]);
        assert_eq!((view.from, view.to, view.clamp_to), (21, 23, None));
    }

    #[test]
    fn test_overflowing_page_requests_clamp() {
        let records: Vec<Value> = (1..=23).map(|i| json!({ "a": i })).collect();
        let options = GridOptions::default();
        let mut state = GridState::new(&options);
        state.set_page_size(10, &options);
        state.page = 5;

        let view = compute_view(&records, &columns(), &state, &options);
        assert!(view.is_empty());
        assert_eq!(view.clamp_to, Some(3));

        state.clamp_page(view.total_pages);
        let view = compute_view(&records, &columns(), &state, &options);
        assert_eq!(view.page, 3);
        assert_eq!(view.rows, vec![20, 21, 22]);
    }

    #[test]
    fn test_pagination_disabled_returns_everything() {
        let records: Vec<Value> = (1..=30).map(|i| json!({ "a": i })).collect();
        let options = GridOptions::default().with_pagination(false);
        let state = GridState::new(&options);

        let view = compute_view(&records, &columns(), &state, &options);
        assert_eq!(view.rows.len(), 30);
        assert_eq!((view.from, view.to), (1, 30));
    }

    #[test]
    fn test_empty_input() {
        let options = GridOptions::default();
        let state = GridState::new(&options);
        let view = compute_view(&[] as &[Value], &columns(), &state, &options);
        assert_eq!((view.total, view.total_pages, view.from, view.to), (0, 1, 0, 0));
    }

    #[test]
    fn test_non_array_json_is_empty() {
        let options = GridOptions::default();
        let state = GridState::new(&options);
        let view = compute_view_json(&json!({ "a": 1 }), &columns(), &state, &options);
        assert_eq!(view.total, 0);

        let view = compute_view_json(&json!([{ "a": 1 }]), &columns(), &state, &options);
        assert_eq!(view.total, 1);
    }

    #[test]
    fn test_recomputation_is_idempotent() {
        let records = vec![json!({ "a": "b" }), json!({ "a": "a" })];
        let snapshot = records.clone();
        let options = GridOptions::default();
        let mut state = GridState::new(&options);
        state.toggle_sort("a");

        let first = compute_view(&records, &columns(), &state, &options);
        let second = compute_view(&records, &columns(), &state, &options);
        assert_eq!(first, second);
        assert_eq!(records, snapshot);
    }
}
