//! End-to-end tests of the DataGrid over JSON records.

use std::sync::Arc;
use std::sync::Mutex;

use serde_json::Value;
use serde_json::json;

use lodging_grid::CellValue;
use lodging_grid::Column;
use lodging_grid::DataGrid;
use lodging_grid::GridOptions;
use lodging_grid::RowKey;
use lodging_grid::SortDirection;
use lodging_grid::render::EMPTY_MESSAGE;
use lodging_grid::render::FILTER_HINT;
use lodging_grid::render::RenderedBody;

const FIRST_NAMES: [&str; 14] = [
    "Alice", "Bob", "Khalid", "Natalia", "Omar", "Priya", "Ali", "Chen", "Rosalind", "Mateo",
    "Salim", "Valentina", "Yusuf", "Dalia",
];
const LAST_NAMES: [&str; 3] = ["Smith", "Kowalski", "Tan"];

fn employees() -> Vec<Value> {
    (0..42)
        .map(|i| {
            let name = format!("{} {}", FIRST_NAMES[i % 14], LAST_NAMES[i / 14]);
            json!({
                "id": 1000 + i,
                "name": name,
                "department": if i % 2 == 0 { "Front Desk" } else { "Housekeeping" },
                "shift": if i % 5 == 0 { Value::Null } else { json!(i % 3) },
            })
        })
        .collect()
}

fn columns() -> Vec<Column<Value>> {
    vec![
        Column::new("name", "Name").sortable().filterable(),
        Column::new("department", "Department").filterable(),
        Column::new("shift", "Shift").sortable(),
    ]
}

fn names(grid: &mut DataGrid<Value>) -> Vec<String> {
    let view = grid.view();
    view.rows
        .iter()
        .map(|&i| grid.records()[i]["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_employee_name_filter() {
    let records = employees();
    let expected: Vec<&Value> = records
        .iter()
        .filter(|r| r["name"].as_str().unwrap().to_lowercase().contains("ali"))
        .collect();
    // Alice, Khalid, Natalia, Ali, Rosalind, Salim, Dalia across three surnames
    assert_eq!(expected.len(), 21);

    let mut grid = DataGrid::new(columns(), records.clone());
    grid.set_filter("name", "ali");
    assert_eq!(grid.view().total, expected.len());

    // same set whatever the sort or page
    grid.click_header("shift");
    grid.click_header("shift");
    grid.set_page_size(10);
    grid.last_page();
    let view = grid.view();
    assert_eq!(view.total, expected.len());
    assert_eq!(view.page, 3);

    grid.set_page_size(50);
    let shown = names(&mut grid);
    assert_eq!(shown.len(), expected.len());
    assert!(shown.iter().all(|n| n.to_lowercase().contains("ali")));
}

#[test]
fn test_header_click_requires_sortable() {
    let mut grid = DataGrid::new(columns(), employees());
    assert!(!grid.click_header("department"));
    assert!(!grid.click_header("unknown"));
    assert!(grid.click_header("name"));
    assert_eq!(grid.state().sort.key.as_deref(), Some("name"));

    let names = names(&mut grid);
    let mut sorted = names.clone();
    sorted.sort_by_key(|n| n.to_lowercase());
    assert_eq!(names, sorted);

    let mut unsortable = DataGrid::new(columns(), employees())
        .with_options(GridOptions::default().with_sorting(false));
    assert!(!unsortable.click_header("name"));
    assert!(unsortable.render().headers.iter().all(|h| h.sort.is_none() && !h.clickable));
}

#[test]
fn test_sort_indicators() {
    let mut grid = DataGrid::new(columns(), employees());
    grid.click_header("name");
    grid.click_header("name");
    assert_eq!(grid.state().sort.direction, SortDirection::Descending);

    let rendered = grid.render();
    let symbols: Vec<Option<&str>> = rendered
        .headers
        .iter()
        .map(|h| h.sort.map(|s| s.symbol()))
        .collect();
    assert_eq!(symbols, vec![Some("↓"), None, Some("↕")]);
}

#[test]
fn test_page_clamps_after_data_shrinks() {
    let mut grid = DataGrid::new(columns(), employees());
    grid.set_page_size(10);
    grid.last_page();
    assert_eq!(grid.state().page, 5);

    grid.set_data(employees().into_iter().take(23).collect());
    assert_eq!(grid.state().page, 1);

    grid.go_to_page(5);
    assert_eq!(grid.state().page, 3);
    let view = grid.view();
    assert_eq!(view.rows, vec![20, 21, 22]);
    assert_eq!((view.from, view.to, view.total), (21, 23, 23));
}

#[test]
fn test_filter_popup_flow() {
    let mut grid = DataGrid::new(columns(), employees());

    assert!(!grid.toggle_filter("shift"));
    assert!(grid.toggle_filter("name"));
    assert!(grid.toggle_filter("department"));
    assert_eq!(grid.state().open_filter.as_deref(), Some("department"));

    grid.set_filter("department", "front");
    let rendered = grid.render();
    let popup = rendered.popup.as_ref().unwrap();
    assert_eq!(popup.placeholder, "Search Department");
    assert_eq!(popup.value, "front");
    assert_eq!(popup.hint, FILTER_HINT);
    let affordance = rendered.headers[1].filter.as_ref().unwrap();
    assert!(affordance.open && affordance.applied);
    assert_eq!(affordance.title, "Filter Department");

    grid.close_filter();
    assert_eq!(grid.view().total, 21);

    grid.toggle_filter("department");
    assert!(grid.handle_escape());
    assert!(grid.render().popup.is_none());

    grid.toggle_filter("department");
    grid.clear_filter("department");
    assert_eq!(grid.state().open_filter, None);
    assert_eq!(grid.view().total, 42);
}

#[test]
fn test_empty_placeholder_spans_columns() {
    let mut grid = DataGrid::new(columns(), employees());
    grid.set_filter("name", "zzzz");

    let rendered = grid.render();
    assert_eq!(
        rendered.body,
        RenderedBody::Empty {
            message: EMPTY_MESSAGE,
            colspan: 3
        }
    );
    let footer = rendered.footer.unwrap();
    assert_eq!(footer.summary, "Showing 0-0 of 0 records");
    assert_eq!(footer.page_label, "Page 1 of 1");
    assert!(!footer.next.enabled && !footer.prev.enabled);
    assert!(grid.render_text().contains(EMPTY_MESSAGE));
}

#[test]
fn test_row_keys() {
    let records = vec![
        json!({ "__key": "a", "id": 1 }),
        json!({ "Id": 7 }),
        json!({ "name": "no id" }),
    ];
    let mut grid = DataGrid::new(columns(), records.clone());
    let keys: Vec<RowKey> = grid.render().rows().iter().map(|r| r.key.clone()).collect();
    assert_eq!(
        keys,
        vec![
            RowKey::Field("a".to_string()),
            RowKey::Field("7".to_string()),
            RowKey::Index(2)
        ]
    );

    let mut custom = DataGrid::new(columns(), records)
        .row_key(|r: &Value, i| format!("row-{}-{}", i, r["name"].as_str().unwrap_or("-")));
    assert_eq!(custom.render().rows()[2].key.to_string(), "row-2-no id");
}

#[test]
fn test_row_callbacks() {
    let clicked = Arc::new(Mutex::new(Vec::new()));
    let sink = clicked.clone();
    let mut grid = DataGrid::new(columns(), employees())
        .with_options(GridOptions::default().with_default_page_size(10))
        .row_class_name(|r: &Value, _| {
            if r["shift"].is_null() { "unassigned".to_string() } else { String::new() }
        })
        .on_row_click(move |r: &Value| sink.lock().unwrap().push(r["id"].clone()));

    grid.next_page();
    assert!(grid.click_row(0));
    assert!(!grid.click_row(99));
    assert_eq!(*clicked.lock().unwrap(), vec![json!(1010)]);

    let rendered = grid.render();
    assert!(rendered.rows().iter().all(|r| r.clickable));
    assert_eq!(rendered.rows()[0].class_name, "unassigned");
    assert_eq!(rendered.rows()[1].class_name, "");
}

#[test]
fn test_frozen_columns() {
    let mut grid = DataGrid::new(columns(), employees())
        .with_options(GridOptions::default().with_frozen_column_count(2));

    grid.measure_headers(&[150, 90, 60]);
    let rendered = grid.render();
    let lefts: Vec<Option<u32>> = rendered.headers.iter().map(|h| h.sticky.map(|s| s.left)).collect();
    assert_eq!(lefts, vec![Some(0), Some(150), None]);
    assert_eq!(rendered.rows()[0].cells[1].sticky.map(|s| s.z_index), Some(5));

    // a resize without host measurement falls back to the text layout
    grid.resize();
    assert!(grid.sticky().is_dirty());
    let rendered = grid.render();
    assert!(!grid.sticky().is_dirty());
    let widths = rendered.text_column_widths();
    assert_eq!(rendered.headers[1].sticky.unwrap().left as usize, widths[0] + 3);
}

#[test]
fn test_custom_accessor_and_render() {
    let columns: Vec<Column<Value>> = vec![
        Column::new("rate", "Rate")
            .sortable()
            .accessor(|r: &Value| CellValue::from_json(&r["pricing"]["rate"]))
            .render(|r: &Value| format!("${}", r["pricing"]["rate"])),
    ];
    let records = vec![
        json!({ "pricing": { "rate": 120 } }),
        json!({ "pricing": { "rate": 95 } }),
    ];
    let mut grid = DataGrid::new(columns, records);
    grid.click_header("rate");

    let rendered = grid.render();
    let cells: Vec<&str> = rendered.rows().iter().map(|r| r.cells[0].text.as_str()).collect();
    assert_eq!(cells, vec!["$95", "$120"]);
}

#[test]
fn test_render_text_layout() {
    let records = vec![json!({ "id": 1, "name": "Ali", "department": "Front Desk", "shift": 1 })];
    let mut grid = DataGrid::new(columns(), records);

    let text = grid.render_text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], lines[2]);
    assert!(lines[1].contains("Name ↕ [f]"));
    assert!(lines[3].contains("| Ali "));
    assert!(text.contains("Showing 1-1 of 1 records"));
    assert!(text.contains("Page 1 of 1"));
}
