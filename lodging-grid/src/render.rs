//! Render model and plain-text output.
//!
//! [`RenderedGrid`] is a framework-neutral description of what the grid
//! shows. Hosts draw it however they like; [`RenderedGrid::render_text`]
//! draws it as a plain-text table.

use std::fmt;
use std::fmt::Write as _;

use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::state::SortDirection;
use crate::sticky::StickyPosition;

/// Hint shown in every filter popup.
pub const FILTER_HINT: &str = "Enter minimum 3 characters to search.";

/// Placeholder row text for an empty result.
pub const EMPTY_MESSAGE: &str = "No records found.";

/// Sort state shown next to a sortable header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortIndicator {
    Unsorted,
    Ascending,
    Descending,
}

impl SortIndicator {
    /// Returns the indicator for a column given the current sort.
    pub fn for_column(sorted: bool, direction: SortDirection) -> Self {
        match (sorted, direction) {
            (false, _) => Self::Unsorted,
            (true, SortDirection::Ascending) => Self::Ascending,
            (true, SortDirection::Descending) => Self::Descending,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Unsorted => "↕",
            Self::Ascending => "↑",
            Self::Descending => "↓",
        }
    }
}

/// Filter button on a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterAffordance {
    /// Button title, e.g. `Filter Guest`.
    pub title: String,
    /// The popup for this column is open.
    pub open: bool,
    /// A filter long enough to apply is set.
    pub applied: bool,
}

/// One header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub key: String,
    pub label: String,
    pub width: Option<u16>,
    /// Clicking the header toggles sorting.
    pub clickable: bool,
    pub sort: Option<SortIndicator>,
    pub filter: Option<FilterAffordance>,
    pub sticky: Option<StickyPosition>,
}

/// The open filter popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPopup {
    pub column_key: String,
    /// Input placeholder, e.g. `Search Guest`.
    pub placeholder: String,
    /// Current input text.
    pub value: String,
    pub hint: &'static str,
}

/// Identity of a rendered row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    /// From the host's key resolver.
    Custom(String),
    /// From the record's conventional identifier field.
    Field(String),
    /// Position within the current page.
    Index(usize),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(key) | Self::Field(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{}", index),
        }
    }
}

/// One body cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCell {
    pub text: String,
    pub sticky: Option<StickyPosition>,
}

/// One body row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub key: RowKey,
    /// Index of the record in the grid's data.
    pub record_index: usize,
    pub class_name: String,
    pub clickable: bool,
    pub cells: Vec<RenderedCell>,
}

/// Table body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedBody {
    Rows(Vec<RenderedRow>),
    /// Single placeholder row spanning `colspan` columns.
    Empty { message: &'static str, colspan: usize },
}

/// Pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavButton {
    pub label: &'static str,
    pub title: &'static str,
    pub enabled: bool,
}

/// Pagination footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    /// `Showing {from}-{to} of {total} records`
    pub summary: String,
    /// `Page {page} of {pages}`
    pub page_label: String,
    pub first: NavButton,
    pub prev: NavButton,
    pub next: NavButton,
    pub last: NavButton,
    pub page_size: usize,
    /// Selector entries as `(size, label)`.
    pub page_size_options: Vec<(usize, String)>,
}

impl Footer {
    /// Builds the footer for a view.
    pub fn new(
        from: usize,
        to: usize,
        total: usize,
        page: usize,
        total_pages: usize,
        page_size: usize,
        options: &[usize],
    ) -> Self {
        let at_start = page <= 1;
        let at_end = page >= total_pages;
        Self {
            summary: format!("Showing {}-{} of {} records", from, to, total),
            page_label: format!("Page {} of {}", page, total_pages),
            first: NavButton {
                label: "«",
                title: "First page",
                enabled: !at_start,
            },
            prev: NavButton {
                label: "‹",
                title: "Previous page",
                enabled: !at_start,
            },
            next: NavButton {
                label: "›",
                title: "Next page",
                enabled: !at_end,
            },
            last: NavButton {
                label: "»",
                title: "Last page",
                enabled: !at_end,
            },
            page_size,
            page_size_options: options.iter().map(|n| (*n, format!("{} records", n))).collect(),
        }
    }
}

/// Everything the grid shows for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedGrid {
    pub headers: Vec<HeaderCell>,
    pub freeze_header: bool,
    pub popup: Option<FilterPopup>,
    pub body: RenderedBody,
    /// Present when pagination is enabled.
    pub footer: Option<Footer>,
}

impl RenderedGrid {
    /// Returns the body rows, empty for the placeholder.
    pub fn rows(&self) -> &[RenderedRow] {
        match &self.body {
            RenderedBody::Rows(rows) => rows,
            RenderedBody::Empty { .. } => &[],
        }
    }

    /// Width of each column when drawn as text.
    ///
    /// A width hint fixes the column width; otherwise the widest of the
    /// header and the cells wins.
    pub fn text_column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| match header.width {
                Some(hint) => usize::from(hint).max(1),
                None => self
                    .rows()
                    .iter()
                    .filter_map(|row| row.cells.get(i))
                    .map(|cell| cell.text.width())
                    .fold(header_text(header).width(), usize::max),
            })
            .collect()
    }

    /// Draws the grid as a plain-text table.
    pub fn render_text(&self) -> String {
        let widths = self.text_column_widths();
        let border = border_line(&widths);
        let mut out = String::new();

        if let Some(popup) = &self.popup {
            let input = if popup.value.is_empty() {
                format!("<{}>", popup.placeholder)
            } else {
                popup.value.clone()
            };
            let _ = writeln!(out, "Filter [{}]: {}  {}  [Clear] [Done]", popup.column_key, input, popup.hint);
        }

        out.push_str(&border);
        let labels: Vec<String> = self.headers.iter().map(header_text).collect();
        out.push_str(&row_line(&labels, &widths));
        out.push_str(&border);

        match &self.body {
            RenderedBody::Rows(rows) => {
                for row in rows {
                    let cells: Vec<String> = row.cells.iter().map(|c| c.text.clone()).collect();
                    out.push_str(&row_line(&cells, &widths));
                }
            }
            RenderedBody::Empty { message, .. } => {
                let inner = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
                let _ = writeln!(out, "| {} |", fit(message, inner.max(message.width())));
            }
        }
        out.push_str(&border);

        if let Some(footer) = &self.footer {
            let nav: Vec<&str> = [footer.first, footer.prev, footer.next, footer.last]
                .iter()
                .map(|b| if b.enabled { b.label } else { " " })
                .collect();
            let _ = writeln!(
                out,
                "{}    {}  [{}]  {} records",
                footer.summary,
                footer.page_label,
                nav.join(" "),
                footer.page_size
            );
        }

        out
    }
}

fn header_text(header: &HeaderCell) -> String {
    let mut text = header.label.clone();
    if let Some(sort) = header.sort {
        text.push(' ');
        text.push_str(sort.symbol());
    }
    if let Some(filter) = &header.filter {
        text.push_str(match (filter.open, filter.applied) {
            (true, _) => " [F]",
            (false, true) => " [f*]",
            (false, false) => " [f]",
        });
    }
    text
}

fn border_line(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

fn row_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (i, width) in widths.iter().enumerate() {
        let text = cells.get(i).map_or("", String::as_str);
        line.push(' ');
        line.push_str(&fit(text, *width));
        line.push_str(" |");
    }
    line.push('\n');
    line
}

/// Pads `text` to `width` display cells, truncating with `…` if needed.
fn fit(text: &str, width: usize) -> String {
    let text_width = text.width();
    if text_width <= width {
        return format!("{}{}", text, " ".repeat(width - text_width));
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}
