//! Interactive grid state: sort, filters, paging and the open filter popup.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::options::GridOptions;

/// Filters shorter than this (after trimming) are ignored.
pub const MIN_FILTER_CHARS: usize = 3;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Returns the opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Current sort column and direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    /// Column key, or `None` for input order.
    pub key: Option<String>,
    pub direction: SortDirection,
}

/// Returns the trimmed filter text if it is long enough to apply.
pub fn active_filter(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (trimmed.chars().count() >= MIN_FILTER_CHARS).then_some(trimmed)
}

/// State owned by one grid instance.
///
/// Nothing here is derived from or written back to the records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridState {
    pub sort: SortConfig,
    /// Pending filter text per column key.
    pub filters: BTreeMap<String, String>,
    /// 1-based page index.
    pub page: usize,
    pub page_size: usize,
    /// Key of the column whose filter popup is open.
    pub open_filter: Option<String>,
}

impl GridState {
    /// Creates the initial state for `options`.
    pub fn new(options: &GridOptions) -> Self {
        Self {
            sort: SortConfig::default(),
            filters: BTreeMap::new(),
            page: 1,
            page_size: options.default_page_size.max(1),
            open_filter: None,
        }
    }

    /// Sorts by `key`, flipping the direction if it is already the sort key.
    pub fn toggle_sort(&mut self, key: &str) {
        if self.sort.key.as_deref() == Some(key) {
            self.sort.direction = self.sort.direction.toggled();
        } else {
            self.sort = SortConfig {
                key: Some(key.to_string()),
                direction: SortDirection::Ascending,
            };
        }
        log::trace!("sort {:?}", self.sort);
    }

    /// Returns the pending filter text for `key`.
    pub fn filter(&self, key: &str) -> &str {
        self.filters.get(key).map_or("", String::as_str)
    }

    /// Returns the applied filter for `key`, if any.
    pub fn active_filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).and_then(|raw| active_filter(raw))
    }

    /// Sets the filter text for `key`. Returns to page 1 when paginating.
    pub fn set_filter(&mut self, key: &str, value: impl Into<String>, options: &GridOptions) {
        self.filters.insert(key.to_string(), value.into());
        if options.enable_pagination {
            self.page = 1;
        }
    }

    /// Opens the popup for `key`, closing any other; closes it if it is
    /// already open.
    pub fn toggle_filter_popup(&mut self, key: &str) {
        if self.open_filter.as_deref() == Some(key) {
            self.open_filter = None;
        } else {
            self.open_filter = Some(key.to_string());
        }
    }

    /// Clears the filter for `key` and closes the popup.
    pub fn clear_filter(&mut self, key: &str, options: &GridOptions) {
        self.set_filter(key, "", options);
        self.close_filter_popup();
    }

    /// Closes the popup, keeping the filter text.
    pub fn close_filter_popup(&mut self) {
        self.open_filter = None;
    }

    /// Handles the Escape key. Returns `true` if a popup was closed.
    pub fn handle_escape(&mut self) -> bool {
        self.open_filter.take().is_some()
    }

    /// Changes the page size and returns to page 1.
    ///
    /// Sizes that are not offered fall back to the default page size.
    pub fn set_page_size(&mut self, size: usize, options: &GridOptions) {
        self.page_size = options.resolve_page_size(size);
        self.page = 1;
    }

    /// Number of pages for `total` records, at least 1.
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size.max(1)).max(1)
    }

    pub fn first_page(&mut self) {
        self.page = 1;
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.page = (self.page + 1).min(total_pages.max(1));
    }

    pub fn last_page(&mut self, total_pages: usize) {
        self.page = total_pages.max(1);
    }

    /// Returns to page 1 (new data).
    pub fn reset_page(&mut self) {
        self.page = 1;
    }

    /// Moves down to `total_pages` if the page overflows. Returns `true` if
    /// the page changed.
    pub fn clamp_page(&mut self, total_pages: usize) -> bool {
        let total_pages = total_pages.max(1);
        if self.page > total_pages {
            log::debug!("clamping page {} to {}", self.page, total_pages);
            self.page = total_pages;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_sort() {
        let mut state = GridState::new(&GridOptions::default());
        state.toggle_sort("name");
        assert_eq!(state.sort.key.as_deref(), Some("name"));
        assert_eq!(state.sort.direction, SortDirection::Ascending);

        state.toggle_sort("name");
        assert_eq!(state.sort.direction, SortDirection::Descending);

        state.toggle_sort("email");
        assert_eq!(state.sort.key.as_deref(), Some("email"));
        assert_eq!(state.sort.direction, SortDirection::Ascending);
    }

    #[test]
    fn test_filter_threshold() {
        assert_eq!(active_filter("al"), None);
        assert_eq!(active_filter("  al  "), None);
        assert_eq!(active_filter(" ali "), Some("ali"));
        assert_eq!(active_filter("çağ"), Some("çağ"));
    }

    #[test]
    fn test_set_filter_resets_page() {
        let options = GridOptions::default();
        let mut state = GridState::new(&options);
        state.page = 3;
        state.set_filter("name", "ali", &options);
        assert_eq!(state.page, 1);

        let unpaged = GridOptions::default().with_pagination(false);
        state.page = 3;
        state.set_filter("name", "alin", &unpaged);
        assert_eq!(state.page, 3);
    }

    #[test]
    fn test_single_popup() {
        let options = GridOptions::default();
        let mut state = GridState::new(&options);

        state.toggle_filter_popup("name");
        state.toggle_filter_popup("email");
        assert_eq!(state.open_filter.as_deref(), Some("email"));

        state.toggle_filter_popup("email");
        assert_eq!(state.open_filter, None);
    }

    #[test]
    fn test_clear_and_done() {
        let options = GridOptions::default();
        let mut state = GridState::new(&options);

        state.toggle_filter_popup("name");
        state.set_filter("name", "ali", &options);
        state.close_filter_popup();
        assert_eq!(state.filter("name"), "ali");
        assert_eq!(state.open_filter, None);

        state.toggle_filter_popup("name");
        state.clear_filter("name", &options);
        assert_eq!(state.filter("name"), "");
        assert_eq!(state.open_filter, None);
    }

    #[test]
    fn test_escape_closes_popup() {
        let mut state = GridState::new(&GridOptions::default());
        assert!(!state.handle_escape());
        state.toggle_filter_popup("name");
        assert!(state.handle_escape());
        assert_eq!(state.open_filter, None);
    }

    #[test]
    fn test_paging() {
        let options = GridOptions::default();
        let mut state = GridState::new(&options);
        state.set_page_size(10, &options);
        assert_eq!(state.total_pages(23), 3);
        assert_eq!(state.total_pages(0), 1);

        state.prev_page();
        assert_eq!(state.page, 1);
        state.next_page(3);
        state.next_page(3);
        state.next_page(3);
        assert_eq!(state.page, 3);
        state.first_page();
        state.last_page(3);
        assert_eq!(state.page, 3);

        state.set_page_size(50, &options);
        assert_eq!((state.page, state.page_size), (1, 50));
        state.set_page_size(13, &options);
        assert_eq!(state.page_size, 25);
    }

    #[test]
    fn test_clamp_page() {
        let mut state = GridState::new(&GridOptions::default());
        state.page = 5;
        assert!(state.clamp_page(3));
        assert_eq!(state.page, 3);
        assert!(!state.clamp_page(3));
    }
}
