//! Grid feature flags and paging options.

use serde::Deserialize;
use serde::Serialize;

/// Default page-size choices.
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 3] = [10, 25, 50];

/// Default page size.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Grid-level configuration.
///
/// # Example
///
/// ```
/// use lodging_grid::GridOptions;
///
/// let options = GridOptions::default()
///     .with_frozen_column_count(1)
///     .with_page_size_options(vec![5, 10])
///     .with_default_page_size(5);
/// assert_eq!(options.default_page_size, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridOptions {
    /// Slice results into pages.
    ///
    /// Default: true
    pub enable_pagination: bool,

    /// Allow header clicks to sort.
    ///
    /// Default: true
    pub enable_sorting: bool,

    /// Show per-column filters.
    ///
    /// Default: true
    pub enable_filtering: bool,

    /// Number of leading columns pinned during horizontal scroll.
    ///
    /// Default: 0
    pub frozen_column_count: usize,

    /// Keep the header row pinned during vertical scroll.
    ///
    /// Default: true
    pub freeze_header: bool,

    /// Page sizes offered by the selector.
    ///
    /// Default: 10, 25, 50
    pub page_size_options: Vec<usize>,

    /// Initial page size, also the fallback for invalid selections.
    ///
    /// Default: 25
    pub default_page_size: usize,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            enable_pagination: true,
            enable_sorting: true,
            enable_filtering: true,
            frozen_column_count: 0,
            freeze_header: true,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl GridOptions {
    /// Enables or disables pagination.
    pub fn with_pagination(mut self, enabled: bool) -> Self {
        self.enable_pagination = enabled;
        self
    }

    /// Enables or disables sorting.
    pub fn with_sorting(mut self, enabled: bool) -> Self {
        self.enable_sorting = enabled;
        self
    }

    /// Enables or disables filtering.
    pub fn with_filtering(mut self, enabled: bool) -> Self {
        self.enable_filtering = enabled;
        self
    }

    /// Sets the number of frozen columns.
    pub fn with_frozen_column_count(mut self, count: usize) -> Self {
        self.frozen_column_count = count;
        self
    }

    /// Sets whether the header is frozen.
    pub fn with_freeze_header(mut self, frozen: bool) -> Self {
        self.freeze_header = frozen;
        self
    }

    /// Sets the page-size choices.
    pub fn with_page_size_options(mut self, options: Vec<usize>) -> Self {
        self.page_size_options = options;
        self
    }

    /// Sets the initial page size. Zero is ignored.
    pub fn with_default_page_size(mut self, size: usize) -> Self {
        if size > 0 {
            self.default_page_size = size;
        }
        self
    }

    /// Returns `size` if it is one of the offered choices, the default
    /// page size otherwise.
    pub fn resolve_page_size(&self, size: usize) -> usize {
        if size > 0 && self.page_size_options.contains(&size) {
            size
        } else {
            self.default_page_size.max(1)
        }
    }
}
