//! Generic tabular data grid.
//!
//! Filters, sorts and paginates an arbitrary record collection described by
//! column descriptors, and produces a render model with optional frozen
//! columns. Pure and synchronous; the host owns all I/O.

pub mod column;
pub mod options;
pub mod record;
pub mod render;
pub mod state;
pub mod sticky;
pub mod value;
pub mod view;

mod grid;

pub use column::Column;
pub use grid::*;
pub use options::GridOptions;
pub use record::GridRecord;
pub use render::RenderedGrid;
pub use render::RowKey;
pub use state::GridState;
pub use state::SortDirection;
pub use value::CellValue;
pub use view::GridView;
pub use view::compute_view;
pub use view::compute_view_json;
