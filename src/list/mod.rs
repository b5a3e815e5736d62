//! Owner-drawn list: typed row model, column view, draw pass.

pub mod model;
pub mod render;
pub mod view;

pub use model::{CellValue, ColumnType, ListModel, RowId};
pub use view::{view_new, ColumnWidth, ListViewData, ViewColumn, LISTVIEW_CLASS};
