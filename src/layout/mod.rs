//! Geometry managers: box packing, table grid, split panes, tabbed pages.

pub mod box_layout;
pub mod notebook;
pub mod paned;
pub mod table;

pub use box_layout::{box_new, hbox_new, pack_start, vbox_new, BoxData, BOX_CLASS};
pub use notebook::{append_page, notebook_new, set_current_page, NotebookData, NOTEBOOK_CLASS};
pub use paned::{add1, add2, paned_new, set_position, PanedData, PANED_CLASS};
pub use table::{attach, table_new, TableData, TABLE_CLASS};
