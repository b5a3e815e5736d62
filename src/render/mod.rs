//! Drawing support: the cell-grid surface and text measurement.

pub mod surface;
pub mod text;

pub use surface::{Cell, Style, Surface};
pub use text::{clip, ellipsize, string_width};
