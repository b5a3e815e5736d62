//! Widget classes: lifecycle core, toplevel windows, leaf controls.

pub mod controls;
pub mod core;
pub mod window;

pub use controls::{
    button_new, label_new, progress_new, separator_new, toggle_new, BUTTON_CLASS, LABEL_CLASS,
    PROGRESS_CLASS, SEPARATOR_CLASS, TOGGLE_CLASS,
};
pub use core::{ClassData, WidgetCore, WidgetKind, WIDGET_CLASS};
pub use window::{window_new, WindowData, WINDOW_CLASS};
