//! # cinder-tui
//!
//! A portable widget runtime for the terminal.
//!
//! Widgets are objects in a single-inheritance class registry; behavior
//! flows through signals (connected handlers first, class default actions
//! last) instead of virtual methods. Geometry is negotiated in two passes:
//! requisition bottom-up, allocation top-down.
//!
//! ## Architecture
//!
//! ```text
//! terminal events → NativeMessage → dispatch → signals → default actions
//!                                                   ↘ layout → draw → Surface
//! ```
//!
//! The whole runtime hangs off one [`Toolkit`] value; nothing is ambient,
//! so every subsystem is testable without a live terminal.
//!
//! ## Modules
//!
//! - [`object`] - class registry, instances, signal dispatch
//! - [`widget`] - lifecycle core, windows, leaf controls
//! - [`layout`] - box packing, table grid, panes, notebook
//! - [`list`] - owner-drawn list model and view
//! - [`bridge`] - native handles, event translation, sources, the loop
//! - [`render`] - cell surface and text measurement
//! - [`accel`] - keyboard accelerators and mnemonics

pub mod accel;
pub mod bridge;
pub mod error;
pub mod layout;
pub mod list;
pub mod object;
pub mod render;
pub mod toolkit;
pub mod types;
pub mod widget;

pub use types::*;

pub use error::{Error, Result};
pub use toolkit::Toolkit;

pub use object::{
    ChainPolicy, ClassDescriptor, HandlerId, SignalArgs, SignalShape, SignalValue, SignalSpec,
    ObjectId, OBJECT_CLASS,
};

pub use widget::{
    button_new, label_new, progress_new, separator_new, toggle_new, window_new, ClassData,
    WidgetCore, WidgetKind, BUTTON_CLASS, LABEL_CLASS, PROGRESS_CLASS, SEPARATOR_CLASS,
    TOGGLE_CLASS, WIDGET_CLASS, WINDOW_CLASS,
};

pub use layout::{
    box_new, hbox_new, notebook_new, paned_new, table_new, vbox_new, BOX_CLASS, NOTEBOOK_CLASS,
    PANED_CLASS, TABLE_CLASS,
};

pub use list::{view_new, CellValue, ColumnType, ColumnWidth, ListModel, RowId, ViewColumn,
    LISTVIEW_CLASS};

pub use bridge::{
    dispatch, run, run_nested, CommandCode, Continue, HandleId, HandleKind, IoCondition,
    NativeMessage, NotifyCode, SourceId, TerminalSession,
};

pub use accel::{strip_mnemonic, AccelKey, AccelTable};

pub use render::{Cell, Style, Surface};
