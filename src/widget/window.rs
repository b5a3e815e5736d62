//! Toplevel window: owns one child, a title, and the accelerator table
//! for its subtree.
//!
//! A window realizes lazily on first show, fills the terminal surface,
//! and hands its whole client rectangle to the child. Closing is a
//! query: "delete" handlers may veto by returning true, otherwise the
//! window is destroyed.

use crate::accel::{AccelKey, AccelTable};
use crate::bridge::native::HandleKind;
use crate::object::class::{ChainPolicy, ClassDescriptor, SignalSpec};
use crate::object::instance::ObjectId;
use crate::object::signal::{SignalArgs, SignalShape, SignalValue};
use crate::toolkit::Toolkit;
use crate::types::{Size, StateFlags};
use crate::widget::core::{self, ClassData, WidgetCore, WIDGET_CLASS};

pub struct WindowData {
    pub title: String,
    pub child: Option<ObjectId>,
    pub accel: AccelTable,
}

pub static WINDOW_CLASS: ClassDescriptor = ClassDescriptor {
    name: "Window",
    parent: Some(&WIDGET_CLASS),
    signals: &[
        SignalSpec {
            name: "realize",
            shape: SignalShape::None,
            chain: ChainPolicy::Nearest,
            default_action: Some(realize_default),
        },
        SignalSpec {
            name: "set_size",
            shape: SignalShape::Rect,
            chain: ChainPolicy::Nearest,
            default_action: Some(set_size_default),
        },
        // Close query. A handler returning true vetoes the close.
        SignalSpec {
            name: "delete",
            shape: SignalShape::None,
            chain: ChainPolicy::Nearest,
            default_action: None,
        },
    ],
    native_handler: None,
};

fn realize_default(tk: &mut Toolkit, id: ObjectId, _args: &SignalArgs) -> Option<SignalValue> {
    core::attach_handle(tk, id, HandleKind::Window);
    None
}

fn set_size_default(tk: &mut Toolkit, id: ObjectId, args: &SignalArgs) -> Option<SignalValue> {
    if let (Some(rect), Some(child)) = (args.as_rect(), child(tk, id)) {
        core::set_allocation(tk, child, rect);
    }
    None
}

/// Create a toplevel window and register it with the toolkit.
pub fn window_new(tk: &mut Toolkit, title: &str) -> ObjectId {
    let id = tk.new_object(
        &WINDOW_CLASS,
        Some(WidgetCore::default()),
        ClassData::Window(WindowData {
            title: title.to_string(),
            child: None,
            accel: AccelTable::default(),
        }),
    );
    if let Some(obj) = tk.object_mut(id) {
        obj.flags.insert(StateFlags::TOPLEVEL);
    }
    tk.register_window(id);
    id
}

fn window_data(tk: &Toolkit, id: ObjectId) -> Option<&WindowData> {
    match tk.object(id).map(|o| &o.data) {
        Some(ClassData::Window(d)) => Some(d),
        _ => None,
    }
}

fn window_data_mut(tk: &mut Toolkit, id: ObjectId) -> Option<&mut WindowData> {
    match tk.object_mut(id).map(|o| &mut o.data) {
        Some(ClassData::Window(d)) => Some(d),
        _ => None,
    }
}

pub fn set_title(tk: &mut Toolkit, id: ObjectId, title: &str) {
    if let Some(data) = window_data_mut(tk, id) {
        data.title = title.to_string();
    }
}

pub fn title(tk: &Toolkit, id: ObjectId) -> Option<&str> {
    window_data(tk, id).map(|d| d.title.as_str())
}

pub fn child(tk: &Toolkit, id: ObjectId) -> Option<ObjectId> {
    window_data(tk, id).and_then(|d| d.child)
}

/// Install the window's single child. A second child is refused until
/// the first is removed.
pub fn set_child(tk: &mut Toolkit, id: ObjectId, new_child: ObjectId) {
    if window_data(tk, id).is_none_or(|d| d.child.is_some()) {
        return;
    }
    if !core::adopt(tk, id, new_child) {
        return;
    }
    if let Some(data) = window_data_mut(tk, id) {
        data.child = Some(new_child);
    }
    core::queue_resize(tk, id);
}

/// The window asks for whatever its child asks for.
pub fn size_request(tk: &mut Toolkit, id: ObjectId) -> Size {
    match child(tk, id).filter(|c| core::is_visible(tk, *c)) {
        Some(c) => core::size_request(tk, c),
        None => Size::ZERO,
    }
}

/// Run the close query. Destroys the window unless a "delete" handler
/// vetoes.
pub fn close(tk: &mut Toolkit, id: ObjectId) {
    let vetoed = tk
        .emit(id, "delete", SignalArgs::None)
        .is_some_and(|v| v.as_bool());
    if !vetoed {
        tk.destroy(id);
    }
}

// =============================================================================
// Accelerators
// =============================================================================

/// Bind `key` to `target` in this window's table; a matching key emits
/// "activate" on the target. Rebinding a key shadows the older entry.
pub fn add_accelerator(tk: &mut Toolkit, id: ObjectId, key: AccelKey, target: ObjectId) {
    if let Some(data) = window_data_mut(tk, id) {
        data.accel.add(key, target);
    }
}

/// Drop every binding aimed at `target`.
pub fn remove_accelerator_target(tk: &mut Toolkit, id: ObjectId, target: ObjectId) {
    if let Some(data) = window_data_mut(tk, id) {
        data.accel.remove_target(target);
    }
}

/// Match a key against the window's table and fire the bound target.
/// Returns whether the key was consumed.
pub fn activate_accel(tk: &mut Toolkit, id: ObjectId, key: AccelKey) -> bool {
    let Some(target) = window_data(tk, id).and_then(|d| d.accel.match_key(key)) else {
        return false;
    };
    if !tk.is_alive(target) {
        if let Some(data) = window_data_mut(tk, id) {
            data.accel.remove_target(target);
        }
        return false;
    }
    tk.emit(target, "activate", SignalArgs::None);
    true
}
