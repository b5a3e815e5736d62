//! Widget lifecycle: Unrealized → Realized → {Visible, Hidden} → Destroyed.
//!
//! A widget is an object with a [`WidgetCore`]: optional native handle,
//! requisition (desired size, bottom-up), allocation (granted rectangle,
//! top-down), an application-forced minimum, and a weak back-reference to
//! its parent. Ownership flows parent→child only.
//!
//! Requisition and draw dispatch switch on the concrete widget kind;
//! signal fan-out and default actions go through the class chain.

use log::warn;

use crate::accel::AccelKey;
use crate::bridge::native::{HandleId, HandleKind};
use crate::layout::{box_layout, notebook, paned, table};
use crate::list;
use crate::object::class::{ChainPolicy, ClassDescriptor, SignalSpec, OBJECT_CLASS};
use crate::object::instance::ObjectId;
use crate::object::signal::{SignalArgs, SignalShape, SignalValue};
use crate::render::Surface;
use crate::toolkit::Toolkit;
use crate::types::{Rect, Size, StateFlags};
use crate::widget::{controls, window};

// =============================================================================
// Per-widget state
// =============================================================================

/// Widget-level state carried by every class under Widget.
#[derive(Default)]
pub struct WidgetCore {
    /// Native handle, present only while realized (and only if creation
    /// succeeded; a handle-less realized widget degrades to no-ops).
    pub handle: Option<HandleId>,
    /// Self-reported desired size, computed bottom-up.
    pub requisition: Size,
    /// Rectangle the parent actually granted, computed top-down.
    pub allocation: Rect,
    /// Application-forced minimum size.
    pub size_request: Option<Size>,
    /// Weak back-reference; the parent owns this widget, never the
    /// reverse.
    pub parent: Option<ObjectId>,
}

/// Concrete-class payload.
pub enum ClassData {
    Object,
    Widget,
    Window(window::WindowData),
    Box(box_layout::BoxData),
    Table(table::TableData),
    Paned(paned::PanedData),
    Notebook(notebook::NotebookData),
    Label(controls::LabelData),
    Button(controls::ButtonData),
    Toggle(controls::ToggleData),
    Progress(controls::ProgressData),
    Separator(controls::SeparatorData),
    ListView(list::view::ListViewData),
}

/// Cheap discriminant for dispatch without borrowing the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Object,
    Widget,
    Window,
    Box,
    Table,
    Paned,
    Notebook,
    Label,
    Button,
    Toggle,
    Progress,
    Separator,
    ListView,
}

impl ClassData {
    pub fn kind(&self) -> WidgetKind {
        match self {
            ClassData::Object => WidgetKind::Object,
            ClassData::Widget => WidgetKind::Widget,
            ClassData::Window(_) => WidgetKind::Window,
            ClassData::Box(_) => WidgetKind::Box,
            ClassData::Table(_) => WidgetKind::Table,
            ClassData::Paned(_) => WidgetKind::Paned,
            ClassData::Notebook(_) => WidgetKind::Notebook,
            ClassData::Label(_) => WidgetKind::Label,
            ClassData::Button(_) => WidgetKind::Button,
            ClassData::Toggle(_) => WidgetKind::Toggle,
            ClassData::Progress(_) => WidgetKind::Progress,
            ClassData::Separator(_) => WidgetKind::Separator,
            ClassData::ListView(_) => WidgetKind::ListView,
        }
    }
}

// =============================================================================
// Widget class
// =============================================================================

pub static WIDGET_CLASS: ClassDescriptor = ClassDescriptor {
    name: "Widget",
    parent: Some(&OBJECT_CLASS),
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
            default_action: None,
        },
        SignalSpec {
            name: "show",
            shape: SignalShape::None,
            chain: ChainPolicy::Nearest,
            default_action: None,
        },
        SignalSpec {
            name: "hide",
            shape: SignalShape::None,
            chain: ChainPolicy::Nearest,
            default_action: None,
        },
        SignalSpec {
            name: "activate",
            shape: SignalShape::None,
            chain: ChainPolicy::Nearest,
            default_action: None,
        },
    ],
    native_handler: None,
};

/// Default realize: create a plain control handle and install the
/// user-data back-pointer the event bridge relies on.
fn realize_default(tk: &mut Toolkit, id: ObjectId, _args: &SignalArgs) -> Option<SignalValue> {
    attach_handle(tk, id, HandleKind::Control);
    None
}

/// Create a native handle of `kind` for `id` and point its user-data slot
/// back at the widget. On creation failure the widget is simply left
/// without a handle.
pub(crate) fn attach_handle(tk: &mut Toolkit, id: ObjectId, kind: HandleKind) {
    if tk.widget(id).is_none_or(|w| w.handle.is_some()) {
        return;
    }
    match tk.handles.create(kind, Some(id)) {
        Some(handle) => {
            if let Some(w) = tk.widget_mut(id) {
                w.handle = Some(handle);
            }
        }
        None => {
            warn!("realize: native handle creation failed for {id:?}; widget degrades to no-ops");
        }
    }
}

/// A bare Widget-class instance. Reports a zero requisition until the
/// application forces one with `set_size_request`.
pub fn widget_new(tk: &mut Toolkit) -> ObjectId {
    tk.new_object(&WIDGET_CLASS, Some(WidgetCore::default()), ClassData::Widget)
}

// =============================================================================
// Lifecycle transitions
// =============================================================================

pub fn is_visible(tk: &Toolkit, id: ObjectId) -> bool {
    tk.flags(id).contains(StateFlags::VISIBLE)
}

pub fn is_realized(tk: &Toolkit, id: ObjectId) -> bool {
    tk.flags(id).contains(StateFlags::REALIZED)
}

/// Realize: create native resources, then realize visible descendants.
/// No-op if already realized.
pub fn realize(tk: &mut Toolkit, id: ObjectId) {
    let flags = tk.flags(id);
    if flags.intersects(StateFlags::REALIZED | StateFlags::DESTROYED) {
        return;
    }
    tk.emit(id, "realize", SignalArgs::None);
    if let Some(obj) = tk.object_mut(id) {
        obj.flags.insert(StateFlags::REALIZED);
    }
    register_mnemonic(tk, id);
    for child in container_children(tk, id) {
        if is_visible(tk, child) {
            realize(tk, child);
        }
    }
    queue_resize(tk, id);
}

/// A mnemonic carried by the widget's label becomes a live key in the
/// owning window's accelerator table.
pub(crate) fn register_mnemonic(tk: &mut Toolkit, id: ObjectId) {
    let Some(key) = controls::mnemonic(tk, id) else {
        return;
    };
    let Some(top) = toplevel_of(tk, id) else {
        return;
    };
    window::add_accelerator(tk, top, AccelKey::plain(key), id);
}

/// Show: set the visible flag. A yet-unrealized toplevel realizes and
/// places itself lazily on first show.
pub fn show(tk: &mut Toolkit, id: ObjectId) {
    let flags = tk.flags(id);
    if flags.contains(StateFlags::DESTROYED) {
        return;
    }
    if !flags.contains(StateFlags::VISIBLE) {
        if let Some(obj) = tk.object_mut(id) {
            obj.flags.insert(StateFlags::VISIBLE);
        }
        tk.emit(id, "show", SignalArgs::None);
    }
    if flags.contains(StateFlags::TOPLEVEL) {
        if !is_realized(tk, id) {
            realize(tk, id);
        }
        let bounds = tk.surface.bounds();
        size_request(tk, id);
        set_allocation(tk, id, bounds);
    } else {
        // Widgets shown under an already-realized toplevel realize now.
        if !is_realized(tk, id) && toplevel_of(tk, id).is_some_and(|t| is_realized(tk, t)) {
            realize(tk, id);
        }
        queue_resize(tk, id);
    }
}

/// Show this widget and every structural descendant, descendants first.
pub fn show_all(tk: &mut Toolkit, id: ObjectId) {
    for child in container_children(tk, id) {
        show_all(tk, child);
    }
    show(tk, id);
}

pub fn hide(tk: &mut Toolkit, id: ObjectId) {
    if !tk.flags(id).contains(StateFlags::VISIBLE) {
        return;
    }
    if let Some(obj) = tk.object_mut(id) {
        obj.flags.remove(StateFlags::VISIBLE);
    }
    tk.emit(id, "hide", SignalArgs::None);
    queue_resize(tk, id);
}

/// Hide this widget and every structural descendant, descendants first.
pub fn hide_all(tk: &mut Toolkit, id: ObjectId) {
    for child in container_children(tk, id) {
        hide_all(tk, child);
    }
    hide(tk, id);
}

/// Force a minimum size. The requisition reported to the parent is the
/// max of the natural size and this request, per axis.
pub fn set_size_request(tk: &mut Toolkit, id: ObjectId, width: i32, height: i32) {
    if let Some(w) = tk.widget_mut(id) {
        w.size_request = Some(Size::new(width.max(0), height.max(0)));
    }
    queue_resize(tk, id);
}

// =============================================================================
// Requisition & allocation
// =============================================================================

/// Compute and store this widget's requisition, bottom-up.
pub fn size_request(tk: &mut Toolkit, id: ObjectId) -> Size {
    let Some(obj) = tk.object(id) else {
        return Size::ZERO;
    };
    let kind = obj.data.kind();

    let mut req = match kind {
        WidgetKind::Object | WidgetKind::Widget => Size::ZERO,
        WidgetKind::Window => window::size_request(tk, id),
        WidgetKind::Box => box_layout::size_request(tk, id),
        WidgetKind::Table => table::size_request(tk, id),
        WidgetKind::Paned => paned::size_request(tk, id),
        WidgetKind::Notebook => notebook::size_request(tk, id),
        WidgetKind::Label => controls::label_size_request(tk, id),
        WidgetKind::Button | WidgetKind::Toggle => controls::button_size_request(tk, id),
        WidgetKind::Progress => controls::progress_size_request(tk, id),
        WidgetKind::Separator => controls::separator_size_request(tk, id),
        WidgetKind::ListView => list::view::size_request(tk, id),
    };

    if let Some(min) = tk.widget(id).and_then(|w| w.size_request) {
        req.width = req.width.max(min.width);
        req.height = req.height.max(min.height);
    }
    if let Some(w) = tk.widget_mut(id) {
        w.requisition = req;
    }
    req
}

/// Grant `rect` to the widget and emit "set_size". Container default
/// actions recompute child rectangles and recurse. Negative extents are
/// clamped before anything sees them.
pub fn set_allocation(tk: &mut Toolkit, id: ObjectId, rect: Rect) {
    let rect = Rect {
        x: rect.x,
        y: rect.y,
        width: rect.width.max(0),
        height: rect.height.max(0),
    };
    let Some(w) = tk.widget_mut(id) else {
        return;
    };
    w.allocation = rect;
    tk.emit(id, "set_size", SignalArgs::Rect(rect));
}

/// Propagate a size change to the owning toplevel and re-lay-out from
/// there, if it is already on screen.
pub fn queue_resize(tk: &mut Toolkit, id: ObjectId) {
    let top = toplevel_of(tk, id);
    let Some(top) = top else {
        return;
    };
    if !is_realized(tk, top) || !is_visible(tk, top) {
        return;
    }
    let alloc = tk
        .widget(top)
        .map(|w| w.allocation)
        .filter(|r| !r.is_empty())
        .unwrap_or(tk.surface.bounds());
    size_request(tk, top);
    set_allocation(tk, top, alloc);
}

/// Nearest ancestor flagged TOPLEVEL (possibly the widget itself).
pub fn toplevel_of(tk: &Toolkit, id: ObjectId) -> Option<ObjectId> {
    let mut cursor = Some(id);
    while let Some(c) = cursor {
        if tk.flags(c).contains(StateFlags::TOPLEVEL) {
            return Some(c);
        }
        cursor = tk.widget(c).and_then(|w| w.parent);
    }
    None
}

// =============================================================================
// Container plumbing
// =============================================================================

/// Structural children of a container, in layout order. Leaves come back
/// empty.
pub fn container_children(tk: &Toolkit, id: ObjectId) -> Vec<ObjectId> {
    let Some(obj) = tk.object(id) else {
        return Vec::new();
    };
    match &obj.data {
        ClassData::Box(data) => data.children.iter().map(|c| c.widget).collect(),
        ClassData::Table(data) => data.children.iter().map(|c| c.widget).collect(),
        ClassData::Paned(data) => data.children.iter().flatten().copied().collect(),
        ClassData::Notebook(data) => data.pages.iter().map(|p| p.child).collect(),
        ClassData::Window(data) => data.child.into_iter().collect(),
        _ => Vec::new(),
    }
}

/// Remove `child` from `parent`'s structural list and clear the child's
/// back-reference. Called from destruction and from explicit removal.
pub fn detach_child(tk: &mut Toolkit, parent: ObjectId, child: ObjectId) {
    if let Some(obj) = tk.object_mut(parent) {
        match &mut obj.data {
            ClassData::Box(data) => data.children.retain(|c| c.widget != child),
            ClassData::Table(data) => data.children.retain(|c| c.widget != child),
            ClassData::Paned(data) => {
                for slot in &mut data.children {
                    if *slot == Some(child) {
                        *slot = None;
                    }
                }
            }
            ClassData::Notebook(data) => {
                data.pages.retain(|p| p.child != child);
                data.clamp_current();
            }
            ClassData::Window(data) => {
                if data.child == Some(child) {
                    data.child = None;
                }
            }
            _ => {}
        }
    }
    if let Some(w) = tk.widget_mut(child) {
        if w.parent == Some(parent) {
            w.parent = None;
        }
    }
}

/// Install the parent back-reference when a container adopts a child.
/// Adopting an already-parented widget is a logged no-op.
pub(crate) fn adopt(tk: &mut Toolkit, parent: ObjectId, child: ObjectId) -> bool {
    let Some(w) = tk.widget_mut(child) else {
        warn!("adopt: {child:?} is not a widget");
        return false;
    };
    if let Some(existing) = w.parent {
        warn!("adopt: {child:?} already has parent {existing:?}");
        return false;
    }
    w.parent = Some(parent);
    true
}

// =============================================================================
// Drawing
// =============================================================================

/// Owner-draw dispatch: render this widget and its visible descendants
/// into `surface`, clipped to `clip`.
pub fn draw_widget(tk: &Toolkit, surface: &mut Surface, id: ObjectId, clip: Rect) {
    if !is_visible(tk, id) {
        return;
    }
    let Some(obj) = tk.object(id) else {
        return;
    };
    let alloc = obj.widget.as_ref().map(|w| w.allocation).unwrap_or(Rect::ZERO);
    let clip = clip.intersect(&alloc);
    if clip.is_empty() {
        return;
    }

    match obj.data.kind() {
        WidgetKind::Label => controls::draw_label(tk, surface, id, clip),
        WidgetKind::Button | WidgetKind::Toggle => controls::draw_button(tk, surface, id, clip),
        WidgetKind::Progress => controls::draw_progress(tk, surface, id, clip),
        WidgetKind::Separator => controls::draw_separator(tk, surface, id, clip),
        WidgetKind::ListView => list::render::draw_view(tk, surface, id, clip),
        WidgetKind::Paned => {
            paned::draw_handle(tk, surface, id, clip);
            for child in container_children(tk, id) {
                draw_widget(tk, surface, child, clip);
            }
        }
        WidgetKind::Notebook => {
            notebook::draw_tabs(tk, surface, id, clip);
            if let Some(current) = notebook::current_page_child(tk, id) {
                draw_widget(tk, surface, current, clip);
            }
        }
        _ => {
            for child in container_children(tk, id) {
                draw_widget(tk, surface, child, clip);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::Toolkit;

    #[test]
    fn realize_is_idempotent() {
        let mut tk = Toolkit::new();
        let w = widget_new(&mut tk);
        realize(&mut tk, w);
        let first = tk.widget(w).unwrap().handle;
        assert!(first.is_some());
        realize(&mut tk, w);
        assert_eq!(tk.widget(w).unwrap().handle, first);
    }

    #[test]
    fn realized_handle_points_back_at_widget() {
        let mut tk = Toolkit::new();
        let w = widget_new(&mut tk);
        realize(&mut tk, w);
        let handle = tk.widget(w).unwrap().handle.unwrap();
        assert_eq!(tk.handles.user_data(handle), Some(w));
    }

    #[test]
    fn show_hide_toggle_visible_flag() {
        let mut tk = Toolkit::new();
        let w = widget_new(&mut tk);
        assert!(!is_visible(&tk, w));
        show(&mut tk, w);
        assert!(is_visible(&tk, w));
        hide(&mut tk, w);
        assert!(!is_visible(&tk, w));
    }

    #[test]
    fn forced_minimum_raises_requisition() {
        let mut tk = Toolkit::new();
        let w = widget_new(&mut tk);
        assert_eq!(size_request(&mut tk, w), Size::ZERO);
        set_size_request(&mut tk, w, 12, 3);
        assert_eq!(size_request(&mut tk, w), Size::new(12, 3));
    }

    #[test]
    fn negative_allocation_clamps_to_zero() {
        let mut tk = Toolkit::new();
        let w = widget_new(&mut tk);
        set_allocation(&mut tk, w, Rect::new(0, 0, -5, -2));
        let alloc = tk.widget(w).unwrap().allocation;
        assert_eq!(alloc.width, 0);
        assert_eq!(alloc.height, 0);
    }

    #[test]
    fn destroy_releases_native_handle() {
        let mut tk = Toolkit::new();
        let w = widget_new(&mut tk);
        realize(&mut tk, w);
        let handle = tk.widget(w).unwrap().handle.unwrap();
        tk.destroy(w);
        assert_eq!(tk.handles.user_data(handle), None);
    }
}
