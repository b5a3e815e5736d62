//! Tabbed container: a one-row tab strip plus a client area showing the
//! current page.
//!
//! Pages keep their children alive whether or not they are the current
//! page; only the current page is visible and laid out into the client
//! area. Switching pages emits "switch_page" with the new page index.

use log::warn;

use crate::bridge::native::{HandleId, HandleKind};
use crate::object::class::{ChainPolicy, ClassDescriptor, SignalSpec};
use crate::object::instance::ObjectId;
use crate::object::signal::{SignalArgs, SignalShape, SignalValue};
use crate::render::{ellipsize, string_width, Style, Surface};
use crate::toolkit::Toolkit;
use crate::types::{Rect, Size};
use crate::widget::core::{self, ClassData, WidgetCore, WIDGET_CLASS};

/// Height of the tab strip in cells.
pub const TAB_STRIP_HEIGHT: i32 = 1;

pub struct Page {
    pub child: ObjectId,
    pub label: String,
    /// Native tab handle; pages on an unrealized notebook have none yet.
    pub handle: Option<HandleId>,
}

pub struct NotebookData {
    pub pages: Vec<Page>,
    pub current: usize,
}

impl NotebookData {
    /// Keep the current index inside the page list after removals. An
    /// empty notebook pins it at zero.
    pub fn clamp_current(&mut self) {
        if self.pages.is_empty() {
            self.current = 0;
        } else if self.current >= self.pages.len() {
            self.current = self.pages.len() - 1;
        }
    }
}

pub static NOTEBOOK_CLASS: ClassDescriptor = ClassDescriptor {
    name: "Notebook",
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
        SignalSpec {
            name: "switch_page",
            shape: SignalShape::Index,
            chain: ChainPolicy::Nearest,
            default_action: None,
        },
    ],
    native_handler: None,
};

pub fn notebook_new(tk: &mut Toolkit) -> ObjectId {
    tk.new_object(
        &NOTEBOOK_CLASS,
        Some(WidgetCore::default()),
        ClassData::Notebook(NotebookData {
            pages: Vec::new(),
            current: 0,
        }),
    )
}

fn notebook_data(tk: &Toolkit, id: ObjectId) -> Option<&NotebookData> {
    match tk.object(id).map(|o| &o.data) {
        Some(ClassData::Notebook(d)) => Some(d),
        _ => None,
    }
}

fn notebook_data_mut(tk: &mut Toolkit, id: ObjectId) -> Option<&mut NotebookData> {
    match tk.object_mut(id).map(|o| &mut o.data) {
        Some(ClassData::Notebook(d)) => Some(d),
        _ => None,
    }
}

/// Append a page and return its index. The first page becomes current;
/// every later page starts hidden.
pub fn append_page(tk: &mut Toolkit, nb: ObjectId, child: ObjectId, label: &str) -> usize {
    if !core::adopt(tk, nb, child) {
        return notebook_data(tk, nb).map(|d| d.pages.len()).unwrap_or(0);
    }
    let handle = if core::is_realized(tk, nb) {
        tk.handles.create(HandleKind::TabPage, Some(nb))
    } else {
        None
    };
    let Some(data) = notebook_data_mut(tk, nb) else {
        return 0;
    };
    data.pages.push(Page {
        child,
        label: label.to_string(),
        handle,
    });
    let index = data.pages.len() - 1;
    if index == data.current {
        core::show(tk, child);
    } else {
        core::hide(tk, child);
    }
    core::queue_resize(tk, nb);
    index
}

pub fn n_pages(tk: &Toolkit, id: ObjectId) -> usize {
    notebook_data(tk, id).map(|d| d.pages.len()).unwrap_or(0)
}

pub fn current_page(tk: &Toolkit, id: ObjectId) -> usize {
    notebook_data(tk, id).map(|d| d.current).unwrap_or(0)
}

pub fn current_page_child(tk: &Toolkit, id: ObjectId) -> Option<ObjectId> {
    notebook_data(tk, id).and_then(|d| d.pages.get(d.current).map(|p| p.child))
}

/// Switch to `index`. Out-of-range requests are logged and ignored.
/// Hides the outgoing page, shows the incoming one, lays it out into
/// the client area, then emits "switch_page".
pub fn set_current_page(tk: &mut Toolkit, id: ObjectId, index: usize) {
    let Some(data) = notebook_data(tk, id) else {
        return;
    };
    if index >= data.pages.len() {
        warn!(
            "set_current_page: index {index} out of range ({} pages)",
            data.pages.len()
        );
        return;
    }
    if index == data.current {
        return;
    }
    let old = data.pages[data.current].child;
    let new = data.pages[index].child;
    if let Some(data) = notebook_data_mut(tk, id) {
        data.current = index;
    }
    core::hide(tk, old);
    core::show(tk, new);

    let alloc = tk.widget(id).map(|w| w.allocation).unwrap_or(Rect::ZERO);
    if !alloc.is_empty() {
        core::set_allocation(tk, new, client_area(alloc));
    }
    tk.emit(id, "switch_page", SignalArgs::Index(index));
}

/// Realize: the notebook gets a control handle, then every page appended
/// before realization gets its tab handle.
fn realize_default(tk: &mut Toolkit, id: ObjectId, _args: &SignalArgs) -> Option<SignalValue> {
    core::attach_handle(tk, id, HandleKind::Control);
    realize_pages(tk, id);
    None
}

/// Create tab handles for pages appended before the notebook realized.
fn realize_pages(tk: &mut Toolkit, id: ObjectId) {
    let missing: Vec<usize> = notebook_data(tk, id)
        .map(|d| {
            d.pages
                .iter()
                .enumerate()
                .filter(|(_, p)| p.handle.is_none())
                .map(|(i, _)| i)
                .collect()
        })
        .unwrap_or_default();
    for index in missing {
        let handle = tk.handles.create(HandleKind::TabPage, Some(id));
        if let Some(data) = notebook_data_mut(tk, id) {
            if let Some(page) = data.pages.get_mut(index) {
                page.handle = handle;
            }
        }
    }
}

pub(crate) fn release_page_handles(tk: &mut Toolkit, id: ObjectId) {
    let handles: Vec<HandleId> = notebook_data(tk, id)
        .map(|d| d.pages.iter().filter_map(|p| p.handle).collect())
        .unwrap_or_default();
    for h in handles {
        tk.handles.release(h);
    }
}

// =============================================================================
// Size request & allocation
// =============================================================================

fn client_area(rect: Rect) -> Rect {
    Rect::new(
        rect.x,
        rect.y + TAB_STRIP_HEIGHT,
        rect.width,
        (rect.height - TAB_STRIP_HEIGHT).max(0),
    )
}

/// Requisition is the max over all pages (current or not) plus the tab
/// strip, so switching pages never forces a toplevel resize.
pub fn size_request(tk: &mut Toolkit, id: ObjectId) -> Size {
    let children: Vec<ObjectId> = notebook_data(tk, id)
        .map(|d| d.pages.iter().map(|p| p.child).collect())
        .unwrap_or_default();
    let mut width = 0;
    let mut height = 0;
    for child in children {
        let req = core::size_request(tk, child);
        width = width.max(req.width);
        height = height.max(req.height);
    }
    Size::new(width, height + TAB_STRIP_HEIGHT)
}

fn set_size_default(tk: &mut Toolkit, id: ObjectId, args: &SignalArgs) -> Option<SignalValue> {
    if let Some(rect) = args.as_rect() {
        allocate(tk, id, rect);
    }
    None
}

pub fn allocate(tk: &mut Toolkit, id: ObjectId, rect: Rect) {
    if let Some(child) = current_page_child(tk, id) {
        core::set_allocation(tk, child, client_area(rect));
    }
}

// =============================================================================
// Tab strip drawing
// =============================================================================

/// Draw the tab strip. The current tab is rendered bold; labels wider
/// than the remaining strip are ellipsized.
pub fn draw_tabs(tk: &Toolkit, surface: &mut Surface, id: ObjectId, clip: Rect) {
    let Some(data) = notebook_data(tk, id) else {
        return;
    };
    let alloc = tk.widget(id).map(|w| w.allocation).unwrap_or(Rect::ZERO);
    if alloc.is_empty() {
        return;
    }
    let mut x = alloc.x;
    let right = alloc.right();
    for (i, page) in data.pages.iter().enumerate() {
        let remaining = right - x;
        if remaining <= 0 {
            break;
        }
        let style = if i == data.current {
            Style::default().bold()
        } else {
            Style::default()
        };
        let cell = format!(" {} ", ellipsize(&page.label, (remaining - 2).max(1)));
        surface.draw_text(x, alloc.y, &cell, clip, style);
        x += string_width(&cell);
    }
}
