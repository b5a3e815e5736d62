//! Split-pane container: exactly two child slots and a draggable divider.
//!
//! The divider position is a percentage (0-100, clamped). Requisition is
//! each child's cross-axis max plus along-axis sum plus a fixed handle
//! thickness; allocation splits the along-axis extent by the percentage,
//! reserving the handle between the regions. During a drag the new
//! percentage is live-previewed as a ghost divider and committed on
//! release.

use crate::object::class::{ChainPolicy, ClassDescriptor, SignalSpec};
use crate::object::instance::ObjectId;
use crate::object::signal::{SignalArgs, SignalShape, SignalValue};
use crate::render::{Style, Surface};
use crate::toolkit::Toolkit;
use crate::types::{Orientation, Point, Rect, Size};
use crate::widget::core::{self, ClassData, WidgetCore, WIDGET_CLASS};

/// Divider thickness in cells.
pub const HANDLE_SIZE: i32 = 1;

pub struct PanedData {
    pub orientation: Orientation,
    /// Two optional slots; ownership of whatever sits in them.
    pub children: [Option<ObjectId>; 2],
    /// Divider position as a percentage of the along-axis extent.
    pub position: i32,
    /// Live drag preview, if a drag is in progress.
    pub ghost: Option<i32>,
}

pub static PANED_CLASS: ClassDescriptor = ClassDescriptor {
    name: "Paned",
    parent: Some(&WIDGET_CLASS),
    signals: &[SignalSpec {
        name: "set_size",
        shape: SignalShape::Rect,
        chain: ChainPolicy::Nearest,
        default_action: Some(set_size_default),
    }],
    native_handler: None,
};

pub fn paned_new(tk: &mut Toolkit, orientation: Orientation) -> ObjectId {
    tk.new_object(
        &PANED_CLASS,
        Some(WidgetCore::default()),
        ClassData::Paned(PanedData {
            orientation,
            children: [None, None],
            position: 50,
            ghost: None,
        }),
    )
}

fn paned_data(tk: &Toolkit, id: ObjectId) -> Option<&PanedData> {
    match tk.object(id).map(|o| &o.data) {
        Some(ClassData::Paned(d)) => Some(d),
        _ => None,
    }
}

fn paned_data_mut(tk: &mut Toolkit, id: ObjectId) -> Option<&mut PanedData> {
    match tk.object_mut(id).map(|o| &mut o.data) {
        Some(ClassData::Paned(d)) => Some(d),
        _ => None,
    }
}

/// Put a child in the first (left/top) slot.
pub fn add1(tk: &mut Toolkit, paned: ObjectId, child: ObjectId) {
    add_slot(tk, paned, child, 0);
}

/// Put a child in the second (right/bottom) slot.
pub fn add2(tk: &mut Toolkit, paned: ObjectId, child: ObjectId) {
    add_slot(tk, paned, child, 1);
}

fn add_slot(tk: &mut Toolkit, paned: ObjectId, child: ObjectId, slot: usize) {
    if paned_data(tk, paned).is_none_or(|d| d.children[slot].is_some()) {
        return;
    }
    if !core::adopt(tk, paned, child) {
        return;
    }
    if let Some(data) = paned_data_mut(tk, paned) {
        data.children[slot] = Some(child);
    }
    core::queue_resize(tk, paned);
}

/// Set the divider percentage, clamped to 0-100, and re-lay-out.
pub fn set_position(tk: &mut Toolkit, id: ObjectId, percent: i32) {
    if let Some(data) = paned_data_mut(tk, id) {
        data.position = percent.clamp(0, 100);
    }
    let alloc = tk.widget(id).map(|w| w.allocation).unwrap_or(Rect::ZERO);
    if !alloc.is_empty() {
        allocate(tk, id, alloc);
    }
}

pub fn position(tk: &Toolkit, id: ObjectId) -> i32 {
    paned_data(tk, id).map(|d| d.position).unwrap_or(0)
}

// =============================================================================
// Size request & allocation
// =============================================================================

pub fn size_request(tk: &mut Toolkit, id: ObjectId) -> Size {
    let Some(data) = paned_data(tk, id) else {
        return Size::ZERO;
    };
    let orientation = data.orientation;
    let children: Vec<ObjectId> = data
        .children
        .iter()
        .flatten()
        .copied()
        .filter(|c| core::is_visible(tk, *c))
        .collect();

    let mut main = HANDLE_SIZE;
    let mut cross = 0;
    for child in children {
        let req = core::size_request(tk, child);
        match orientation {
            Orientation::Horizontal => {
                main += req.width;
                cross = cross.max(req.height);
            }
            Orientation::Vertical => {
                main += req.height;
                cross = cross.max(req.width);
            }
        }
    }
    match orientation {
        Orientation::Horizontal => Size::new(main, cross),
        Orientation::Vertical => Size::new(cross, main),
    }
}

fn set_size_default(tk: &mut Toolkit, id: ObjectId, args: &SignalArgs) -> Option<SignalValue> {
    if let Some(rect) = args.as_rect() {
        allocate(tk, id, rect);
    }
    None
}

pub fn allocate(tk: &mut Toolkit, id: ObjectId, rect: Rect) {
    let Some(data) = paned_data(tk, id) else {
        return;
    };
    let orientation = data.orientation;
    let position = data.position;
    let first = data.children[0].filter(|c| core::is_visible(tk, *c));
    let second = data.children[1].filter(|c| core::is_visible(tk, *c));

    // A lone child gets the whole rectangle; no divider is reserved.
    let (a, b) = match (first, second) {
        (Some(only), None) | (None, Some(only)) => {
            core::set_allocation(tk, only, rect);
            return;
        }
        (None, None) => return,
        (Some(a), Some(b)) => (a, b),
    };

    let main = match orientation {
        Orientation::Horizontal => rect.width,
        Orientation::Vertical => rect.height,
    };
    let avail = (main - HANDLE_SIZE).max(0);
    let first_extent = (avail * position / 100).clamp(0, avail);
    let second_extent = avail - first_extent;

    match orientation {
        Orientation::Horizontal => {
            core::set_allocation(tk, a, Rect::new(rect.x, rect.y, first_extent, rect.height));
            core::set_allocation(
                tk,
                b,
                Rect::new(
                    rect.x + first_extent + HANDLE_SIZE,
                    rect.y,
                    second_extent,
                    rect.height,
                ),
            );
        }
        Orientation::Vertical => {
            core::set_allocation(tk, a, Rect::new(rect.x, rect.y, rect.width, first_extent));
            core::set_allocation(
                tk,
                b,
                Rect::new(
                    rect.x,
                    rect.y + first_extent + HANDLE_SIZE,
                    rect.width,
                    second_extent,
                ),
            );
        }
    }
}

// =============================================================================
// Divider dragging
// =============================================================================

/// Percentage corresponding to a pointer position inside the pane's
/// allocated rectangle.
fn percent_at(orientation: Orientation, alloc: Rect, p: Point) -> i32 {
    let (offset, extent) = match orientation {
        Orientation::Horizontal => (p.x - alloc.x, alloc.width),
        Orientation::Vertical => (p.y - alloc.y, alloc.height),
    };
    if extent <= HANDLE_SIZE {
        return 0;
    }
    (offset * 100 / (extent - HANDLE_SIZE)).clamp(0, 100)
}

pub fn drag_begin(tk: &mut Toolkit, id: ObjectId) {
    let current = position(tk, id);
    if let Some(data) = paned_data_mut(tk, id) {
        data.ghost = Some(current);
    }
}

/// Update the ghost divider from the pointer. No child is re-laid-out
/// until commit.
pub fn drag_update(tk: &mut Toolkit, id: ObjectId, p: Point) {
    let alloc = tk.widget(id).map(|w| w.allocation).unwrap_or(Rect::ZERO);
    if let Some(data) = paned_data_mut(tk, id) {
        if data.ghost.is_some() {
            data.ghost = Some(percent_at(data.orientation, alloc, p));
        }
    }
}

/// Commit the drag: the ghost percentage becomes the real position.
pub fn drag_commit(tk: &mut Toolkit, id: ObjectId) {
    let ghost = paned_data_mut(tk, id).and_then(|d| d.ghost.take());
    if let Some(pct) = ghost {
        set_position(tk, id, pct);
    }
}

pub fn ghost_position(tk: &Toolkit, id: ObjectId) -> Option<i32> {
    paned_data(tk, id).and_then(|d| d.ghost)
}

/// Draw the divider; during a drag the ghost divider is drawn reversed
/// at the preview position.
pub fn draw_handle(tk: &Toolkit, surface: &mut Surface, id: ObjectId, clip: Rect) {
    let Some(data) = paned_data(tk, id) else {
        return;
    };
    let alloc = tk.widget(id).map(|w| w.allocation).unwrap_or(Rect::ZERO);
    if alloc.is_empty() {
        return;
    }
    let pct = data.ghost.unwrap_or(data.position);
    let style = if data.ghost.is_some() {
        // Ghost rectangle: inverted so the preview reads against any
        // background.
        Style::new(
            crossterm::style::Color::Black,
            crossterm::style::Color::White,
        )
    } else {
        Style::default()
    };
    match data.orientation {
        Orientation::Horizontal => {
            let avail = (alloc.width - HANDLE_SIZE).max(0);
            let x = alloc.x + (avail * pct / 100).clamp(0, avail);
            for y in alloc.y..alloc.bottom() {
                surface.draw_text(x, y, "│", clip, style);
            }
        }
        Orientation::Vertical => {
            let avail = (alloc.height - HANDLE_SIZE).max(0);
            let y = alloc.y + (avail * pct / 100).clamp(0, avail);
            surface.draw_hline(alloc.x, y, alloc.width, clip, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::core::{set_size_request, show, widget_new};

    fn child_sized(tk: &mut Toolkit, w: i32, h: i32) -> ObjectId {
        let id = widget_new(tk);
        set_size_request(tk, id, w, h);
        show(tk, id);
        id
    }

    #[test]
    fn position_clamps_to_percentage_range() {
        let mut tk = Toolkit::new();
        let p = paned_new(&mut tk, Orientation::Horizontal);
        set_position(&mut tk, p, 150);
        assert_eq!(position(&tk, p), 100);
        set_position(&mut tk, p, -20);
        assert_eq!(position(&tk, p), 0);
    }

    #[test]
    fn fifty_percent_splits_evenly_minus_handle() {
        let mut tk = Toolkit::new();
        let p = paned_new(&mut tk, Orientation::Horizontal);
        let a = child_sized(&mut tk, 100, 10);
        let b = child_sized(&mut tk, 100, 10);
        add1(&mut tk, p, a);
        add2(&mut tk, p, b);
        set_position(&mut tk, p, 50);

        core::size_request(&mut tk, p);
        core::set_allocation(&mut tk, p, Rect::new(0, 0, 81, 10));

        let wa = tk.widget(a).unwrap().allocation;
        let wb = tk.widget(b).unwrap().allocation;
        assert_eq!(wa.width, 40);
        assert_eq!(wb.width, 40);
        assert_eq!(wb.x, wa.width + HANDLE_SIZE);
    }

    #[test]
    fn requisition_sums_along_axis_plus_handle() {
        let mut tk = Toolkit::new();
        let p = paned_new(&mut tk, Orientation::Vertical);
        let a = child_sized(&mut tk, 30, 5);
        let b = child_sized(&mut tk, 20, 7);
        add1(&mut tk, p, a);
        add2(&mut tk, p, b);

        let req = core::size_request(&mut tk, p);
        assert_eq!(req, Size::new(30, 5 + 7 + HANDLE_SIZE));
    }

    #[test]
    fn lone_child_gets_everything() {
        let mut tk = Toolkit::new();
        let p = paned_new(&mut tk, Orientation::Horizontal);
        let a = child_sized(&mut tk, 10, 2);
        add1(&mut tk, p, a);

        core::size_request(&mut tk, p);
        core::set_allocation(&mut tk, p, Rect::new(0, 0, 50, 4));
        assert_eq!(tk.widget(a).unwrap().allocation, Rect::new(0, 0, 50, 4));
    }

    #[test]
    fn drag_previews_then_commits() {
        let mut tk = Toolkit::new();
        let p = paned_new(&mut tk, Orientation::Horizontal);
        let a = child_sized(&mut tk, 10, 2);
        let b = child_sized(&mut tk, 10, 2);
        add1(&mut tk, p, a);
        add2(&mut tk, p, b);

        core::size_request(&mut tk, p);
        core::set_allocation(&mut tk, p, Rect::new(0, 0, 101, 4));

        drag_begin(&mut tk, p);
        drag_update(&mut tk, p, Point::new(25, 1));
        // Live preview, original position untouched.
        assert_eq!(ghost_position(&tk, p), Some(25));
        assert_eq!(position(&tk, p), 50);

        drag_commit(&mut tk, p);
        assert_eq!(ghost_position(&tk, p), None);
        assert_eq!(position(&tk, p), 25);
        assert_eq!(tk.widget(a).unwrap().allocation.width, 25);
    }

    #[test]
    fn drag_update_without_begin_is_ignored() {
        let mut tk = Toolkit::new();
        let p = paned_new(&mut tk, Orientation::Horizontal);
        drag_update(&mut tk, p, Point::new(10, 0));
        assert_eq!(ghost_position(&tk, p), None);
    }
}
