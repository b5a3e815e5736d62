//! Linear box container: children packed along one axis.
//!
//! Two passes. The size-request pass sums visible children's requested
//! extents along the box axis (homogeneous boxes take the max and
//! multiply by child count) plus spacing and border. The allocation pass
//! divides `allocation - requisition` evenly among expanding children;
//! "fill" children consume their full allotted share, others are centered
//! within it. A deficit is clipped at the container boundary instead of
//! producing negative sizes. Invisible children are excluded from both
//! passes entirely.

use crate::object::class::{ChainPolicy, ClassDescriptor, SignalSpec};
use crate::object::instance::ObjectId;
use crate::object::signal::{SignalArgs, SignalShape, SignalValue};
use crate::toolkit::Toolkit;
use crate::types::{Orientation, PackOptions, Rect, Size};
use crate::widget::core::{self, ClassData, WidgetCore, WIDGET_CLASS};

// =============================================================================
// Data & class
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct BoxChild {
    pub widget: ObjectId,
    pub options: PackOptions,
}

pub struct BoxData {
    pub orientation: Orientation,
    pub spacing: i32,
    pub homogeneous: bool,
    pub border: i32,
    pub children: Vec<BoxChild>,
}

pub static BOX_CLASS: ClassDescriptor = ClassDescriptor {
    name: "Box",
    parent: Some(&WIDGET_CLASS),
    signals: &[SignalSpec {
        name: "set_size",
        shape: SignalShape::Rect,
        chain: ChainPolicy::Nearest,
        default_action: Some(set_size_default),
    }],
    native_handler: None,
};

pub fn box_new(
    tk: &mut Toolkit,
    orientation: Orientation,
    homogeneous: bool,
    spacing: i32,
) -> ObjectId {
    tk.new_object(
        &BOX_CLASS,
        Some(WidgetCore::default()),
        ClassData::Box(BoxData {
            orientation,
            spacing: spacing.max(0),
            homogeneous,
            border: 0,
            children: Vec::new(),
        }),
    )
}

pub fn hbox_new(tk: &mut Toolkit, homogeneous: bool, spacing: i32) -> ObjectId {
    box_new(tk, Orientation::Horizontal, homogeneous, spacing)
}

pub fn vbox_new(tk: &mut Toolkit, homogeneous: bool, spacing: i32) -> ObjectId {
    box_new(tk, Orientation::Vertical, homogeneous, spacing)
}

pub fn set_border(tk: &mut Toolkit, id: ObjectId, border: i32) {
    if let Some(ClassData::Box(data)) = tk.object_mut(id).map(|o| &mut o.data) {
        data.border = border.max(0);
    }
    core::queue_resize(tk, id);
}

/// Append a child with pack options. The box owns the child from here on.
pub fn pack_start(
    tk: &mut Toolkit,
    boxw: ObjectId,
    child: ObjectId,
    expand: bool,
    fill: bool,
    padding: i32,
) {
    if !core::adopt(tk, boxw, child) {
        return;
    }
    if let Some(ClassData::Box(data)) = tk.object_mut(boxw).map(|o| &mut o.data) {
        data.children.push(BoxChild {
            widget: child,
            options: PackOptions::new(expand, fill, padding.max(0)),
        });
    }
    core::queue_resize(tk, boxw);
}

// =============================================================================
// Geometry helpers
// =============================================================================

fn main_of(orientation: Orientation, size: Size) -> i32 {
    match orientation {
        Orientation::Horizontal => size.width,
        Orientation::Vertical => size.height,
    }
}

fn cross_of(orientation: Orientation, size: Size) -> i32 {
    match orientation {
        Orientation::Horizontal => size.height,
        Orientation::Vertical => size.width,
    }
}

fn make_rect(orientation: Orientation, main_pos: i32, cross_pos: i32, main: i32, cross: i32) -> Rect {
    match orientation {
        Orientation::Horizontal => Rect::new(main_pos, cross_pos, main, cross),
        Orientation::Vertical => Rect::new(cross_pos, main_pos, cross, main),
    }
}

fn visible_children(tk: &Toolkit, id: ObjectId) -> Vec<BoxChild> {
    let Some(ClassData::Box(data)) = tk.object(id).map(|o| &o.data) else {
        return Vec::new();
    };
    data.children
        .iter()
        .copied()
        .filter(|c| core::is_visible(tk, c.widget))
        .collect()
}

fn box_props(tk: &Toolkit, id: ObjectId) -> (Orientation, i32, bool, i32) {
    match tk.object(id).map(|o| &o.data) {
        Some(ClassData::Box(data)) => (
            data.orientation,
            data.spacing,
            data.homogeneous,
            data.border,
        ),
        _ => (Orientation::Vertical, 0, false, 0),
    }
}

// =============================================================================
// Size request
// =============================================================================

pub fn size_request(tk: &mut Toolkit, id: ObjectId) -> Size {
    let (orientation, spacing, homogeneous, border) = box_props(tk, id);
    let children = visible_children(tk, id);

    let mut main = 0;
    let mut max_main = 0;
    let mut cross = 0;
    for child in &children {
        let req = core::size_request(tk, child.widget);
        let child_main = main_of(orientation, req) + 2 * child.options.padding;
        main += child_main;
        max_main = max_main.max(child_main);
        cross = cross.max(cross_of(orientation, req));
    }

    let count = children.len() as i32;
    if homogeneous {
        main = max_main * count;
    }
    if count > 1 {
        main += spacing * (count - 1);
    }

    let req_main = main + 2 * border;
    let req_cross = cross + 2 * border;
    match orientation {
        Orientation::Horizontal => Size::new(req_main, req_cross),
        Orientation::Vertical => Size::new(req_cross, req_main),
    }
}

// =============================================================================
// Allocation
// =============================================================================

fn set_size_default(tk: &mut Toolkit, id: ObjectId, args: &SignalArgs) -> Option<SignalValue> {
    if let Some(rect) = args.as_rect() {
        allocate(tk, id, rect);
    }
    None
}

pub fn allocate(tk: &mut Toolkit, id: ObjectId, rect: Rect) {
    let (orientation, spacing, homogeneous, border) = box_props(tk, id);
    let children = visible_children(tk, id);
    if children.is_empty() {
        return;
    }
    let count = children.len() as i32;

    let (rect_main_pos, rect_cross_pos, rect_main, rect_cross) = match orientation {
        Orientation::Horizontal => (rect.x, rect.y, rect.width, rect.height),
        Orientation::Vertical => (rect.y, rect.x, rect.height, rect.width),
    };
    let avail_main = (rect_main - 2 * border).max(0);
    let avail_cross = (rect_cross - 2 * border).max(0);
    let main_end = rect_main_pos + border + avail_main;

    // Child requisitions along the axis, from the stored size-request
    // pass.
    let child_main_req: Vec<i32> = children
        .iter()
        .map(|c| {
            tk.widget(c.widget)
                .map(|w| main_of(orientation, w.requisition))
                .unwrap_or(0)
        })
        .collect();

    // Shares along the main axis.
    let mut shares: Vec<i32> = Vec::with_capacity(children.len());
    if homogeneous {
        let total = (avail_main - spacing * (count - 1)).max(0);
        let each = total / count;
        let mut remainder = total - each * count;
        for _ in 0..count {
            let bonus = if remainder > 0 { 1 } else { 0 };
            remainder -= bonus;
            shares.push(each + bonus);
        }
    } else {
        let req_main: i32 = child_main_req
            .iter()
            .zip(&children)
            .map(|(m, c)| m + 2 * c.options.padding)
            .sum::<i32>()
            + spacing * (count - 1).max(0);
        let extra = avail_main - req_main;
        let n_expand = children.iter().filter(|c| c.options.expand).count() as i32;
        let (each_extra, mut remainder) = if extra > 0 && n_expand > 0 {
            (extra / n_expand, extra % n_expand)
        } else {
            (0, 0)
        };
        for (i, child) in children.iter().enumerate() {
            let mut share = child_main_req[i] + 2 * child.options.padding;
            if extra > 0 && child.options.expand {
                let bonus = if remainder > 0 { 1 } else { 0 };
                remainder -= bonus;
                share += each_extra + bonus;
            }
            shares.push(share);
        }
    }

    // Place children.
    let mut cursor = rect_main_pos + border;
    for (i, child) in children.iter().enumerate() {
        let pad = child.options.padding;
        let inner = (shares[i] - 2 * pad).max(0);
        let (mut child_main, mut child_pos) = if child.options.fill || homogeneous {
            (inner, cursor + pad)
        } else {
            let natural = child_main_req[i].min(inner);
            (natural, cursor + pad + (inner - natural) / 2)
        };

        // Deficit: clip at the container boundary, never go negative.
        if child_pos + child_main > main_end {
            child_main = (main_end - child_pos).max(0);
        }
        if child_pos > main_end {
            child_pos = main_end;
        }

        let child_rect = make_rect(
            orientation,
            child_pos,
            rect_cross_pos + border,
            child_main,
            avail_cross,
        );
        core::set_allocation(tk, child.widget, child_rect);

        cursor += shares[i] + spacing;
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

    fn alloc_of(tk: &Toolkit, id: ObjectId) -> Rect {
        tk.widget(id).unwrap().allocation
    }

    #[test]
    fn request_sums_children_plus_spacing_and_border() {
        let mut tk = Toolkit::new();
        let b = hbox_new(&mut tk, false, 2);
        set_border(&mut tk, b, 1);
        let c1 = child_sized(&mut tk, 10, 3);
        let c2 = child_sized(&mut tk, 20, 5);
        pack_start(&mut tk, b, c1, false, false, 0);
        pack_start(&mut tk, b, c2, false, false, 0);

        let req = core::size_request(&mut tk, b);
        // 10 + 20 + spacing 2 + borders 2 = 34; cross 5 + 2 = 7.
        assert_eq!(req, Size::new(34, 7));
    }

    #[test]
    fn homogeneous_request_is_max_times_count() {
        let mut tk = Toolkit::new();
        let b = hbox_new(&mut tk, true, 0);
        let c1 = child_sized(&mut tk, 10, 1);
        let c2 = child_sized(&mut tk, 25, 1);
        pack_start(&mut tk, b, c1, true, true, 0);
        pack_start(&mut tk, b, c2, true, true, 0);

        let req = core::size_request(&mut tk, b);
        assert_eq!(req.width, 50);
    }

    #[test]
    fn invisible_child_is_excluded() {
        let mut tk = Toolkit::new();
        let b = hbox_new(&mut tk, false, 5);
        let c1 = child_sized(&mut tk, 10, 1);
        let c2 = child_sized(&mut tk, 20, 1);
        core::hide(&mut tk, c2);
        pack_start(&mut tk, b, c1, false, false, 0);
        pack_start(&mut tk, b, c2, false, false, 0);

        // Only c1 counts; no inter-child spacing for a single child.
        assert_eq!(core::size_request(&mut tk, b).width, 10);
    }

    #[test]
    fn allocation_conservation() {
        let mut tk = Toolkit::new();
        let b = hbox_new(&mut tk, false, 0);
        let fixed = child_sized(&mut tk, 10, 2);
        let grow1 = child_sized(&mut tk, 10, 2);
        let grow2 = child_sized(&mut tk, 10, 2);
        pack_start(&mut tk, b, fixed, false, false, 0);
        pack_start(&mut tk, b, grow1, true, true, 0);
        pack_start(&mut tk, b, grow2, true, true, 0);

        core::size_request(&mut tk, b);
        // R = 30, A = 51, extra = 21 split between two expanders.
        core::set_allocation(&mut tk, b, Rect::new(0, 0, 51, 2));

        let w_fixed = alloc_of(&tk, fixed).width;
        let w1 = alloc_of(&tk, grow1).width;
        let w2 = alloc_of(&tk, grow2).width;
        assert_eq!(w_fixed, 10);
        assert_eq!((w1 - 10) + (w2 - 10), 21);
        assert!((w1 - w2).abs() <= 1);
    }

    #[test]
    fn layout_is_idempotent() {
        let mut tk = Toolkit::new();
        let b = hbox_new(&mut tk, false, 1);
        let c1 = child_sized(&mut tk, 8, 2);
        let c2 = child_sized(&mut tk, 8, 2);
        pack_start(&mut tk, b, c1, true, true, 0);
        pack_start(&mut tk, b, c2, false, false, 2);

        core::size_request(&mut tk, b);
        core::set_allocation(&mut tk, b, Rect::new(0, 0, 40, 4));
        let first = (alloc_of(&tk, c1), alloc_of(&tk, c2));

        core::size_request(&mut tk, b);
        core::set_allocation(&mut tk, b, Rect::new(0, 0, 40, 4));
        let second = (alloc_of(&tk, c1), alloc_of(&tk, c2));

        assert_eq!(first, second);
    }

    #[test]
    fn non_fill_child_is_centered_in_its_share() {
        let mut tk = Toolkit::new();
        let b = hbox_new(&mut tk, false, 0);
        let c = child_sized(&mut tk, 10, 2);
        pack_start(&mut tk, b, c, true, false, 0);

        core::size_request(&mut tk, b);
        core::set_allocation(&mut tk, b, Rect::new(0, 0, 30, 2));

        let a = alloc_of(&tk, c);
        assert_eq!(a.width, 10);
        assert_eq!(a.x, 10);
    }

    #[test]
    fn deficit_clips_at_boundary() {
        let mut tk = Toolkit::new();
        let b = hbox_new(&mut tk, false, 0);
        let c1 = child_sized(&mut tk, 10, 2);
        let c2 = child_sized(&mut tk, 10, 2);
        pack_start(&mut tk, b, c1, false, true, 0);
        pack_start(&mut tk, b, c2, false, true, 0);

        core::size_request(&mut tk, b);
        core::set_allocation(&mut tk, b, Rect::new(0, 0, 14, 2));

        let a1 = alloc_of(&tk, c1);
        let a2 = alloc_of(&tk, c2);
        assert_eq!(a1.width, 10);
        // Second child is clipped to what remains, never negative.
        assert_eq!(a2.x, 10);
        assert_eq!(a2.width, 4);
    }

    #[test]
    fn vertical_box_stacks_downward() {
        let mut tk = Toolkit::new();
        let b = vbox_new(&mut tk, false, 1);
        let c1 = child_sized(&mut tk, 5, 3);
        let c2 = child_sized(&mut tk, 5, 3);
        pack_start(&mut tk, b, c1, false, true, 0);
        pack_start(&mut tk, b, c2, false, true, 0);

        core::size_request(&mut tk, b);
        core::set_allocation(&mut tk, b, Rect::new(0, 0, 5, 10));

        assert_eq!(alloc_of(&tk, c1).y, 0);
        assert_eq!(alloc_of(&tk, c2).y, 4);
    }
}
