//! Grid (table) container.
//!
//! Per-row/per-column requisitions are computed in two scans: first the
//! shrink-exempt single-cell children reserve mandatory space, then all
//! children are reconciled, with spanning children distributing any
//! remaining deficit evenly across the columns/rows they cover. In
//! homogeneous mode every row/column is forced to the observed maximum.
//! Allocation distributes spare space among columns/rows not flagged
//! "shrink" (proportionally, absorbing integer error one unit at a time)
//! and positions each child by summing preceding allocations plus
//! spacing. Invisible children are excluded from both passes.

use log::warn;

use crate::object::class::{ChainPolicy, ClassDescriptor, SignalSpec};
use crate::object::instance::ObjectId;
use crate::object::signal::{SignalArgs, SignalShape, SignalValue};
use crate::toolkit::Toolkit;
use crate::types::{AttachOptions, Rect, Size};
use crate::widget::core::{self, ClassData, WidgetCore, WIDGET_CLASS};

// =============================================================================
// Data & class
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct TableChild {
    pub widget: ObjectId,
    pub left: usize,
    pub right: usize,
    pub top: usize,
    pub bottom: usize,
    pub xopts: AttachOptions,
    pub yopts: AttachOptions,
    pub xpad: i32,
    pub ypad: i32,
}

pub struct TableData {
    pub ncols: usize,
    pub nrows: usize,
    pub homogeneous: bool,
    pub col_spacing: i32,
    pub row_spacing: i32,
    pub border: i32,
    pub children: Vec<TableChild>,
}

pub static TABLE_CLASS: ClassDescriptor = ClassDescriptor {
    name: "Table",
    parent: Some(&WIDGET_CLASS),
    signals: &[SignalSpec {
        name: "set_size",
        shape: SignalShape::Rect,
        chain: ChainPolicy::Nearest,
        default_action: Some(set_size_default),
    }],
    native_handler: None,
};

pub fn table_new(tk: &mut Toolkit, nrows: usize, ncols: usize, homogeneous: bool) -> ObjectId {
    tk.new_object(
        &TABLE_CLASS,
        Some(WidgetCore::default()),
        ClassData::Table(TableData {
            ncols: ncols.max(1),
            nrows: nrows.max(1),
            homogeneous,
            col_spacing: 0,
            row_spacing: 0,
            border: 0,
            children: Vec::new(),
        }),
    )
}

pub fn set_spacings(tk: &mut Toolkit, id: ObjectId, row: i32, col: i32) {
    if let Some(ClassData::Table(data)) = tk.object_mut(id).map(|o| &mut o.data) {
        data.row_spacing = row.max(0);
        data.col_spacing = col.max(0);
    }
    core::queue_resize(tk, id);
}

pub fn set_border(tk: &mut Toolkit, id: ObjectId, border: i32) {
    if let Some(ClassData::Table(data)) = tk.object_mut(id).map(|o| &mut o.data) {
        data.border = border.max(0);
    }
    core::queue_resize(tk, id);
}

/// Attach a child to the cell range [left, right) x [top, bottom). The
/// table grows to cover the range; a degenerate range is a logged no-op.
#[allow(clippy::too_many_arguments)]
pub fn attach(
    tk: &mut Toolkit,
    tablew: ObjectId,
    child: ObjectId,
    left: usize,
    right: usize,
    top: usize,
    bottom: usize,
    xopts: AttachOptions,
    yopts: AttachOptions,
    xpad: i32,
    ypad: i32,
) {
    if right <= left || bottom <= top {
        warn!("table attach: degenerate cell range [{left},{right})x[{top},{bottom})");
        return;
    }
    if !core::adopt(tk, tablew, child) {
        return;
    }
    if let Some(ClassData::Table(data)) = tk.object_mut(tablew).map(|o| &mut o.data) {
        data.ncols = data.ncols.max(right);
        data.nrows = data.nrows.max(bottom);
        data.children.push(TableChild {
            widget: child,
            left,
            right,
            top,
            bottom,
            xopts,
            yopts,
            xpad: xpad.max(0),
            ypad: ypad.max(0),
        });
    }
    core::queue_resize(tk, tablew);
}

// =============================================================================
// Axis requisition
// =============================================================================

struct AxisLines {
    req: Vec<i32>,
    expand: Vec<bool>,
    shrink: Vec<bool>,
}

/// Per-line requisition for one axis. `extent` picks the child's span and
/// padding along that axis.
fn axis_requisition(
    children: &[(TableChild, Size)],
    nlines: usize,
    homogeneous: bool,
    horizontal: bool,
    spacing: i32,
) -> AxisLines {
    let mut req = vec![0i32; nlines];
    let mut expand = vec![false; nlines];
    // A line may shrink only when every child covering it allows it.
    let mut shrink = vec![true; nlines];
    let mut covered = vec![false; nlines];

    let span_of = |c: &TableChild| -> (usize, usize, AttachOptions, i32) {
        if horizontal {
            (c.left, c.right, c.xopts, c.xpad)
        } else {
            (c.top, c.bottom, c.yopts, c.ypad)
        }
    };
    let extent_of = |s: &Size| if horizontal { s.width } else { s.height };

    // Scan 1: shrink-exempt single-span children reserve mandatory space.
    for (child, size) in children {
        let (start, end, opts, pad) = span_of(child);
        if end - start == 1 && !opts.contains(AttachOptions::SHRINK) {
            req[start] = req[start].max(extent_of(size) + 2 * pad);
        }
    }

    // Scan 2: all children. Single-span children reconcile their line;
    // spanning children spread any deficit evenly across their lines.
    for (child, size) in children {
        let (start, end, opts, pad) = span_of(child);
        let span = end - start;
        for line in start..end {
            covered[line] = true;
            if opts.contains(AttachOptions::EXPAND) {
                expand[line] = true;
            }
            if !opts.contains(AttachOptions::SHRINK) {
                shrink[line] = false;
            }
        }
        let needed = extent_of(size) + 2 * pad;
        if span == 1 {
            req[start] = req[start].max(needed);
        } else {
            let have: i32 = req[start..end].iter().sum::<i32>() + spacing * (span as i32 - 1);
            if needed > have {
                let deficit = needed - have;
                let each = deficit / span as i32;
                let mut remainder = deficit % span as i32;
                for line in start..end {
                    let bonus = if remainder > 0 { 1 } else { 0 };
                    remainder -= bonus;
                    req[line] += each + bonus;
                }
            }
        }
    }

    for line in 0..nlines {
        if !covered[line] {
            shrink[line] = false;
        }
    }

    if homogeneous {
        let max = req.iter().copied().max().unwrap_or(0);
        req.iter_mut().for_each(|r| *r = max);
    }

    AxisLines {
        req,
        expand,
        shrink,
    }
}

/// Distribute `extra` over the lines. Spare space goes to lines not
/// flagged shrink, spread evenly with one unit of rounding error absorbed
/// per line; a deficit is taken from shrinkable lines, clamped at zero.
fn distribute(lines: &AxisLines, extra: i32) -> Vec<i32> {
    let mut alloc = lines.req.clone();
    if extra > 0 {
        let targets: Vec<usize> = (0..alloc.len()).filter(|&i| lines.expand[i]).collect();
        let targets = if targets.is_empty() {
            // No expanding line: spare goes to every non-shrink line.
            (0..alloc.len()).filter(|&i| !lines.shrink[i]).collect()
        } else {
            targets
        };
        if targets.is_empty() {
            return alloc;
        }
        let each = extra / targets.len() as i32;
        let mut remainder = extra % targets.len() as i32;
        for &i in &targets {
            let bonus = if remainder > 0 { 1 } else { 0 };
            remainder -= bonus;
            alloc[i] += each + bonus;
        }
    } else if extra < 0 {
        let mut deficit = -extra;
        let shrinkable: Vec<usize> = (0..alloc.len()).filter(|&i| lines.shrink[i]).collect();
        // A line clamped at zero strands part of its cut; further rounds
        // spread it over the lines that still have room.
        while deficit > 0 {
            let open: Vec<usize> = shrinkable
                .iter()
                .copied()
                .filter(|&i| alloc[i] > 0)
                .collect();
            if open.is_empty() {
                break;
            }
            let each = deficit / open.len() as i32;
            let mut remainder = deficit % open.len() as i32;
            for &i in &open {
                let bonus = if remainder > 0 { 1 } else { 0 };
                remainder -= bonus;
                let cut = (each + bonus).min(alloc[i]);
                alloc[i] -= cut;
                deficit -= cut;
            }
        }
        // Deficit left once every shrinkable line is empty is clipped at
        // the container boundary by the placement pass.
    }
    alloc
}

// =============================================================================
// Size request & allocation
// =============================================================================

fn visible_children(tk: &mut Toolkit, id: ObjectId) -> Vec<(TableChild, Size)> {
    let Some(ClassData::Table(data)) = tk.object(id).map(|o| &o.data) else {
        return Vec::new();
    };
    let specs: Vec<TableChild> = data.children.clone();
    let mut out = Vec::with_capacity(specs.len());
    for spec in specs {
        if !core::is_visible(tk, spec.widget) {
            continue;
        }
        let req = core::size_request(tk, spec.widget);
        out.push((spec, req));
    }
    out
}

fn table_props(tk: &Toolkit, id: ObjectId) -> (usize, usize, bool, i32, i32, i32) {
    match tk.object(id).map(|o| &o.data) {
        Some(ClassData::Table(d)) => (
            d.ncols,
            d.nrows,
            d.homogeneous,
            d.col_spacing,
            d.row_spacing,
            d.border,
        ),
        _ => (1, 1, false, 0, 0, 0),
    }
}

pub fn size_request(tk: &mut Toolkit, id: ObjectId) -> Size {
    let (ncols, nrows, homogeneous, col_spacing, row_spacing, border) = table_props(tk, id);
    let children = visible_children(tk, id);

    let cols = axis_requisition(&children, ncols, homogeneous, true, col_spacing);
    let rows = axis_requisition(&children, nrows, homogeneous, false, row_spacing);

    let width: i32 =
        cols.req.iter().sum::<i32>() + col_spacing * (ncols as i32 - 1) + 2 * border;
    let height: i32 =
        rows.req.iter().sum::<i32>() + row_spacing * (nrows as i32 - 1) + 2 * border;
    Size::new(width, height)
}

fn set_size_default(tk: &mut Toolkit, id: ObjectId, args: &SignalArgs) -> Option<SignalValue> {
    if let Some(rect) = args.as_rect() {
        allocate(tk, id, rect);
    }
    None
}

pub fn allocate(tk: &mut Toolkit, id: ObjectId, rect: Rect) {
    let (ncols, nrows, homogeneous, col_spacing, row_spacing, border) = table_props(tk, id);
    let children = visible_children(tk, id);
    if children.is_empty() {
        return;
    }

    let cols = axis_requisition(&children, ncols, homogeneous, true, col_spacing);
    let rows = axis_requisition(&children, nrows, homogeneous, false, row_spacing);

    let req_w: i32 = cols.req.iter().sum::<i32>() + col_spacing * (ncols as i32 - 1);
    let req_h: i32 = rows.req.iter().sum::<i32>() + row_spacing * (nrows as i32 - 1);
    let avail_w = (rect.width - 2 * border).max(0);
    let avail_h = (rect.height - 2 * border).max(0);

    let col_alloc = distribute(&cols, avail_w - req_w);
    let row_alloc = distribute(&rows, avail_h - req_h);

    // Line start positions: preceding allocations plus spacing.
    let mut col_x = vec![0i32; ncols];
    let mut x = rect.x + border;
    for c in 0..ncols {
        col_x[c] = x;
        x += col_alloc[c] + col_spacing;
    }
    let mut row_y = vec![0i32; nrows];
    let mut y = rect.y + border;
    for r in 0..nrows {
        row_y[r] = y;
        y += row_alloc[r] + row_spacing;
    }

    let right_edge = rect.x + border + avail_w;
    let bottom_edge = rect.y + border + avail_h;

    for (child, req) in &children {
        let span_w: i32 = col_alloc[child.left..child.right].iter().sum::<i32>()
            + col_spacing * (child.right - child.left - 1) as i32;
        let span_h: i32 = row_alloc[child.top..child.bottom].iter().sum::<i32>()
            + row_spacing * (child.bottom - child.top - 1) as i32;

        let cell_w = (span_w - 2 * child.xpad).max(0);
        let cell_h = (span_h - 2 * child.ypad).max(0);

        let (mut cw, cx) = if child.xopts.contains(AttachOptions::FILL) {
            (cell_w, col_x[child.left] + child.xpad)
        } else {
            let natural = req.width.min(cell_w);
            (
                natural,
                col_x[child.left] + child.xpad + (cell_w - natural) / 2,
            )
        };
        let (mut ch, cy) = if child.yopts.contains(AttachOptions::FILL) {
            (cell_h, row_y[child.top] + child.ypad)
        } else {
            let natural = req.height.min(cell_h);
            (
                natural,
                row_y[child.top] + child.ypad + (cell_h - natural) / 2,
            )
        };

        // Clip at the table boundary; never hand out a negative rect.
        if cx + cw > right_edge {
            cw = (right_edge - cx).max(0);
        }
        if cy + ch > bottom_edge {
            ch = (bottom_edge - cy).max(0);
        }

        core::set_allocation(tk, child.widget, Rect::new(cx, cy, cw, ch));
    }
}
