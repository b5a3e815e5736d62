//! Core types for cinder-tui.
//!
//! Plain-data geometry and option types that every other module builds on.
//! Sizes are signed: layout math needs to observe a deficit
//! (`allocation - requisition < 0`) before clamping it away.

use bitflags::bitflags;

// =============================================================================
// Geometry
// =============================================================================

/// A point in cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in cells.
///
/// Doubles as a widget's requisition (desired size, computed bottom-up).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// A positioned rectangle in cell coordinates.
///
/// A widget's allocation (the size/position its parent actually granted,
/// computed top-down) is a `Rect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const ZERO: Self = Self {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Intersect two rectangles. Empty intersections come back zero-sized.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Rect {
            x,
            y,
            width: (right - x).max(0),
            height: (bottom - y).max(0),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Shrink the rectangle by `amount` cells on every side, clamping at zero.
    pub fn inset(&self, amount: i32) -> Rect {
        Rect {
            x: self.x + amount,
            y: self.y + amount,
            width: (self.width - 2 * amount).max(0),
            height: (self.height - 2 * amount).max(0),
        }
    }
}

// =============================================================================
// Orientation & alignment
// =============================================================================

/// Axis of a linear (box) or split-pane container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Horizontal text alignment inside a cell or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

// =============================================================================
// Packing / attach options
// =============================================================================

/// Per-child options for packing into a linear box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackOptions {
    /// Child receives a share of the box's spare space.
    pub expand: bool,
    /// Child consumes its full allotted share instead of being centered in it.
    pub fill: bool,
    /// Extra cells reserved on both sides of the child along the box axis.
    pub padding: i32,
}

impl PackOptions {
    pub const fn new(expand: bool, fill: bool, padding: i32) -> Self {
        Self {
            expand,
            fill,
            padding,
        }
    }
}

impl Default for PackOptions {
    fn default() -> Self {
        Self::new(false, false, 0)
    }
}

bitflags! {
    /// Per-axis options for attaching a child to a table cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AttachOptions: u8 {
        /// Row/column may receive spare space.
        const EXPAND = 1 << 0;
        /// Row/column may be compressed below its requisition.
        const SHRINK = 1 << 1;
        /// Child fills its cell instead of being centered in it.
        const FILL   = 1 << 2;
    }
}

impl Default for AttachOptions {
    fn default() -> Self {
        AttachOptions::EXPAND | AttachOptions::FILL
    }
}

bitflags! {
    /// Widget lifecycle and visibility flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StateFlags: u16 {
        /// Native handle has been created.
        const REALIZED   = 1 << 0;
        /// Widget wants to be drawn (orthogonal to realization).
        const VISIBLE    = 1 << 1;
        /// Widget is a toplevel window.
        const TOPLEVEL   = 1 << 2;
        /// Destruction has started; re-entrant destroys are no-ops.
        const IN_DESTROY = 1 << 3;
        /// Terminal state; the slot is about to be freed.
        const DESTROYED  = 1 << 4;
        /// Widget currently holds keyboard focus.
        const HAS_FOCUS  = 1 << 5;
    }
}
