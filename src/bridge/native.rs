//! Native layer: the handle table and the terminal session.
//!
//! The terminal has no window objects, so "native handles" are entries in
//! a capacity-bounded table. Each handle carries a user-data slot pointing
//! back at its widget; that back-pointer is how the event bridge resolves
//! a message's target. Handle creation can fail (table exhausted), and per
//! the degrade-don't-crash policy the widget then simply stays
//! handle-less.

use std::io::{Stdout, stdout};

use crossterm::{cursor, execute, terminal};
use log::warn;

use crate::error::Result;
use crate::object::instance::ObjectId;

// =============================================================================
// Handles
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    /// Toplevel window surface.
    Window,
    /// Child control region.
    Control,
    /// Notebook tab page.
    TabPage,
}

#[derive(Debug)]
struct NativeHandle {
    kind: HandleKind,
    /// Back-pointer to the owning widget; the bridge's lookup key.
    user_data: Option<ObjectId>,
}

/// Capacity-bounded handle table with free-slot reuse.
pub struct HandleTable {
    slots: Vec<Option<NativeHandle>>,
    free: Vec<usize>,
    capacity: usize,
}

/// Enough for any realistic widget tree; small enough that runaway
/// allocation surfaces as a log line instead of unbounded growth.
const DEFAULT_HANDLE_CAPACITY: usize = 4096;

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleTable {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HANDLE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            capacity,
        }
    }

    /// Create a handle. Returns None on exhaustion (resource failure);
    /// callers leave the widget handle-less.
    pub fn create(&mut self, kind: HandleKind, user_data: Option<ObjectId>) -> Option<HandleId> {
        let handle = NativeHandle { kind, user_data };
        if let Some(index) = self.free.pop() {
            self.slots[index] = Some(handle);
            return Some(HandleId(index));
        }
        if self.slots.len() >= self.capacity {
            warn!("handle table exhausted ({} slots)", self.capacity);
            return None;
        }
        self.slots.push(Some(handle));
        Some(HandleId(self.slots.len() - 1))
    }

    pub fn release(&mut self, id: HandleId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            if slot.take().is_some() {
                self.free.push(id.0);
            }
        }
    }

    /// The widget a handle points back at, if the handle is live.
    pub fn user_data(&self, id: HandleId) -> Option<ObjectId> {
        self.slots
            .get(id.0)
            .and_then(|s| s.as_ref())
            .and_then(|h| h.user_data)
    }

    pub fn set_user_data(&mut self, id: HandleId, data: Option<ObjectId>) {
        if let Some(handle) = self.slots.get_mut(id.0).and_then(|s| s.as_mut()) {
            handle.user_data = data;
        }
    }

    pub fn kind(&self, id: HandleId) -> Option<HandleKind> {
        self.slots
            .get(id.0)
            .and_then(|s| s.as_ref())
            .map(|h| h.kind)
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

// =============================================================================
// Terminal session
// =============================================================================

/// RAII terminal session: raw mode + alternate screen + hidden cursor on
/// entry, restored on drop.
pub struct TerminalSession {
    out: Stdout,
}

impl TerminalSession {
    pub fn init() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        execute!(out, terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(Self { out })
    }

    pub fn size(&self) -> Result<(i32, i32)> {
        let (w, h) = terminal::size()?;
        Ok((w as i32, h as i32))
    }

    pub fn writer(&mut self) -> &mut Stdout {
        &mut self.out
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(self.out, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
