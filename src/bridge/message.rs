//! Normalized native messages.
//!
//! Raw terminal events are translated into one flat message enum before
//! dispatch, so class-level native handlers and the default routing both
//! work from the same vocabulary regardless of what backend produced the
//! event.

use crossterm::event::{Event, KeyEvent, KeyEventKind};

use crate::bridge::native::HandleId;
use crate::bridge::sources::{IoCondition, SourceId};
use crate::types::Point;

/// Control-originated command codes, delivered with the sender's handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandCode {
    Clicked,
    Toggled,
}

/// Asynchronous notification codes from composite controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyCode {
    SelectionChanged,
    ItemActivated,
    ColumnClicked(usize),
    /// The user finished resizing a header column.
    HeaderEndTrack(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeMessage {
    /// Terminal resized.
    Resize { width: i32, height: i32 },
    /// Repaint everything.
    Paint,
    /// Key press, already filtered to press events.
    Key(KeyEvent),
    /// Pointer press at a cell position.
    Pointer(Point),
    /// Pointer moved with the button held.
    PointerDrag(Point),
    /// Pointer button released.
    PointerUp(Point),
    /// A control reports a command (button click and friends).
    Command { handle: HandleId, code: CommandCode },
    /// A composite control notifies about internal state.
    Notify { handle: HandleId, code: NotifyCode },
    /// Owner-draw request for one item of a view.
    DrawItem { handle: HandleId, row: usize },
    /// Close request against a window handle.
    Close { handle: HandleId },
    /// A timer source came due.
    Timer { source: SourceId },
    /// A watched descriptor reported readiness.
    SocketReady {
        source: SourceId,
        condition: IoCondition,
    },
}

/// Translate a raw terminal event. Key releases and events with no
/// message-level meaning map to `None`.
pub fn translate(event: Event) -> Option<NativeMessage> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(NativeMessage::Key(key)),
        Event::Resize(w, h) => Some(NativeMessage::Resize {
            width: w as i32,
            height: h as i32,
        }),
        Event::Mouse(m) => {
            let p = Point::new(m.column as i32, m.row as i32);
            match m.kind {
                crossterm::event::MouseEventKind::Down(_) => Some(NativeMessage::Pointer(p)),
                crossterm::event::MouseEventKind::Drag(_) => Some(NativeMessage::PointerDrag(p)),
                crossterm::event::MouseEventKind::Up(_) => Some(NativeMessage::PointerUp(p)),
                _ => None,
            }
        }
        _ => None,
    }
}
