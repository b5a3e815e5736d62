//! Signal dispatch: argument marshaling and per-object handler registries.
//!
//! A signal emission is pure fan-out plus a trailing default: every
//! externally connected handler runs in registration order, then the
//! class's own default action(s). Handlers never suppress the default.
//! Emission itself lives on [`crate::toolkit::Toolkit`]; this module owns
//! the data shapes.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::object::instance::ObjectId;
use crate::toolkit::Toolkit;
use crate::types::{Point, Rect};

// =============================================================================
// Argument shapes
// =============================================================================

/// The per-signal argument shape a marshaler accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalShape {
    /// No arguments.
    None,
    /// One integer.
    Int,
    /// One index (page number, column number, source id).
    Index,
    /// One boolean.
    Bool,
    /// A rectangle (allocation for "set_size").
    Rect,
    /// The row + column + event shape used by selection signals.
    RowColumnEvent,
}

/// Emitted arguments. Shape-checked against the signal's declared
/// marshaler before any handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalArgs {
    None,
    Int(i64),
    Index(usize),
    Bool(bool),
    Rect(Rect),
    RowColumnEvent {
        row: usize,
        column: usize,
        event: Point,
    },
}

impl SignalArgs {
    pub fn shape(&self) -> SignalShape {
        match self {
            SignalArgs::None => SignalShape::None,
            SignalArgs::Int(_) => SignalShape::Int,
            SignalArgs::Index(_) => SignalShape::Index,
            SignalArgs::Bool(_) => SignalShape::Bool,
            SignalArgs::Rect(_) => SignalShape::Rect,
            SignalArgs::RowColumnEvent { .. } => SignalShape::RowColumnEvent,
        }
    }

    pub fn as_rect(&self) -> Option<Rect> {
        match self {
            SignalArgs::Rect(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            SignalArgs::Index(i) => Some(*i),
            _ => None,
        }
    }
}

/// Return slot for query-shaped signals (e.g. "should this delete request
/// be intercepted?").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalValue {
    Int(i64),
    Bool(bool),
}

impl SignalValue {
    pub fn as_bool(&self) -> bool {
        matches!(self, SignalValue::Bool(true)) || matches!(self, SignalValue::Int(v) if *v != 0)
    }
}

// =============================================================================
// Handler registry
// =============================================================================

/// Externally connected signal handler.
///
/// Receives the toolkit, the receiver object (the emitter, or the bound
/// delegate for swapped connections) and the marshaled arguments.
pub type SignalHandler = dyn Fn(&mut Toolkit, ObjectId, &SignalArgs) -> Option<SignalValue>;

/// Identifies one connection for later disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(pub(crate) u64);

/// One registered handler: function, optional delegate, kept in
/// registration order.
#[derive(Clone)]
pub(crate) struct HandlerEntry {
    pub id: HandlerId,
    pub func: Rc<SignalHandler>,
    /// For "swapped" connections: the handler operates on this object
    /// instead of the emitter.
    pub delegate: Option<ObjectId>,
}

/// Per-object signal registry: name → ordered handler list.
#[derive(Default)]
pub(crate) struct SignalRegistry {
    handlers: FxHashMap<&'static str, Vec<HandlerEntry>>,
    next_id: u64,
}

impl SignalRegistry {
    pub fn connect(
        &mut self,
        signal: &'static str,
        func: Rc<SignalHandler>,
        delegate: Option<ObjectId>,
    ) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.entry(signal).or_default().push(HandlerEntry {
            id,
            func,
            delegate,
        });
        id
    }

    /// Remove a connection. Returns false when the id is unknown (already
    /// disconnected or never existed).
    pub fn disconnect(&mut self, id: HandlerId) -> bool {
        for entries in self.handlers.values_mut() {
            if let Some(pos) = entries.iter().position(|e| e.id == id) {
                entries.remove(pos);
                return true;
            }
        }
        false
    }

    /// Snapshot of the handler list for one signal, in registration order.
    /// Cloned (`Rc` bumps) so emission can run handlers that mutate the
    /// toolkit, including connecting or disconnecting on this object.
    pub fn snapshot(&self, signal: &str) -> Vec<HandlerEntry> {
        self.handlers.get(signal).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_preserves_registration_order() {
        let mut reg = SignalRegistry::default();
        let a = reg.connect("clicked", Rc::new(|_, _, _| None), None);
        let b = reg.connect("clicked", Rc::new(|_, _, _| None), None);
        let snap = reg.snapshot("clicked");
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].id, a);
        assert_eq!(snap[1].id, b);
    }

    #[test]
    fn disconnect_unknown_is_false() {
        let mut reg = SignalRegistry::default();
        let id = reg.connect("clicked", Rc::new(|_, _, _| None), None);
        assert!(reg.disconnect(id));
        assert!(!reg.disconnect(id));
    }

    #[test]
    fn shape_of_args() {
        assert_eq!(SignalArgs::None.shape(), SignalShape::None);
        assert_eq!(SignalArgs::Index(3).shape(), SignalShape::Index);
        assert_eq!(
            SignalArgs::RowColumnEvent {
                row: 0,
                column: 1,
                event: Point::new(0, 0)
            }
            .shape(),
            SignalShape::RowColumnEvent
        );
    }

    #[test]
    fn signal_value_truthiness() {
        assert!(SignalValue::Bool(true).as_bool());
        assert!(!SignalValue::Bool(false).as_bool());
        assert!(SignalValue::Int(1).as_bool());
        assert!(!SignalValue::Int(0).as_bool());
    }
}
