//! Object instances and the arena that owns them.
//!
//! Instances live in a slot arena with a free-index pool, so an
//! [`ObjectId`] is a cheap copyable handle and destruction is explicit.
//! The first field of every instance is its class pointer, which keeps
//! the upcast/downcast story a plain chain walk.

use rustc_hash::FxHashMap;

use crate::object::class::ClassDescriptor;
use crate::object::signal::SignalRegistry;
use crate::types::StateFlags;
use crate::widget::core::{ClassData, WidgetCore};

/// Handle to an arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub(crate) usize);

/// Typed per-instance side-table value, for the ad hoc data applications
/// hang off objects.
#[derive(Debug, Clone, PartialEq)]
pub enum SideValue {
    Int(i64),
    UInt(u64),
    Bool(bool),
    Text(String),
    Index(usize),
}

/// One live object.
pub struct ObjectInstance {
    /// Class pointer; deliberately the first field.
    pub class: &'static ClassDescriptor,
    pub flags: StateFlags,
    /// Ad hoc keyed data, scoped to this instance.
    side: FxHashMap<&'static str, SideValue>,
    pub(crate) handlers: SignalRegistry,
    /// Present for every class under Widget.
    pub widget: Option<WidgetCore>,
    /// Concrete-class payload.
    pub data: ClassData,
}

impl ObjectInstance {
    pub fn new(
        class: &'static ClassDescriptor,
        widget: Option<WidgetCore>,
        data: ClassData,
    ) -> Self {
        Self {
            class,
            flags: StateFlags::empty(),
            side: FxHashMap::default(),
            handlers: SignalRegistry::default(),
            widget,
            data,
        }
    }

    pub fn set_side(&mut self, key: &'static str, value: SideValue) {
        self.side.insert(key, value);
    }

    pub fn side(&self, key: &str) -> Option<&SideValue> {
        self.side.get(key)
    }

    pub fn take_side(&mut self, key: &str) -> Option<SideValue> {
        self.side.remove(key)
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Slot arena with free-index reuse.
#[derive(Default)]
pub struct ObjectArena {
    slots: Vec<Option<ObjectInstance>>,
    free: Vec<usize>,
}

impl ObjectArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, instance: ObjectInstance) -> ObjectId {
        if let Some(index) = self.free.pop() {
            self.slots[index] = Some(instance);
            ObjectId(index)
        } else {
            self.slots.push(Some(instance));
            ObjectId(self.slots.len() - 1)
        }
    }

    /// Free a slot, returning the instance so callers can finish teardown
    /// with its contents.
    pub fn release(&mut self, id: ObjectId) -> Option<ObjectInstance> {
        let slot = self.slots.get_mut(id.0)?;
        let instance = slot.take();
        if instance.is_some() {
            self.free.push(id.0);
        }
        instance
    }

    pub fn get(&self, id: ObjectId) -> Option<&ObjectInstance> {
        self.slots.get(id.0).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut ObjectInstance> {
        self.slots.get_mut(id.0).and_then(|s| s.as_mut())
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of all live objects, in slot order.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(i, _)| ObjectId(i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::class::OBJECT_CLASS;

    fn bare() -> ObjectInstance {
        ObjectInstance::new(&OBJECT_CLASS, None, ClassData::Object)
    }

    #[test]
    fn allocate_release_reuses_slots() {
        let mut arena = ObjectArena::new();
        let a = arena.allocate(bare());
        let b = arena.allocate(bare());
        assert_ne!(a, b);

        assert!(arena.release(a).is_some());
        assert!(!arena.contains(a));
        assert!(arena.contains(b));

        let c = arena.allocate(bare());
        assert_eq!(c, a);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn release_twice_is_none() {
        let mut arena = ObjectArena::new();
        let a = arena.allocate(bare());
        assert!(arena.release(a).is_some());
        assert!(arena.release(a).is_none());
    }

    #[test]
    fn side_table_round_trip() {
        let mut obj = bare();
        obj.set_side("turn", SideValue::UInt(7));
        assert_eq!(obj.side("turn"), Some(&SideValue::UInt(7)));
        assert_eq!(obj.take_side("turn"), Some(SideValue::UInt(7)));
        assert_eq!(obj.side("turn"), None);
    }
}
