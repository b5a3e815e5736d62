//! Class registry: static descriptors forming a single-inheritance chain.
//!
//! Every concrete widget class is a `static ClassDescriptor` whose
//! `parent` chain terminates at [`OBJECT_CLASS`]. Type queries are pointer
//! identity up the chain; no host-language inheritance is involved, so
//! the semantics stay explicit and testable.

use crate::bridge::message::NativeMessage;
use crate::object::instance::ObjectId;
use crate::object::signal::{SignalArgs, SignalShape, SignalValue};
use crate::toolkit::Toolkit;

/// A class's own implementation of one of its signals. Runs after every
/// externally connected handler.
pub type DefaultAction = fn(&mut Toolkit, ObjectId, &SignalArgs) -> Option<SignalValue>;

/// Class-level handler for raw native messages, consulted by the event
/// bridge before default handling.
pub type NativeHandler = fn(&mut Toolkit, ObjectId, &NativeMessage) -> bool;

/// How a signal's default actions are gathered from the class chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPolicy {
    /// Only the nearest declaring class's default action runs.
    Nearest,
    /// Every declaring class runs, base class first ("create").
    BaseFirst,
    /// Every declaring class runs, subclass first ("destroy", so subclass
    /// teardown sees a still-valid base).
    DerivedFirst,
}

/// One entry in a class's ordered signal table.
#[derive(Clone, Copy)]
pub struct SignalSpec {
    pub name: &'static str,
    pub shape: SignalShape,
    pub chain: ChainPolicy,
    pub default_action: Option<DefaultAction>,
}

/// Static per-class descriptor. Created once, never destroyed.
pub struct ClassDescriptor {
    pub name: &'static str,
    pub parent: Option<&'static ClassDescriptor>,
    pub signals: &'static [SignalSpec],
    pub native_handler: Option<NativeHandler>,
}

impl std::fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .finish()
    }
}

/// The universal base class. Declares the lifecycle signals every object
/// carries.
pub static OBJECT_CLASS: ClassDescriptor = ClassDescriptor {
    name: "Object",
    parent: None,
    signals: &[
        SignalSpec {
            name: "create",
            shape: SignalShape::None,
            chain: ChainPolicy::BaseFirst,
            default_action: None,
        },
        SignalSpec {
            name: "destroy",
            shape: SignalShape::None,
            chain: ChainPolicy::DerivedFirst,
            default_action: None,
        },
    ],
    native_handler: None,
};

/// Walk the parent chain testing descriptor identity.
pub fn is_a(class: &'static ClassDescriptor, target: &'static ClassDescriptor) -> bool {
    let mut cursor = Some(class);
    while let Some(c) = cursor {
        if std::ptr::eq(c, target) {
            return true;
        }
        cursor = c.parent;
    }
    false
}

/// Find `name` in the nearest ancestor class that declares it.
pub fn find_signal(
    class: &'static ClassDescriptor,
    name: &str,
) -> Option<(&'static ClassDescriptor, &'static SignalSpec)> {
    let mut cursor = Some(class);
    while let Some(c) = cursor {
        if let Some(spec) = c.signals.iter().find(|s| s.name == name) {
            return Some((c, spec));
        }
        cursor = c.parent;
    }
    None
}

/// Collect the default actions to run for `name`, honoring the chain
/// policy declared by the nearest spec.
pub fn default_actions(class: &'static ClassDescriptor, name: &str) -> Vec<DefaultAction> {
    let Some((_, spec)) = find_signal(class, name) else {
        return Vec::new();
    };

    match spec.chain {
        ChainPolicy::Nearest => spec.default_action.into_iter().collect(),
        ChainPolicy::BaseFirst | ChainPolicy::DerivedFirst => {
            // Derived-to-base order as walked; reverse for base-first.
            let mut actions = Vec::new();
            let mut cursor = Some(class);
            while let Some(c) = cursor {
                if let Some(s) = c.signals.iter().find(|s| s.name == name) {
                    if let Some(action) = s.default_action {
                        actions.push(action);
                    }
                }
                cursor = c.parent;
            }
            if spec.chain == ChainPolicy::BaseFirst {
                actions.reverse();
            }
            actions
        }
    }
}

/// Find the nearest ancestor class that declares a native-message handler.
pub fn find_native_handler(class: &'static ClassDescriptor) -> Option<NativeHandler> {
    let mut cursor = Some(class);
    while let Some(c) = cursor {
        if let Some(handler) = c.native_handler {
            return Some(handler);
        }
        cursor = c.parent;
    }
    None
}

/// Depth of the parent chain, used by tests to prove termination.
pub fn chain_depth(class: &'static ClassDescriptor) -> usize {
    let mut depth = 0;
    let mut cursor = Some(class);
    while let Some(c) = cursor {
        depth += 1;
        cursor = c.parent;
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::box_layout::BOX_CLASS;
    use crate::widget::core::WIDGET_CLASS;
    use crate::widget::window::WINDOW_CLASS;

    #[test]
    fn chains_terminate_at_object() {
        for class in [&OBJECT_CLASS, &WIDGET_CLASS, &WINDOW_CLASS, &BOX_CLASS] {
            let mut seen: Vec<*const ClassDescriptor> = Vec::new();
            let mut cursor = Some(class);
            while let Some(c) = cursor {
                let ptr: *const ClassDescriptor = c;
                assert!(!seen.contains(&ptr), "cycle through {}", c.name);
                seen.push(ptr);
                cursor = c.parent;
            }
            assert!(std::ptr::eq(
                *seen.last().unwrap(),
                &OBJECT_CLASS as *const _
            ));
            assert!(chain_depth(class) == seen.len());
        }
    }

    #[test]
    fn is_a_walks_upward_only() {
        assert!(is_a(&WINDOW_CLASS, &WIDGET_CLASS));
        assert!(is_a(&WINDOW_CLASS, &OBJECT_CLASS));
        assert!(is_a(&WIDGET_CLASS, &WIDGET_CLASS));
        assert!(!is_a(&WIDGET_CLASS, &WINDOW_CLASS));
        assert!(!is_a(&OBJECT_CLASS, &WIDGET_CLASS));
    }

    #[test]
    fn find_signal_resolves_through_ancestors() {
        // "destroy" is declared on Object; visible from any subclass.
        let (declaring, spec) = find_signal(&WINDOW_CLASS, "destroy").unwrap();
        assert!(std::ptr::eq(declaring, &OBJECT_CLASS));
        assert_eq!(spec.chain, ChainPolicy::DerivedFirst);
    }

    #[test]
    fn find_signal_unknown_is_none() {
        assert!(find_signal(&WINDOW_CLASS, "no-such-signal").is_none());
    }
}
