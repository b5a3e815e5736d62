//! Object system: class descriptors, instances, signal dispatch.

pub mod class;
pub mod instance;
pub mod signal;

pub use class::{ChainPolicy, ClassDescriptor, SignalSpec, find_signal, is_a, OBJECT_CLASS};
pub use instance::{ObjectArena, ObjectId, ObjectInstance, SideValue};
pub use signal::{HandlerId, SignalArgs, SignalShape, SignalValue};
