//! The toolkit context: process-wide runtime state with explicit
//! init/teardown.
//!
//! One `Toolkit` owns the object arena, the native handle table, the
//! toplevel window list and the timer/socket source registry. The event
//! bridge receives it by reference instead of reaching for ambient
//! globals, which keeps every subsystem testable without a live terminal.
//!
//! Signal emission lives here because it needs the arena and the class
//! registry at once: fan-out to connected handlers in registration order,
//! then the class default action(s).

use std::rc::Rc;

use log::{error, warn};

use crate::bridge::native::HandleTable;
use crate::bridge::sources::SourceRegistry;
use crate::layout::notebook;
use crate::object::class::{self, ClassDescriptor};
use crate::object::instance::{ObjectArena, ObjectId, ObjectInstance, SideValue};
use crate::object::signal::{HandlerId, SignalArgs, SignalHandler, SignalValue};
use crate::render::Surface;
use crate::types::StateFlags;
use crate::widget::core::{self, ClassData, WidgetCore};

pub struct Toolkit {
    pub(crate) objects: ObjectArena,
    pub(crate) handles: HandleTable,
    /// Toplevel windows, in creation order.
    pub(crate) windows: Vec<ObjectId>,
    pub(crate) sources: SourceRegistry,
    /// Shared drawing surface, sized to the terminal.
    pub surface: Surface,
    /// Nesting depth of the event loop (modal dialogs re-enter it).
    pub(crate) loop_depth: u32,
    pub(crate) quit_requested: bool,
    /// Widget that grabbed the pointer on press, for drag delivery.
    pub(crate) pointer_grab: Option<ObjectId>,
}

impl Default for Toolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolkit {
    /// Toolkit startup: empty registries, an 80x24 surface until the
    /// first resize message arrives.
    pub fn new() -> Self {
        Self {
            objects: ObjectArena::new(),
            handles: HandleTable::new(),
            windows: Vec::new(),
            sources: SourceRegistry::new(),
            surface: Surface::new(80, 24),
            loop_depth: 0,
            quit_requested: false,
            pointer_grab: None,
        }
    }

    // =========================================================================
    // Object construction & access
    // =========================================================================

    /// Allocate an instance of `class` and fire its "create" signal
    /// (ancestor default actions run base-first).
    pub fn new_object(
        &mut self,
        class: &'static ClassDescriptor,
        widget: Option<WidgetCore>,
        data: ClassData,
    ) -> ObjectId {
        let id = self.objects.allocate(ObjectInstance::new(class, widget, data));
        self.emit(id, "create", SignalArgs::None);
        id
    }

    pub fn object(&self, id: ObjectId) -> Option<&ObjectInstance> {
        self.objects.get(id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut ObjectInstance> {
        self.objects.get_mut(id)
    }

    pub fn is_alive(&self, id: ObjectId) -> bool {
        self.objects.contains(id)
    }

    /// "is-a" query: pointer identity up the parent chain.
    pub fn is_instance(&self, id: ObjectId, target: &'static ClassDescriptor) -> bool {
        self.objects
            .get(id)
            .is_some_and(|o| class::is_a(o.class, target))
    }

    pub fn class_of(&self, id: ObjectId) -> Option<&'static ClassDescriptor> {
        self.objects.get(id).map(|o| o.class)
    }

    pub fn flags(&self, id: ObjectId) -> StateFlags {
        self.objects
            .get(id)
            .map(|o| o.flags)
            .unwrap_or_default()
    }

    pub fn set_side_data(&mut self, id: ObjectId, key: &'static str, value: SideValue) {
        if let Some(obj) = self.objects.get_mut(id) {
            obj.set_side(key, value);
        }
    }

    pub fn side_data(&self, id: ObjectId, key: &str) -> Option<SideValue> {
        self.objects.get(id).and_then(|o| o.side(key).cloned())
    }

    pub fn widget(&self, id: ObjectId) -> Option<&WidgetCore> {
        self.objects.get(id).and_then(|o| o.widget.as_ref())
    }

    pub fn widget_mut(&mut self, id: ObjectId) -> Option<&mut WidgetCore> {
        self.objects.get_mut(id).and_then(|o| o.widget.as_mut())
    }

    pub fn windows(&self) -> &[ObjectId] {
        &self.windows
    }

    pub(crate) fn register_window(&mut self, id: ObjectId) {
        self.windows.push(id);
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    pub fn sources_mut(&mut self) -> &mut SourceRegistry {
        &mut self.sources
    }

    // =========================================================================
    // Signal connection
    // =========================================================================

    /// Connect `func` to `signal` on `id`, appended after existing
    /// handlers. Connecting to a signal no class in the chain declares is
    /// a programming error: logged, fatal in debug builds, ignored in
    /// release.
    pub fn connect<F>(&mut self, id: ObjectId, signal: &'static str, func: F) -> Option<HandlerId>
    where
        F: Fn(&mut Toolkit, ObjectId, &SignalArgs) -> Option<SignalValue> + 'static,
    {
        self.connect_entry(id, signal, Rc::new(func), None)
    }

    /// Connect with a delegate: the handler receives `delegate` as its
    /// object argument instead of the emitter. Supports MVC-style
    /// redirection ("destroy this dialog when that button is clicked").
    pub fn connect_swapped<F>(
        &mut self,
        id: ObjectId,
        signal: &'static str,
        delegate: ObjectId,
        func: F,
    ) -> Option<HandlerId>
    where
        F: Fn(&mut Toolkit, ObjectId, &SignalArgs) -> Option<SignalValue> + 'static,
    {
        self.connect_entry(id, signal, Rc::new(func), Some(delegate))
    }

    fn connect_entry(
        &mut self,
        id: ObjectId,
        signal: &'static str,
        func: Rc<SignalHandler>,
        delegate: Option<ObjectId>,
    ) -> Option<HandlerId> {
        let Some(obj) = self.objects.get_mut(id) else {
            error!("connect: object {id:?} is not alive");
            debug_assert!(false, "connect on dead object");
            return None;
        };
        if class::find_signal(obj.class, signal).is_none() {
            error!(
                "connect: class {} declares no signal {signal:?}",
                obj.class.name
            );
            debug_assert!(false, "unknown signal at connect time");
            return None;
        }
        Some(obj.handlers.connect(signal, func, delegate))
    }

    /// Disconnect a previously connected handler. Unknown ids are a
    /// logged no-op (the owning object may already be gone).
    pub fn disconnect(&mut self, id: ObjectId, handler: HandlerId) {
        let Some(obj) = self.objects.get_mut(id) else {
            return;
        };
        if !obj.handlers.disconnect(handler) {
            warn!("disconnect: handler {handler:?} not found on {id:?}");
        }
    }

    // =========================================================================
    // Emission
    // =========================================================================

    /// Emit `signal` on `id`.
    ///
    /// Looks up the marshaler from the nearest declaring ancestor class,
    /// shape-checks `args`, runs every connected handler in registration
    /// order, then the default action(s) per the signal's chain policy.
    /// For query signals the last non-`None` handler return wins over the
    /// default action's return.
    pub fn emit(&mut self, id: ObjectId, signal: &str, args: SignalArgs) -> Option<SignalValue> {
        let Some(obj) = self.objects.get(id) else {
            warn!("emit: object {id:?} is not alive, {signal:?} dropped");
            return None;
        };
        let obj_class = obj.class;
        let Some((_, spec)) = class::find_signal(obj_class, signal) else {
            warn!(
                "emit: class {} declares no signal {signal:?}, emission is a no-op",
                obj_class.name
            );
            return None;
        };
        if spec.shape != args.shape() {
            warn!(
                "emit: {signal:?} expects {:?} arguments, got {:?}",
                spec.shape,
                args.shape()
            );
            return None;
        }

        // Snapshot so handlers may connect/disconnect/destroy freely.
        let entries = obj.handlers.snapshot(spec.name);
        let mut handler_ret: Option<SignalValue> = None;
        for entry in entries {
            let receiver = entry.delegate.unwrap_or(id);
            if let Some(value) = (entry.func)(self, receiver, &args) {
                handler_ret = Some(value);
            }
            if !self.objects.contains(id) {
                // A handler destroyed the emitter; the default action has
                // nothing left to act on.
                return handler_ret;
            }
        }

        let mut default_ret: Option<SignalValue> = None;
        for action in class::default_actions(obj_class, spec.name) {
            if let Some(value) = action(self, id, &args) {
                default_ret = Some(value);
            }
            if !self.objects.contains(id) {
                break;
            }
        }

        handler_ret.or(default_ret)
    }

    // =========================================================================
    // Destruction
    // =========================================================================

    /// Destroy an object and, for containers, every descendant first
    /// (post-order). The "destroy" emission happens while the parent
    /// pointer is still set and the parent slot still live, so teardown
    /// handlers can inspect their surroundings.
    pub fn destroy(&mut self, id: ObjectId) {
        let Some(obj) = self.objects.get_mut(id) else {
            return;
        };
        if obj
            .flags
            .intersects(StateFlags::IN_DESTROY | StateFlags::DESTROYED)
        {
            return;
        }
        obj.flags.insert(StateFlags::IN_DESTROY);

        for child in core::container_children(self, id) {
            self.destroy(child);
        }

        self.emit(id, "destroy", SignalArgs::None);

        // Detach from the structural parent, if any survives.
        let parent = self
            .objects
            .get(id)
            .and_then(|o| o.widget.as_ref())
            .and_then(|w| w.parent);
        if let Some(parent) = parent {
            core::detach_child(self, parent, id);
        }

        self.windows.retain(|w| *w != id);
        if self.pointer_grab == Some(id) {
            self.pointer_grab = None;
        }

        notebook::release_page_handles(self, id);
        let handle = self
            .objects
            .get_mut(id)
            .and_then(|o| o.widget.as_mut())
            .and_then(|w| w.handle.take());
        if let Some(handle) = handle {
            self.handles.release(handle);
        }

        if let Some(obj) = self.objects.get_mut(id) {
            obj.flags.insert(StateFlags::DESTROYED);
        }
        self.objects.release(id);
    }

    // =========================================================================
    // Loop state
    // =========================================================================

    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn loop_depth(&self) -> u32 {
        self.loop_depth
    }

    pub(crate) fn enter_loop(&mut self) {
        self.loop_depth += 1;
    }

    pub(crate) fn leave_loop(&mut self) {
        self.loop_depth = self.loop_depth.saturating_sub(1);
    }
}
