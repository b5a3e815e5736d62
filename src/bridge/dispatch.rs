//! Message routing and the event loop.
//!
//! Every normalized message goes through [`dispatch`]: the target class's
//! native handler is consulted first and may consume the message; what it
//! declines falls through to the default routing (re-layout on resize,
//! signal emission for commands, the close query, source firing).
//!
//! The loop nests for modal dialogs. Nested loops keep servicing keys and
//! timers but drop socket readiness, so modal UI never re-enters
//! application I/O callbacks.

use std::time::{Duration, Instant};

use crossterm::event::{self, KeyCode, KeyEvent, KeyModifiers};
use log::debug;

use crate::accel::AccelKey;
use crate::bridge::message::{translate, CommandCode, NativeMessage};
use crate::bridge::native::{HandleId, TerminalSession};
use crate::bridge::sources;
use crate::error::{Error, Result};
use crate::layout::paned;
use crate::object::class;
use crate::object::instance::ObjectId;
use crate::object::signal::SignalArgs;
use crate::render::Surface;
use crate::toolkit::Toolkit;
use crate::types::Point;
use crate::widget::core::{self, WidgetKind};
use crate::widget::{controls, window};
use crate::list;

const MAX_LOOP_DEPTH: u32 = 8;

/// Poll granularity when no timer is armed.
const IDLE_POLL: Duration = Duration::from_millis(50);

// =============================================================================
// Dispatch
// =============================================================================

/// Route one message: class native handler first, default routing second.
pub fn dispatch(tk: &mut Toolkit, msg: &NativeMessage) {
    if let Some(id) = target_of(tk, msg) {
        let handler = tk.class_of(id).and_then(class::find_native_handler);
        if let Some(handler) = handler {
            if handler(tk, id, msg) {
                return;
            }
        }
    }
    default_route(tk, msg);
}

/// Resolve a handle-carrying message to its widget via the handle's
/// user-data back-pointer.
fn target_of(tk: &Toolkit, msg: &NativeMessage) -> Option<ObjectId> {
    let handle: HandleId = match msg {
        NativeMessage::Command { handle, .. }
        | NativeMessage::Notify { handle, .. }
        | NativeMessage::DrawItem { handle, .. }
        | NativeMessage::Close { handle } => *handle,
        _ => return None,
    };
    tk.handles.user_data(handle)
}

fn default_route(tk: &mut Toolkit, msg: &NativeMessage) {
    match msg {
        NativeMessage::Resize { width, height } => {
            tk.surface.resize(*width, *height);
            layout_windows(tk);
        }
        NativeMessage::Paint | NativeMessage::DrawItem { .. } => paint(tk),
        NativeMessage::Key(key) => route_key(tk, key),
        NativeMessage::Pointer(p) => route_pointer(tk, *p),
        NativeMessage::PointerDrag(p) => route_pointer_drag(tk, *p),
        NativeMessage::PointerUp(p) => route_pointer_up(tk, *p),
        NativeMessage::Command { code, .. } => {
            if let Some(id) = target_of(tk, msg) {
                match code {
                    CommandCode::Clicked | CommandCode::Toggled => {
                        tk.emit(id, "activate", SignalArgs::None);
                    }
                }
            }
        }
        NativeMessage::Notify { code, .. } => {
            debug!("notify {code:?} had no class handler; dropped");
        }
        NativeMessage::Close { .. } => {
            if let Some(id) = target_of(tk, msg) {
                window::close(tk, id);
            }
        }
        NativeMessage::Timer { source } => sources::fire_timer(tk, *source, Instant::now()),
        NativeMessage::SocketReady { source, condition } => {
            sources::fire_watch(tk, *source, *condition)
        }
    }
}

/// Re-measure and re-place every toplevel against the current surface.
pub fn layout_windows(tk: &mut Toolkit) {
    let bounds = tk.surface.bounds();
    for win in tk.windows().to_vec() {
        core::size_request(tk, win);
        core::set_allocation(tk, win, bounds);
    }
}

/// Redraw every visible toplevel into the shared surface.
pub fn paint(tk: &mut Toolkit) {
    let mut surface = std::mem::replace(&mut tk.surface, Surface::new(0, 0));
    let bounds = surface.bounds();
    surface.fill(bounds, bounds, crate::render::Style::default());
    for win in tk.windows().to_vec() {
        core::draw_widget(tk, &mut surface, win, bounds);
    }
    tk.surface = surface;
}

// =============================================================================
// Input routing
// =============================================================================

/// Keys try the active window's accelerator table; Ctrl+C always quits.
fn route_key(tk: &mut Toolkit, key: &KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        tk.request_quit();
        return;
    }
    let Some(accel) = AccelKey::from_event(key) else {
        return;
    };
    if let Some(&active) = tk.windows().last() {
        window::activate_accel(tk, active, accel);
    }
}

/// Deepest visible widget whose allocation contains the point.
fn hit_test(tk: &Toolkit, id: ObjectId, p: Point) -> Option<ObjectId> {
    if !core::is_visible(tk, id) {
        return None;
    }
    let alloc = tk.widget(id)?.allocation;
    if !alloc.contains(p) {
        return None;
    }
    for child in core::container_children(tk, id) {
        if let Some(hit) = hit_test(tk, child, p) {
            return Some(hit);
        }
    }
    Some(id)
}

fn route_pointer(tk: &mut Toolkit, p: Point) {
    let Some(&active) = tk.windows().last() else {
        return;
    };
    let Some(hit) = hit_test(tk, active, p) else {
        return;
    };
    match tk.object(hit).map(|o| o.data.kind()) {
        Some(WidgetKind::Button | WidgetKind::Toggle) => controls::click(tk, hit),
        Some(WidgetKind::Paned) => {
            // The divider cell belongs to the paned itself, never a
            // child, so hitting it starts a drag.
            paned::drag_begin(tk, hit);
            tk.pointer_grab = Some(hit);
        }
        Some(WidgetKind::ListView) => {
            let row = list::view::row_at_point(tk, hit, p).and_then(|index| {
                list::view::view_data(tk, hit)
                    .and_then(|d| d.model.borrow().row_at(index))
            });
            if let Some(row) = row {
                list::view::clear_selection(tk, hit);
                list::view::select(tk, hit, row);
            }
        }
        _ => {}
    }
}

/// Feed drag motion to the widget that grabbed the pointer on press.
fn route_pointer_drag(tk: &mut Toolkit, p: Point) {
    let Some(grab) = tk.pointer_grab else {
        return;
    };
    if tk.object(grab).map(|o| o.data.kind()) == Some(WidgetKind::Paned) {
        paned::drag_update(tk, grab, p);
    }
}

/// Release ends the grab; a paned drag commits at the final position.
fn route_pointer_up(tk: &mut Toolkit, p: Point) {
    let Some(grab) = tk.pointer_grab.take() else {
        return;
    };
    if tk.object(grab).map(|o| o.data.kind()) == Some(WidgetKind::Paned) {
        paned::drag_update(tk, grab, p);
        paned::drag_commit(tk, grab);
    }
}

// =============================================================================
// Event loop
// =============================================================================

/// Run until quit is requested or the last window closes. Owns the
/// terminal session for its whole lifetime.
pub fn run(tk: &mut Toolkit) -> Result<()> {
    let mut session = TerminalSession::init()?;
    let (w, h) = session.size()?;
    tk.surface.resize(w, h);
    layout_windows(tk);
    event_loop(tk, &mut session)
}

/// Re-enter the loop for a modal dialog, on the already-live session.
pub fn run_nested(tk: &mut Toolkit, session: &mut TerminalSession) -> Result<()> {
    event_loop(tk, session)
}

fn event_loop(tk: &mut Toolkit, session: &mut TerminalSession) -> Result<()> {
    if tk.loop_depth() >= MAX_LOOP_DEPTH {
        return Err(Error::LoopReentered(tk.loop_depth()));
    }
    tk.enter_loop();
    let result = loop_turns(tk, session);
    tk.leave_loop();
    result
}

fn loop_turns(tk: &mut Toolkit, session: &mut TerminalSession) -> Result<()> {
    while !tk.quit_requested() && !tk.windows().is_empty() {
        paint(tk);
        tk.surface.flush(session.writer())?;

        if event::poll(poll_timeout(tk))? {
            if let Some(msg) = translate(event::read()?) {
                dispatch(tk, &msg);
            }
        }
        sources::fire_due_timers(tk, Instant::now());
        poll_sockets(tk);
    }
    Ok(())
}

fn poll_timeout(tk: &Toolkit) -> Duration {
    match tk.sources.next_deadline() {
        Some(deadline) => deadline
            .saturating_duration_since(Instant::now())
            .min(IDLE_POLL),
        None => IDLE_POLL,
    }
}

/// Poll watched descriptors without blocking and fire what is ready.
/// Only the outermost loop services sockets.
#[cfg(unix)]
fn poll_sockets(tk: &mut Toolkit) {
    use crate::bridge::sources::IoCondition;

    if tk.loop_depth() > 1 {
        return;
    }
    let fds = tk.sources.watch_fds();
    if fds.is_empty() {
        return;
    }
    let mut pollfds: Vec<libc::pollfd> = fds
        .iter()
        .map(|(_, fd, cond)| {
            let mut events: libc::c_short = 0;
            if cond.contains(IoCondition::READ) {
                events |= libc::POLLIN;
            }
            if cond.contains(IoCondition::WRITE) {
                events |= libc::POLLOUT;
            }
            libc::pollfd {
                fd: *fd,
                events,
                revents: 0,
            }
        })
        .collect();

    let n = unsafe { libc::poll(pollfds.as_mut_ptr(), pollfds.len() as libc::nfds_t, 0) };
    if n <= 0 {
        return;
    }
    for (i, pfd) in pollfds.iter().enumerate() {
        let mut ready = IoCondition::empty();
        if pfd.revents & libc::POLLIN != 0 {
            ready |= IoCondition::READ;
        }
        if pfd.revents & libc::POLLOUT != 0 {
            ready |= IoCondition::WRITE;
        }
        if !ready.is_empty() {
            sources::fire_watch(tk, fds[i].0, ready);
        }
    }
}

#[cfg(not(unix))]
fn poll_sockets(_tk: &mut Toolkit) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::box_layout;
    use crate::types::{Orientation, Rect};
    use crate::widget::core::{set_size_request, show_all, widget_new};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn resize_relays_out_every_window() {
        let mut tk = Toolkit::new();
        let win = window::window_new(&mut tk, "Main");
        let root = box_layout::vbox_new(&mut tk, false, 0);
        let child = widget_new(&mut tk);
        set_size_request(&mut tk, child, 5, 1);
        box_layout::pack_start(&mut tk, root, child, false, false, 0);
        window::set_child(&mut tk, win, root);
        show_all(&mut tk, win);

        dispatch(
            &mut tk,
            &NativeMessage::Resize {
                width: 60,
                height: 20,
            },
        );
        assert_eq!(tk.widget(win).unwrap().allocation, Rect::new(0, 0, 60, 20));
        assert_eq!(tk.widget(root).unwrap().allocation, Rect::new(0, 0, 60, 20));
    }

    #[test]
    fn command_message_activates_target() {
        let mut tk = Toolkit::new();
        let button = controls::button_new(&mut tk, "OK");
        core::realize(&mut tk, button);
        let handle = tk.widget(button).unwrap().handle.unwrap();

        let clicks = Rc::new(Cell::new(0));
        let c = clicks.clone();
        tk.connect(button, "clicked", move |_, _, _| {
            c.set(c.get() + 1);
            None
        });
        dispatch(
            &mut tk,
            &NativeMessage::Command {
                handle,
                code: CommandCode::Clicked,
            },
        );
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn close_message_runs_the_delete_query() {
        let mut tk = Toolkit::new();
        let win = window::window_new(&mut tk, "Main");
        core::realize(&mut tk, win);
        let handle = tk.widget(win).unwrap().handle.unwrap();

        dispatch(&mut tk, &NativeMessage::Close { handle });
        assert!(!tk.is_alive(win));
        assert!(tk.windows().is_empty());
    }

    #[test]
    fn pointer_hit_clicks_buttons() {
        let mut tk = Toolkit::new();
        tk.surface = Surface::new(40, 10);
        let win = window::window_new(&mut tk, "Main");
        let root = box_layout::vbox_new(&mut tk, false, 0);
        let button = controls::button_new(&mut tk, "OK");
        box_layout::pack_start(&mut tk, root, button, false, false, 0);
        window::set_child(&mut tk, win, root);
        show_all(&mut tk, win);

        let clicks = Rc::new(Cell::new(0));
        let c = clicks.clone();
        tk.connect(button, "clicked", move |_, _, _| {
            c.set(c.get() + 1);
            None
        });
        let alloc = tk.widget(button).unwrap().allocation;
        route_pointer(&mut tk, Point::new(alloc.x, alloc.y));
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn mnemonic_key_activates_labeled_button() {
        let mut tk = Toolkit::new();
        tk.surface = Surface::new(30, 5);
        let win = window::window_new(&mut tk, "Main");
        let root = box_layout::vbox_new(&mut tk, false, 0);
        let button = controls::button_new(&mut tk, "_New");
        box_layout::pack_start(&mut tk, root, button, false, false, 0);
        window::set_child(&mut tk, win, root);
        show_all(&mut tk, win);

        let clicks = Rc::new(Cell::new(0));
        let c = clicks.clone();
        tk.connect(button, "clicked", move |_, _, _| {
            c.set(c.get() + 1);
            None
        });
        let key = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE);
        route_key(&mut tk, &key);
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn divider_drag_previews_and_commits_on_release() {
        let mut tk = Toolkit::new();
        tk.surface = Surface::new(41, 10);
        let win = window::window_new(&mut tk, "Main");
        let split = paned::paned_new(&mut tk, Orientation::Horizontal);
        let a = widget_new(&mut tk);
        let b = widget_new(&mut tk);
        set_size_request(&mut tk, a, 5, 1);
        set_size_request(&mut tk, b, 5, 1);
        paned::add1(&mut tk, split, a);
        paned::add2(&mut tk, split, b);
        window::set_child(&mut tk, win, split);
        show_all(&mut tk, win);

        // The press lands on the divider cell: x = 20 at a 50% split of
        // the 40 usable columns.
        dispatch(&mut tk, &NativeMessage::Pointer(Point::new(20, 5)));
        dispatch(&mut tk, &NativeMessage::PointerDrag(Point::new(10, 5)));
        assert_eq!(paned::ghost_position(&tk, split), Some(25));
        assert_eq!(paned::position(&tk, split), 50);

        dispatch(&mut tk, &NativeMessage::PointerUp(Point::new(10, 5)));
        assert_eq!(paned::position(&tk, split), 25);
        assert_eq!(tk.widget(a).unwrap().allocation.width, 10);
    }

    #[test]
    fn ctrl_c_requests_quit() {
        let mut tk = Toolkit::new();
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        route_key(&mut tk, &key);
        assert!(tk.quit_requested());
    }

    #[test]
    fn hit_test_skips_invisible_widgets() {
        let mut tk = Toolkit::new();
        let sep = controls::separator_new(&mut tk, Orientation::Horizontal);
        assert_eq!(hit_test(&tk, sep, Point::new(0, 0)), None);
    }
}
