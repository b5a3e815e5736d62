//! End-to-end scenarios across the public API: lifecycle ordering,
//! signal chaining, layout negotiation, sources.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use cinder_tui::layout::{box_layout, notebook, paned};
use cinder_tui::list::{model::ListModel, view, CellValue, ColumnType, ViewColumn};
use cinder_tui::widget::{controls, core, window};
use cinder_tui::{
    AccelKey, Continue, Orientation, Point, Rect, SignalArgs, Surface, Toolkit,
};

#[test]
fn destroy_runs_children_first_with_parent_still_linked() {
    let mut tk = Toolkit::new();
    let win = window::window_new(&mut tk, "Main");
    let root = box_layout::vbox_new(&mut tk, false, 0);
    let leaf = controls::label_new(&mut tk, "hello");
    box_layout::pack_start(&mut tk, root, leaf, false, false, 0);
    window::set_child(&mut tk, win, root);

    let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    for (id, name) in [(win, "win"), (root, "root"), (leaf, "leaf")] {
        let log = log.clone();
        tk.connect(id, "destroy", move |tk, id, _| {
            // The parent pointer must still be intact while "destroy"
            // handlers observe the widget.
            let parented = tk.widget(id).and_then(|w| w.parent).is_some();
            log.borrow_mut().push(format!("{name}:{parented}"));
            None
        });
    }

    tk.destroy(win);
    assert_eq!(
        log.borrow().as_slice(),
        ["leaf:true", "root:true", "win:false"]
    );
    assert!(!tk.is_alive(win));
    assert!(!tk.is_alive(root));
    assert!(!tk.is_alive(leaf));
}

#[test]
fn handler_return_beats_default_for_queries() {
    let mut tk = Toolkit::new();
    let win = window::window_new(&mut tk, "Main");
    tk.connect(win, "delete", |_, _, _| {
        Some(cinder_tui::SignalValue::Bool(true))
    });
    window::close(&mut tk, win);
    assert!(tk.is_alive(win));

    window::close(&mut tk, win);
    // Second close ran again; veto still holds.
    assert!(tk.is_alive(win));
}

#[test]
fn box_in_window_allocates_whole_terminal() {
    let mut tk = Toolkit::new();
    tk.surface = Surface::new(40, 12);
    let win = window::window_new(&mut tk, "Main");
    let root = box_layout::hbox_new(&mut tk, false, 1);
    let a = controls::button_new(&mut tk, "Left");
    let b = controls::button_new(&mut tk, "Right");
    box_layout::pack_start(&mut tk, root, a, true, true, 0);
    box_layout::pack_start(&mut tk, root, b, true, true, 0);
    window::set_child(&mut tk, win, root);
    core::show_all(&mut tk, win);

    let wa = tk.widget(a).unwrap().allocation;
    let wb = tk.widget(b).unwrap().allocation;
    assert_eq!(wa.height, 12);
    assert_eq!(wb.height, 12);
    // Spacing cell sits between the two expanded shares.
    assert_eq!(wa.width + wb.width + 1, 40);
    assert_eq!(wb.x, wa.width + 1);
}

#[test]
fn paned_position_clamps_and_splits() {
    let mut tk = Toolkit::new();
    let p = paned::paned_new(&mut tk, Orientation::Horizontal);
    paned::set_position(&mut tk, p, 150);
    assert_eq!(paned::position(&tk, p), 100);
    paned::set_position(&mut tk, p, -20);
    assert_eq!(paned::position(&tk, p), 0);
}

#[test]
fn notebook_switch_realizes_layout_for_new_page() {
    let mut tk = Toolkit::new();
    tk.surface = Surface::new(30, 10);
    let win = window::window_new(&mut tk, "Main");
    let nb = notebook::notebook_new(&mut tk);
    let one = controls::label_new(&mut tk, "one");
    let two = controls::label_new(&mut tk, "two");
    notebook::append_page(&mut tk, nb, one, "First");
    notebook::append_page(&mut tk, nb, two, "Second");
    window::set_child(&mut tk, win, nb);
    core::show_all(&mut tk, win);

    notebook::set_current_page(&mut tk, nb, 1);
    assert!(core::is_visible(&tk, two));
    assert!(!core::is_visible(&tk, one));
    // The incoming page owns the client area under the tab strip.
    assert_eq!(tk.widget(two).unwrap().allocation, Rect::new(0, 1, 30, 9));
}

#[test]
fn selection_remaps_across_sort() {
    let mut tk = Toolkit::new();
    let model = Rc::new(RefCell::new(ListModel::new(&[ColumnType::Text])));
    let mut rows = Vec::new();
    for name in ["zebra", "ant", "mole"] {
        let r = model.borrow_mut().append();
        model
            .borrow_mut()
            .set(r, &[(0, CellValue::Text(name.into()))]);
        rows.push(r);
    }
    let v = view::view_new(&mut tk, model.clone());
    view::append_column(&mut tk, v, ViewColumn::new("Name", 0));
    view::select(&mut tk, v, rows[0]); // zebra, index 0

    view::sort_by(&mut tk, v, 0);
    assert_eq!(model.borrow().index_of(rows[0]), Some(2));
    assert!(view::is_selected(&tk, v, rows[0]));
    assert_eq!(view::selected_rows(&tk, v), vec![rows[0]]);
}

#[test]
fn timer_callback_can_cancel_itself() {
    let mut tk = Toolkit::new();
    let slot: Rc<RefCell<Option<cinder_tui::SourceId>>> = Rc::new(RefCell::new(None));
    let fired = Rc::new(RefCell::new(0));
    let id = {
        let slot = slot.clone();
        let fired = fired.clone();
        tk.sources_mut().add_timer(Duration::from_millis(1), move |tk| {
            *fired.borrow_mut() += 1;
            if let Some(id) = *slot.borrow() {
                tk.sources_mut().remove(id);
            }
            Continue::Keep
        })
    };
    *slot.borrow_mut() = Some(id);

    // Drive the timer far past several intervals; the self-cancel must
    // hold after the first firing.
    cinder_tui::bridge::sources::fire_due_timers(&mut tk, Instant::now() + Duration::from_secs(1));
    cinder_tui::bridge::sources::fire_due_timers(&mut tk, Instant::now() + Duration::from_secs(2));
    assert_eq!(*fired.borrow(), 1);
    assert!(tk.sources().is_empty());
    // Cancelling the already-gone source again is a safe no-op.
    assert!(!tk.sources_mut().remove(id));
}

#[test]
fn accelerator_round_trip_fires_activate() {
    let mut tk = Toolkit::new();
    let win = window::window_new(&mut tk, "Main");
    let button = controls::button_new(&mut tk, "_Quit");
    let key = AccelKey::parse("<control>Q").unwrap();
    window::add_accelerator(&mut tk, win, key, button);

    let hits = Rc::new(RefCell::new(0));
    let h = hits.clone();
    tk.connect(button, "clicked", move |_, _, _| {
        *h.borrow_mut() += 1;
        None
    });
    assert!(window::activate_accel(&mut tk, win, AccelKey::ctrl('q')));
    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn swapped_connection_delivers_delegate() {
    let mut tk = Toolkit::new();
    let win = window::window_new(&mut tk, "Main");
    let button = controls::button_new(&mut tk, "Close");

    // Clicking the button destroys the window it was bound to.
    tk.connect_swapped(button, "clicked", win, |tk, delegate, _| {
        tk.destroy(delegate);
        None
    });
    controls::click(&mut tk, button);
    assert!(!tk.is_alive(win));
    assert!(tk.is_alive(button));
}

#[test]
fn emit_with_wrong_shape_is_dropped() {
    let mut tk = Toolkit::new();
    let win = window::window_new(&mut tk, "Main");
    let fired = Rc::new(RefCell::new(false));
    let f = fired.clone();
    tk.connect(win, "set_size", move |_, _, _| {
        *f.borrow_mut() = true;
        None
    });
    // "set_size" is Rect-shaped; an Index emission must not reach
    // handlers.
    tk.emit(win, "set_size", SignalArgs::Index(3));
    assert!(!*fired.borrow());
    tk.emit(win, "set_size", SignalArgs::Rect(Rect::new(0, 0, 10, 5)));
    assert!(*fired.borrow());
}

#[test]
fn pointer_geometry_helpers_agree() {
    let mut tk = Toolkit::new();
    let p = paned::paned_new(&mut tk, Orientation::Horizontal);
    let a = controls::label_new(&mut tk, "aaaaa");
    let b = controls::label_new(&mut tk, "bbbbb");
    paned::add1(&mut tk, p, a);
    paned::add2(&mut tk, p, b);
    core::show_all(&mut tk, p);
    core::size_request(&mut tk, p);
    core::set_allocation(&mut tk, p, Rect::new(0, 0, 21, 3));

    paned::drag_begin(&mut tk, p);
    paned::drag_update(&mut tk, p, Point::new(5, 1));
    paned::drag_commit(&mut tk, p);
    assert_eq!(paned::position(&tk, p), 25);
    assert_eq!(tk.widget(a).unwrap().allocation.width, 5);
}
