//! Owner-drawn list view: visible columns over a shared model.
//!
//! The view never copies row data; it borrows the model at draw and
//! measure time. Selection is a set of stable row ids, so sorting the
//! model reorders what is on screen without touching what is selected.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::bridge::message::{NativeMessage, NotifyCode};
use crate::list::model::{ListModel, RowId};
use crate::object::class::{ChainPolicy, ClassDescriptor, SignalSpec};
use crate::object::instance::ObjectId;
use crate::object::signal::{SignalArgs, SignalShape, SignalValue};
use crate::render::string_width;
use crate::toolkit::Toolkit;
use crate::types::{Point, Size, TextAlign};
use crate::widget::core::{self, ClassData, WidgetCore, WIDGET_CLASS};

/// Gap between columns, in cells.
pub(crate) const COLUMN_GAP: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnWidth {
    Fixed(i32),
    /// Track the widest cell seen so far.
    Auto,
}

pub struct ViewColumn {
    pub title: String,
    pub model_column: usize,
    pub width: ColumnWidth,
    pub align: TextAlign,
    /// Running content width for auto columns, never narrower than the
    /// title.
    pub(crate) auto_width: i32,
}

impl ViewColumn {
    pub fn new(title: &str, model_column: usize) -> Self {
        Self {
            title: title.to_string(),
            model_column,
            width: ColumnWidth::Auto,
            align: TextAlign::Left,
            auto_width: string_width(title),
        }
    }

    pub fn fixed(mut self, width: i32) -> Self {
        self.width = ColumnWidth::Fixed(width.max(0));
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub(crate) fn extent(&self) -> i32 {
        match self.width {
            ColumnWidth::Fixed(w) => w,
            ColumnWidth::Auto => self.auto_width,
        }
    }
}

pub struct ListViewData {
    pub model: Rc<RefCell<ListModel>>,
    pub columns: Vec<ViewColumn>,
    pub selection: FxHashSet<RowId>,
    /// First visible row index.
    pub offset: usize,
    /// Active sort: view column index and descending flag.
    pub sort: Option<(usize, bool)>,
}

pub static LISTVIEW_CLASS: ClassDescriptor = ClassDescriptor {
    name: "ListView",
    parent: Some(&WIDGET_CLASS),
    signals: &[
        SignalSpec {
            name: "select_row",
            shape: SignalShape::RowColumnEvent,
            chain: ChainPolicy::Nearest,
            default_action: None,
        },
        SignalSpec {
            name: "row_activated",
            shape: SignalShape::Index,
            chain: ChainPolicy::Nearest,
            default_action: None,
        },
        SignalSpec {
            name: "column_clicked",
            shape: SignalShape::Index,
            chain: ChainPolicy::Nearest,
            default_action: Some(column_clicked_default),
        },
    ],
    native_handler: Some(view_native),
};

pub fn view_new(tk: &mut Toolkit, model: Rc<RefCell<ListModel>>) -> ObjectId {
    tk.new_object(
        &LISTVIEW_CLASS,
        Some(WidgetCore::default()),
        ClassData::ListView(ListViewData {
            model,
            columns: Vec::new(),
            selection: FxHashSet::default(),
            offset: 0,
            sort: None,
        }),
    )
}

pub(crate) fn view_data(tk: &Toolkit, id: ObjectId) -> Option<&ListViewData> {
    match tk.object(id).map(|o| &o.data) {
        Some(ClassData::ListView(d)) => Some(d),
        _ => None,
    }
}

pub(crate) fn view_data_mut(tk: &mut Toolkit, id: ObjectId) -> Option<&mut ListViewData> {
    match tk.object_mut(id).map(|o| &mut o.data) {
        Some(ClassData::ListView(d)) => Some(d),
        _ => None,
    }
}

// =============================================================================
// Columns
// =============================================================================

pub fn append_column(tk: &mut Toolkit, id: ObjectId, column: ViewColumn) -> usize {
    let index = match view_data_mut(tk, id) {
        Some(data) => {
            data.columns.push(column);
            data.columns.len() - 1
        }
        None => return 0,
    };
    refresh_column_width(tk, id, index);
    core::queue_resize(tk, id);
    index
}

/// Recompute one auto column's running width from the whole model.
fn refresh_column_width(tk: &mut Toolkit, id: ObjectId, index: usize) {
    let Some(data) = view_data_mut(tk, id) else {
        return;
    };
    let Some(column) = data.columns.get(index) else {
        return;
    };
    if column.width != ColumnWidth::Auto {
        return;
    }
    let model_column = column.model_column;
    let mut widest = string_width(&column.title);
    {
        let model = data.model.borrow();
        for row in model.iter() {
            if let Some(cell) = model.get(row, model_column) {
                widest = widest.max(string_width(&cell.render()));
            }
        }
    }
    if let Some(column) = data.columns.get_mut(index) {
        column.auto_width = widest;
    }
}

/// Grow auto columns to fit one row's cells. The cheap path for
/// append-heavy models; never shrinks.
pub fn note_row(tk: &mut Toolkit, id: ObjectId, row: RowId) {
    let Some(data) = view_data_mut(tk, id) else {
        return;
    };
    let model = data.model.clone();
    let model = model.borrow();
    for column in &mut data.columns {
        if column.width != ColumnWidth::Auto {
            continue;
        }
        if let Some(cell) = model.get(row, column.model_column) {
            column.auto_width = column.auto_width.max(string_width(&cell.render()));
        }
    }
}

// =============================================================================
// Selection
// =============================================================================

pub fn is_selected(tk: &Toolkit, id: ObjectId, row: RowId) -> bool {
    view_data(tk, id).is_some_and(|d| d.selection.contains(&row))
}

/// Select a row and report it. Selecting an already selected row is a
/// no-op.
pub fn select(tk: &mut Toolkit, id: ObjectId, row: RowId) {
    let Some(data) = view_data_mut(tk, id) else {
        return;
    };
    if !data.selection.insert(row) {
        return;
    }
    let index = data.model.borrow().index_of(row).unwrap_or(0);
    tk.emit(
        id,
        "select_row",
        SignalArgs::RowColumnEvent {
            row: index,
            column: 0,
            event: Point::new(0, 0),
        },
    );
}

pub fn unselect(tk: &mut Toolkit, id: ObjectId, row: RowId) {
    if let Some(data) = view_data_mut(tk, id) {
        data.selection.remove(&row);
    }
}

pub fn clear_selection(tk: &mut Toolkit, id: ObjectId) {
    if let Some(data) = view_data_mut(tk, id) {
        data.selection.clear();
    }
}

/// Selected rows in current display order.
pub fn selected_rows(tk: &Toolkit, id: ObjectId) -> Vec<RowId> {
    let Some(data) = view_data(tk, id) else {
        return Vec::new();
    };
    let model = data.model.borrow();
    model.iter().filter(|r| data.selection.contains(r)).collect()
}

/// Drop selection entries whose rows left the model.
pub fn prune_selection(tk: &mut Toolkit, id: ObjectId) {
    if let Some(data) = view_data_mut(tk, id) {
        let model = data.model.clone();
        let model = model.borrow();
        data.selection.retain(|r| model.index_of(*r).is_some());
    }
}

// =============================================================================
// Sorting & scrolling
// =============================================================================

/// Sort by a view column. A repeat click on the same column flips the
/// direction. Selection survives because it is keyed by row id.
pub fn sort_by(tk: &mut Toolkit, id: ObjectId, column: usize) {
    let Some(data) = view_data_mut(tk, id) else {
        return;
    };
    let Some(view_column) = data.columns.get(column) else {
        return;
    };
    let model_column = view_column.model_column;
    let descending = match data.sort {
        Some((prev, desc)) if prev == column => !desc,
        _ => false,
    };
    data.sort = Some((column, descending));
    data.model.borrow_mut().sort_by_column(model_column, descending);
}

fn column_clicked_default(tk: &mut Toolkit, id: ObjectId, args: &SignalArgs) -> Option<SignalValue> {
    if let Some(index) = args.as_index() {
        sort_by(tk, id, index);
    }
    None
}

/// Make `index` the first visible row, clamped to the model.
pub fn scroll_to(tk: &mut Toolkit, id: ObjectId, index: usize) {
    if let Some(data) = view_data_mut(tk, id) {
        let len = data.model.borrow().len();
        data.offset = index.min(len.saturating_sub(1));
    }
}

// =============================================================================
// Geometry & native routing
// =============================================================================

/// One row per model entry plus the header.
pub fn size_request(tk: &mut Toolkit, id: ObjectId) -> Size {
    let Some(data) = view_data(tk, id) else {
        return Size::ZERO;
    };
    let width: i32 = data.columns.iter().map(|c| c.extent()).sum::<i32>()
        + COLUMN_GAP * (data.columns.len().saturating_sub(1)) as i32;
    let height = data.model.borrow().len() as i32 + 1;
    Size::new(width, height)
}

/// Display row index under a surface point, if any.
pub fn row_at_point(tk: &Toolkit, id: ObjectId, point: Point) -> Option<usize> {
    let data = view_data(tk, id)?;
    let alloc = tk.widget(id)?.allocation;
    if !alloc.contains(point) || point.y == alloc.y {
        return None;
    }
    let index = data.offset + (point.y - alloc.y - 1) as usize;
    (index < data.model.borrow().len()).then_some(index)
}

/// Class-level native routing: owner-draw requests are satisfied by the
/// paint pass, notify codes become signals.
fn view_native(tk: &mut Toolkit, id: ObjectId, msg: &NativeMessage) -> bool {
    match msg {
        NativeMessage::DrawItem { .. } => true,
        NativeMessage::Notify { code, .. } => match code {
            // Selection state already lives in the view; the notify
            // carries nothing to emit, so the default route logs it.
            NotifyCode::SelectionChanged => false,
            NotifyCode::ItemActivated => {
                let current = view_data(tk, id).and_then(|d| {
                    let model = d.model.borrow();
                    d.selection.iter().filter_map(|r| model.index_of(*r)).min()
                });
                if let Some(index) = current {
                    tk.emit(id, "row_activated", SignalArgs::Index(index));
                }
                true
            }
            NotifyCode::ColumnClicked(index) => {
                tk.emit(id, "column_clicked", SignalArgs::Index(*index));
                true
            }
            NotifyCode::HeaderEndTrack(index) => {
                refresh_column_width(tk, id, *index);
                true
            }
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::model::{CellValue, ColumnType};

    fn fruit_view(tk: &mut Toolkit) -> (ObjectId, Rc<RefCell<ListModel>>, Vec<RowId>) {
        let model = Rc::new(RefCell::new(ListModel::new(&[
            ColumnType::Text,
            ColumnType::Int,
        ])));
        let mut rows = Vec::new();
        for (name, n) in [("cherry", 3), ("apple", 1), ("banana", 2)] {
            let r = model.borrow_mut().append();
            model
                .borrow_mut()
                .set(r, &[(0, CellValue::Text(name.into())), (1, CellValue::Int(n))]);
            rows.push(r);
        }
        let view = view_new(tk, model.clone());
        append_column(tk, view, ViewColumn::new("Name", 0));
        append_column(tk, view, ViewColumn::new("Qty", 1).fixed(5));
        (view, model, rows)
    }

    #[test]
    fn auto_width_tracks_widest_cell() {
        let mut tk = Toolkit::new();
        let (view, model, _) = fruit_view(&mut tk);
        // "cherry"/"banana" are 6 wide, wider than the "Name" title.
        assert_eq!(view_data(&tk, view).unwrap().columns[0].extent(), 6);

        let r = model.borrow_mut().append();
        model
            .borrow_mut()
            .set(r, &[(0, CellValue::Text("dragonfruit".into()))]);
        note_row(&mut tk, view, r);
        assert_eq!(view_data(&tk, view).unwrap().columns[0].extent(), 11);
    }

    #[test]
    fn requisition_counts_header_and_gap() {
        let mut tk = Toolkit::new();
        let (view, _, _) = fruit_view(&mut tk);
        // 6 (auto) + 1 gap + 5 (fixed) wide, 3 rows + header tall.
        assert_eq!(core::size_request(&mut tk, view), Size::new(12, 4));
    }

    #[test]
    fn selection_survives_sort() {
        let mut tk = Toolkit::new();
        let (view, model, rows) = fruit_view(&mut tk);
        let cherry = rows[0];
        select(&mut tk, view, cherry);
        assert_eq!(model.borrow().index_of(cherry), Some(0));

        sort_by(&mut tk, view, 0);
        // "cherry" moved to the bottom; still the selected row.
        assert_eq!(model.borrow().index_of(cherry), Some(2));
        assert!(is_selected(&tk, view, cherry));
        assert_eq!(selected_rows(&tk, view), vec![cherry]);
    }

    #[test]
    fn repeat_sort_flips_direction() {
        let mut tk = Toolkit::new();
        let (view, model, rows) = fruit_view(&mut tk);
        sort_by(&mut tk, view, 1);
        assert_eq!(model.borrow().row_at(0), Some(rows[1])); // apple, 1
        sort_by(&mut tk, view, 1);
        assert_eq!(model.borrow().row_at(0), Some(rows[0])); // cherry, 3
    }

    #[test]
    fn select_emits_display_index() {
        let mut tk = Toolkit::new();
        let (view, _, rows) = fruit_view(&mut tk);
        let seen = Rc::new(std::cell::Cell::new(usize::MAX));
        let s = seen.clone();
        tk.connect(view, "select_row", move |_, _, args| {
            if let SignalArgs::RowColumnEvent { row, .. } = args {
                s.set(*row);
            }
            None
        });
        select(&mut tk, view, rows[2]);
        assert_eq!(seen.get(), 2);
        // Re-selecting does not re-emit.
        seen.set(usize::MAX);
        select(&mut tk, view, rows[2]);
        assert_eq!(seen.get(), usize::MAX);
    }

    #[test]
    fn notify_codes_route_or_decline() {
        let mut tk = Toolkit::new();
        let (view, _, rows) = fruit_view(&mut tk);
        let handle = tk
            .handles
            .create(crate::bridge::native::HandleKind::Control, Some(view))
            .unwrap();

        // Activation reports the selected row's display index.
        select(&mut tk, view, rows[1]);
        let seen = Rc::new(std::cell::Cell::new(usize::MAX));
        let s = seen.clone();
        tk.connect(view, "row_activated", move |_, _, args| {
            if let SignalArgs::Index(i) = args {
                s.set(*i);
            }
            None
        });
        let activated = NativeMessage::Notify {
            handle,
            code: NotifyCode::ItemActivated,
        };
        assert!(view_native(&mut tk, view, &activated));
        assert_eq!(seen.get(), 1);

        // Selection-changed carries nothing; it is left to the default
        // route instead of being consumed silently.
        let changed = NativeMessage::Notify {
            handle,
            code: NotifyCode::SelectionChanged,
        };
        assert!(!view_native(&mut tk, view, &changed));
    }

    #[test]
    fn prune_drops_removed_rows() {
        let mut tk = Toolkit::new();
        let (view, model, rows) = fruit_view(&mut tk);
        select(&mut tk, view, rows[0]);
        select(&mut tk, view, rows[1]);
        model.borrow_mut().remove(rows[0]);
        prune_selection(&mut tk, view);
        assert_eq!(selected_rows(&tk, view), vec![rows[1]]);
    }
}
