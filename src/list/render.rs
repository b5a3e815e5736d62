//! Owner-draw pass for the list view: header row, then one line per
//! visible model row, walking the column layout left to right.

use crossterm::style::Color;

use crate::list::view::{view_data, COLUMN_GAP};
use crate::object::instance::ObjectId;
use crate::render::{ellipsize, string_width, Style, Surface};
use crate::toolkit::Toolkit;
use crate::types::{Rect, TextAlign};

fn selected_style() -> Style {
    Style::new(Color::Black, Color::White)
}

/// Lay one cell's text into its column slot, honoring the column
/// alignment. Overlong text is ellipsized.
fn draw_cell(
    surface: &mut Surface,
    x: i32,
    y: i32,
    width: i32,
    text: &str,
    align: TextAlign,
    clip: Rect,
    style: Style,
) {
    if width <= 0 {
        return;
    }
    let text = ellipsize(text, width);
    let w = string_width(&text);
    let x = match align {
        TextAlign::Left => x,
        TextAlign::Center => x + (width - w) / 2,
        TextAlign::Right => x + width - w,
    };
    surface.draw_text(x, y, &text, clip, style);
}

pub fn draw_view(tk: &Toolkit, surface: &mut Surface, id: ObjectId, clip: Rect) {
    let Some(data) = view_data(tk, id) else {
        return;
    };
    let alloc = tk.widget(id).map(|w| w.allocation).unwrap_or(Rect::ZERO);
    if alloc.is_empty() {
        return;
    }
    let model = data.model.borrow();

    // Header.
    let header = Style::default().bold();
    let mut x = alloc.x;
    for column in &data.columns {
        draw_cell(
            surface,
            x,
            alloc.y,
            column.extent(),
            &column.title,
            column.align,
            clip,
            header,
        );
        x += column.extent() + COLUMN_GAP;
    }

    // Rows, from the scroll offset down to the allocation edge.
    let visible = (alloc.height - 1).max(0) as usize;
    for (line, index) in (data.offset..model.len()).take(visible).enumerate() {
        let Some(row) = model.row_at(index) else {
            break;
        };
        let y = alloc.y + 1 + line as i32;
        let style = if data.selection.contains(&row) {
            surface.fill(Rect::new(alloc.x, y, alloc.width, 1), clip, selected_style());
            selected_style()
        } else {
            Style::default()
        };
        let mut x = alloc.x;
        for column in &data.columns {
            let text = model
                .get(row, column.model_column)
                .map(|c| c.render())
                .unwrap_or_default();
            draw_cell(
                surface,
                x,
                y,
                column.extent(),
                &text,
                column.align,
                clip,
                style,
            );
            x += column.extent() + COLUMN_GAP;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::model::{CellValue, ColumnType, ListModel};
    use crate::list::view::{append_column, select, view_new, ViewColumn};
    use crate::widget::core;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn row_text(surface: &Surface, y: i32, width: i32) -> String {
        (0..width)
            .filter_map(|x| surface.get(x, y).map(|c| c.symbol.clone()))
            .collect()
    }

    #[test]
    fn header_then_rows_in_model_order() {
        let mut tk = Toolkit::new();
        let model = Rc::new(RefCell::new(ListModel::new(&[ColumnType::Text])));
        let a = model.borrow_mut().append();
        model.borrow_mut().set(a, &[(0, CellValue::Text("alpha".into()))]);
        let b = model.borrow_mut().append();
        model.borrow_mut().set(b, &[(0, CellValue::Text("beta".into()))]);

        let view = view_new(&mut tk, model);
        append_column(&mut tk, view, ViewColumn::new("Name", 0));
        core::show(&mut tk, view);
        core::size_request(&mut tk, view);
        core::set_allocation(&mut tk, view, Rect::new(0, 0, 10, 3));

        let mut surface = Surface::new(10, 3);
        let bounds = surface.bounds();
        draw_view(&tk, &mut surface, view, bounds);
        assert!(row_text(&surface, 0, 10).starts_with("Name"));
        assert!(row_text(&surface, 1, 10).starts_with("alpha"));
        assert!(row_text(&surface, 2, 10).starts_with("beta"));
    }

    #[test]
    fn selected_row_is_highlighted_full_width() {
        let mut tk = Toolkit::new();
        let model = Rc::new(RefCell::new(ListModel::new(&[ColumnType::Text])));
        let a = model.borrow_mut().append();
        model.borrow_mut().set(a, &[(0, CellValue::Text("pick".into()))]);

        let view = view_new(&mut tk, model);
        append_column(&mut tk, view, ViewColumn::new("Name", 0));
        select(&mut tk, view, a);
        core::show(&mut tk, view);
        core::size_request(&mut tk, view);
        core::set_allocation(&mut tk, view, Rect::new(0, 0, 8, 2));

        let mut surface = Surface::new(8, 2);
        let bounds = surface.bounds();
        draw_view(&tk, &mut surface, view, bounds);
        // Both the text cells and the trailing padding carry the
        // selection background.
        assert_eq!(surface.get(0, 1).unwrap().style, selected_style());
        assert_eq!(surface.get(7, 1).unwrap().style, selected_style());
    }
}
