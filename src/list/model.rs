//! Typed row storage behind the list view.
//!
//! Columns are declared once with a type; every cell write is checked
//! against its column and a mismatch is logged and dropped rather than
//! stored. Rows carry stable ids that survive sorting and removal of
//! other rows, so selection state can be kept by id instead of by index.

use std::cmp::Ordering;

use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Int,
    Bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl CellValue {
    pub fn column_type(&self) -> ColumnType {
        match self {
            CellValue::Text(_) => ColumnType::Text,
            CellValue::Int(_) => ColumnType::Int,
            CellValue::Bool(_) => ColumnType::Bool,
        }
    }

    fn default_for(ty: ColumnType) -> CellValue {
        match ty {
            ColumnType::Text => CellValue::Text(String::new()),
            ColumnType::Int => CellValue::Int(0),
            ColumnType::Bool => CellValue::Bool(false),
        }
    }

    /// Display form used by the owner-draw pass.
    pub fn render(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Int(v) => v.to_string(),
            CellValue::Bool(true) => "x".to_string(),
            CellValue::Bool(false) => String::new(),
        }
    }

    /// Natural ordering within one column; cross-type comparisons never
    /// happen because writes are type-checked.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Int(a), CellValue::Int(b)) => a.cmp(b),
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Stable row identity, never reused within one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

pub struct Row {
    pub id: RowId,
    cells: Vec<CellValue>,
}

pub struct ListModel {
    column_types: Vec<ColumnType>,
    rows: Vec<Row>,
    next_row: u64,
}

impl ListModel {
    pub fn new(column_types: &[ColumnType]) -> Self {
        Self {
            column_types: column_types.to_vec(),
            rows: Vec::new(),
            next_row: 0,
        }
    }

    pub fn n_columns(&self) -> usize {
        self.column_types.len()
    }

    pub fn column_type(&self, column: usize) -> Option<ColumnType> {
        self.column_types.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn fresh_row(&mut self) -> Row {
        let id = RowId(self.next_row);
        self.next_row += 1;
        Row {
            id,
            cells: self
                .column_types
                .iter()
                .map(|ty| CellValue::default_for(*ty))
                .collect(),
        }
    }

    /// Append an empty row and return its id.
    pub fn append(&mut self) -> RowId {
        let row = self.fresh_row();
        let id = row.id;
        self.rows.push(row);
        id
    }

    /// Insert an empty row before `index` (clamped to the end).
    pub fn insert(&mut self, index: usize) -> RowId {
        let row = self.fresh_row();
        let id = row.id;
        let index = index.min(self.rows.len());
        self.rows.insert(index, row);
        id
    }

    /// Write `(column, value)` pairs to a row. Each value must match its
    /// column's declared type; mismatches are logged and skipped.
    pub fn set(&mut self, row: RowId, pairs: &[(usize, CellValue)]) {
        let Some(target) = self.rows.iter_mut().find(|r| r.id == row) else {
            warn!("model set: row {row:?} does not exist");
            return;
        };
        for (column, value) in pairs {
            match self.column_types.get(*column) {
                Some(ty) if *ty == value.column_type() => {
                    target.cells[*column] = value.clone();
                }
                Some(ty) => {
                    warn!(
                        "model set: column {column} is {ty:?}, got {:?}; value dropped",
                        value.column_type()
                    );
                }
                None => {
                    warn!("model set: column {column} out of range");
                }
            }
        }
    }

    pub fn get(&self, row: RowId, column: usize) -> Option<&CellValue> {
        self.rows
            .iter()
            .find(|r| r.id == row)
            .and_then(|r| r.cells.get(column))
    }

    pub fn remove(&mut self, row: RowId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|r| r.id != row);
        self.rows.len() != before
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Current display position of a row.
    pub fn index_of(&self, row: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == row)
    }

    pub fn row_at(&self, index: usize) -> Option<RowId> {
        self.rows.get(index).map(|r| r.id)
    }

    /// Row ids in display order.
    pub fn iter(&self) -> impl Iterator<Item = RowId> + '_ {
        self.rows.iter().map(|r| r.id)
    }

    /// Stable sort by one column. Equal cells keep their relative order,
    /// and row ids are untouched.
    pub fn sort_by_column(&mut self, column: usize, descending: bool) {
        if column >= self.column_types.len() {
            warn!("model sort: column {column} out of range");
            return;
        }
        self.rows.sort_by(|a, b| {
            let ord = a.cells[column].compare(&b.cells[column]);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (ListModel, RowId, RowId, RowId) {
        let mut m = ListModel::new(&[ColumnType::Text, ColumnType::Int]);
        let a = m.append();
        let b = m.append();
        let c = m.append();
        m.set(a, &[(0, CellValue::Text("cherry".into())), (1, CellValue::Int(3))]);
        m.set(b, &[(0, CellValue::Text("apple".into())), (1, CellValue::Int(1))]);
        m.set(c, &[(0, CellValue::Text("banana".into())), (1, CellValue::Int(2))]);
        (m, a, b, c)
    }

    #[test]
    fn type_mismatch_is_dropped() {
        let mut m = ListModel::new(&[ColumnType::Int]);
        let r = m.append();
        m.set(r, &[(0, CellValue::Text("nope".into()))]);
        assert_eq!(m.get(r, 0), Some(&CellValue::Int(0)));
    }

    #[test]
    fn sort_reorders_indices_not_ids() {
        let (mut m, a, b, c) = sample();
        m.sort_by_column(0, false);
        assert_eq!(m.row_at(0), Some(b));
        assert_eq!(m.row_at(1), Some(c));
        assert_eq!(m.row_at(2), Some(a));
        // Cell access by id is unaffected by display order.
        assert_eq!(m.get(a, 1), Some(&CellValue::Int(3)));
    }

    #[test]
    fn sort_descending_by_int() {
        let (mut m, a, _, _) = sample();
        m.sort_by_column(1, true);
        assert_eq!(m.row_at(0), Some(a));
    }

    #[test]
    fn insert_clamps_index() {
        let mut m = ListModel::new(&[ColumnType::Text]);
        let a = m.append();
        let b = m.insert(99);
        assert_eq!(m.index_of(a), Some(0));
        assert_eq!(m.index_of(b), Some(1));
    }

    #[test]
    fn remove_reports_presence() {
        let (mut m, a, _, _) = sample();
        assert!(m.remove(a));
        assert!(!m.remove(a));
        assert_eq!(m.len(), 2);
    }
}
