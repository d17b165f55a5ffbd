//! Render-ready view models produced by projection.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::address::{column_address, column_index};

/// Reserved row key holding the 1-based display row index.
pub const ROW_INDEX_KEY: &str = "rowIndex";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditMode {
    #[default]
    Clean,
    Editing,
}

/// One data cell of a projected row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    /// 1-based display row index.
    pub row_index: String,
    pub raw_value: String,
    pub computed_value: String,
    pub edit_mode: EditMode,
}

impl GridCell {
    /// Blank cell for a sparse gap.
    pub fn blank(row: usize) -> Self {
        Self {
            row_index: display_row(row),
            ..Self::default()
        }
    }

    /// The text a grid shows: raw input while editing, computed value otherwise.
    pub fn display_value(&self) -> &str {
        match self.edit_mode {
            EditMode::Editing => &self.raw_value,
            EditMode::Clean => &self.computed_value,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.edit_mode == EditMode::Editing
    }
}

/// A projected row: the display index plus one cell per data column.
///
/// `cells[j]` is the cell at column index `j`. The trailing append row has no
/// cells at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    pub row_index: String,
    pub cells: Vec<GridCell>,
}

impl Row {
    pub fn new(row: usize) -> Self {
        Self {
            row_index: display_row(row),
            cells: Vec::new(),
        }
    }

    pub fn cell(&self, col: usize) -> Option<&GridCell> {
        self.cells.get(col)
    }

    pub fn cell_mut(&mut self, col: usize) -> Option<&mut GridCell> {
        self.cells.get_mut(col)
    }

    /// Look up a cell by its column address.
    pub fn cell_at(&self, address: &str) -> Option<&GridCell> {
        column_index(address).and_then(|col| self.cell(col))
    }

    pub fn cell_at_mut(&mut self, address: &str) -> Option<&mut GridCell> {
        column_index(address).and_then(move |col| self.cell_mut(col))
    }
}

// Rows serialize as the mapping the grid consumes:
// {"rowIndex": "3", "A": {...}, "B": {...}}
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len() + 1))?;
        map.serialize_entry(ROW_INDEX_KEY, &self.row_index)?;
        for (col, cell) in self.cells.iter().enumerate() {
            map.serialize_entry(&column_address(col as i64), cell)?;
        }
        map.end()
    }
}

pub(crate) fn display_row(row: usize) -> String {
    (row + 1).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_value_follows_edit_mode() {
        let mut cell = GridCell {
            row_index: "1".into(),
            raw_value: "=A1+1".into(),
            computed_value: "2".into(),
            edit_mode: EditMode::Clean,
        };
        assert_eq!(cell.display_value(), "2");
        cell.edit_mode = EditMode::Editing;
        assert_eq!(cell.display_value(), "=A1+1");
    }

    #[test]
    fn test_blank_cell() {
        let cell = GridCell::blank(4);
        assert_eq!(cell.row_index, "5");
        assert_eq!(cell.display_value(), "");
        assert!(!cell.is_editing());
    }

    #[test]
    fn test_cell_at_address() {
        let mut row = Row::new(0);
        row.cells = vec![GridCell::blank(0), GridCell::blank(0)];
        row.cells[1].raw_value = "b".into();
        assert_eq!(row.cell_at("B").map(|c| c.raw_value.as_str()), Some("b"));
        assert!(row.cell_at("C").is_none());
        assert!(row.cell_at("").is_none());
        assert!(row.cell_at(ROW_INDEX_KEY).is_none());
    }

    #[test]
    fn test_row_serializes_as_mapping() {
        let mut row = Row::new(1);
        row.cells.push(GridCell {
            row_index: "2".into(),
            raw_value: "x".into(),
            computed_value: "x".into(),
            edit_mode: EditMode::Clean,
        });
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            r#"{"rowIndex":"2","A":{"rowIndex":"2","rawValue":"x","computedValue":"x","editMode":"CLEAN"}}"#
        );
    }

    #[test]
    fn test_row_without_cells_serializes_index_only() {
        let row = Row::new(3);
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"rowIndex":"4"}"#);
    }
}
