//! Column schema: the ordered column descriptors a grid renders.
//!
//! The first descriptor is always the reserved row-index column. Data columns
//! follow in index order, keyed by their letter address. Each descriptor
//! carries the accessors the grid uses to show, parse and write back a cell.

use serde::Serialize;

use crate::address::column_address;
use crate::view::{Row, ROW_INDEX_KEY};

/// Default fixed width of the row-index column.
pub const DEFAULT_ROW_INDEX_WIDTH: f32 = 50.0;

/// Data columns shown before sheet metadata arrives (A, B, C).
pub const DEFAULT_PLACEHOLDER_COLUMNS: usize = 3;

/// Layout knobs that do not depend on the sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnLayout {
    pub row_index_width: f32,
    pub placeholder_columns: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            row_index_width: DEFAULT_ROW_INDEX_WIDTH,
            placeholder_columns: DEFAULT_PLACEHOLDER_COLUMNS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    /// Row key this column reads: `rowIndex` or a column address.
    pub field: String,
    pub header_name: String,
    /// `None` for the row-index column.
    pub column_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    pub sortable: bool,
    pub resizable: bool,
    pub selectable: bool,
}

impl ColumnDescriptor {
    /// The reserved, fixed-width, read-only row-index column.
    pub fn row_index(width: f32) -> Self {
        Self {
            field: ROW_INDEX_KEY.to_string(),
            header_name: String::new(),
            column_index: None,
            width: Some(width),
            sortable: false,
            resizable: false,
            selectable: false,
        }
    }

    pub fn data(index: usize) -> Self {
        let address = column_address(index as i64);
        Self {
            header_name: address.clone(),
            field: address,
            column_index: Some(index),
            width: None,
            sortable: true,
            resizable: true,
            selectable: true,
        }
    }

    pub fn is_row_index(&self) -> bool {
        self.column_index.is_none()
    }

    pub fn is_editable(&self) -> bool {
        self.column_index.is_some()
    }

    /// Text shown for this column in `row`.
    ///
    /// Data columns show the raw input while the cell is being edited and the
    /// computed value otherwise; a sparse gap shows nothing.
    pub fn display(&self, row: &Row) -> String {
        match self.column_index {
            None => row.row_index.clone(),
            Some(col) => row
                .cell(col)
                .map(|cell| cell.display_value().to_string())
                .unwrap_or_default(),
        }
    }

    /// Turn editor input into a raw value. Content is not interpreted.
    pub fn parse(&self, new_value: &str) -> String {
        new_value.to_string()
    }

    /// Store new raw input into `row`'s cell for this column.
    ///
    /// The computed value is left alone; the store recomputes it and the next
    /// snapshot carries it. Returns false when there is no cell to write.
    pub fn write_back(&self, row: &mut Row, raw_value: String) -> bool {
        let Some(col) = self.column_index else {
            return false;
        };
        match row.cell_mut(col) {
            Some(cell) => {
                cell.raw_value = raw_value;
                true
            }
            None => false,
        }
    }
}

/// Build the schema for a sheet with `column_count` declared columns.
///
/// Yields the row-index column followed by data columns `0..=column_count`,
/// so one column beyond the declared bounds is always available to type into.
pub fn build_columns(column_count: usize, layout: &ColumnLayout) -> Vec<ColumnDescriptor> {
    let mut columns = Vec::with_capacity(column_count + 2);
    columns.push(ColumnDescriptor::row_index(layout.row_index_width));
    columns.extend((0..=column_count).map(ColumnDescriptor::data));
    columns
}

/// Schema shown before the sheet's metadata is known.
pub fn placeholder_columns(layout: &ColumnLayout) -> Vec<ColumnDescriptor> {
    let mut columns = Vec::with_capacity(layout.placeholder_columns + 1);
    columns.push(ColumnDescriptor::row_index(layout.row_index_width));
    columns.extend((0..layout.placeholder_columns).map(ColumnDescriptor::data));
    columns
}

/// Find a data column by its address.
pub fn find_column<'a>(
    columns: &'a [ColumnDescriptor],
    address: &str,
) -> Option<&'a ColumnDescriptor> {
    if address.is_empty() {
        return None;
    }
    columns
        .iter()
        .find(|c| c.is_editable() && c.field == address)
}
