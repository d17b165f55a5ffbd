//! Matrix projection: sparse cell records → dense, render-ready rows.
//!
//! Guarantees:
//! - Row count: `max(declared_rows, 1 + max row present) + 1`; the extra
//!   trailing row is the "type here to append" row and carries no cells
//! - Every projected row has one cell per column `0..=max column present`;
//!   gaps are blank cells
//! - Determinism: equal inputs produce equal output

use std::cmp::max;

use rustc_hash::FxHashMap;

use gqlsheets_protocol::{CellRecord, SheetMeta};

use crate::address::column_index;
use crate::edit::EditSession;
use crate::view::{display_row, EditMode, GridCell, Row};

/// Coordinate-keyed view over one snapshot.
///
/// Built once per snapshot so projection costs O(rows × columns) instead of
/// scanning the record list for every cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellIndex {
    cells: FxHashMap<(usize, usize), CellRecord>,
    max_row: Option<usize>,
    max_col: Option<usize>,
    skipped: usize,
}

impl CellIndex {
    pub fn build(records: &[CellRecord]) -> Self {
        Self::from_records(records.iter().cloned())
    }

    /// Index owned records. Later duplicates of a coordinate replace earlier ones;
    /// records with a negative coordinate are skipped.
    pub fn from_records(records: impl IntoIterator<Item = CellRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            let Some((row, col)) = record.coordinate() else {
                log::debug!(
                    "skipping cell record with malformed coordinate ({}, {})",
                    record.row_index,
                    record.column_index
                );
                index.skipped += 1;
                continue;
            };
            index.max_row = max(index.max_row, Some(row));
            index.max_col = max(index.max_col, Some(col));
            index.cells.insert((row, col), record);
        }
        index
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&CellRecord> {
        self.cells.get(&(row, col))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Highest populated row, if any.
    pub fn max_row(&self) -> Option<usize> {
        self.max_row
    }

    /// Highest populated column, if any.
    pub fn max_col(&self) -> Option<usize> {
        self.max_col
    }

    /// Number of malformed records dropped while indexing.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Project a snapshot into rows.
pub fn project(records: &[CellRecord], declared_rows: usize, edit: &EditSession) -> Vec<Row> {
    project_indexed(&CellIndex::build(records), declared_rows, edit)
}

/// Project an already-indexed snapshot into rows.
pub fn project_indexed(index: &CellIndex, declared_rows: usize, edit: &EditSession) -> Vec<Row> {
    let last_row = max(declared_rows.checked_sub(1), index.max_row());
    let row_count = last_row.map_or(0, |r| r + 1);
    let col_count = index.max_col().map_or(0, |c| c + 1);

    // Resolve the cursor to a coordinate once instead of formatting every address.
    let editing = edit
        .cursor()
        .and_then(|c| column_index(&c.column).map(|col| (c.row, col)));

    let mut rows = Vec::with_capacity(row_count + 1);
    for i in 0..row_count {
        let row_index = display_row(i);
        let cells = (0..col_count)
            .map(|j| {
                let mut cell = match index.get(i, j) {
                    Some(record) => GridCell {
                        row_index: row_index.clone(),
                        raw_value: record.raw_value.clone(),
                        computed_value: record.computed_value.clone().unwrap_or_default(),
                        edit_mode: EditMode::Clean,
                    },
                    None => GridCell::blank(i),
                };
                if editing == Some((i, j)) {
                    cell.edit_mode = EditMode::Editing;
                }
                cell
            })
            .collect();
        rows.push(Row { row_index, cells });
    }

    rows.push(Row::new(row_count));
    rows
}

/// New sheet bounds required before writing a cell outside the current ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPlan {
    pub row_count: usize,
    pub column_count: usize,
}

impl GrowthPlan {
    /// `None` when `(row, col)` already lies inside the declared bounds.
    pub fn for_edit(sheet: &SheetMeta, row: usize, col: usize) -> Option<Self> {
        let rows = sheet.rows();
        let columns = sheet.columns();
        if row < rows && col < columns {
            return None;
        }
        Some(Self {
            row_count: max(row + 1, rows),
            column_count: max(col + 1, columns),
        })
    }
}
