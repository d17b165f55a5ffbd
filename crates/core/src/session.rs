//! Grid host session: the event loop state between the remote store and the grid.
//!
//! A `GridSession` consumes inbound events strictly in arrival order and
//! returns the mutation requests each event produces. It owns:
//! - the latest retained snapshot (replaced on every arrival, never merged)
//! - the sheet's declared bounds and the column schema built from them
//! - the rendered rows
//! - the edit session gating reprojection
//!
//! Remote data that arrives while an edit is open is retained but not
//! projected. The session is marked stale and reprojects from the latest
//! retained snapshot as soon as the edit stops. Schema growth from a metadata
//! refetch is held back the same way, so columns and rows always change
//! together.
//!
//! Out-of-bounds writes are preceded by a sheet growth request, because the
//! store validates coordinates against the declared bounds.

use gqlsheets_protocol::{
    CellsMessage, EditStartedMessage, EditStoppedMessage, InboundEvent, OutboundRequest,
    RevertSheetRequest, SheetMeta, UpdateCellRequest, UpdateSheetRequest, Version,
};

use crate::address::column_index;
use crate::edit::EditSession;
use crate::history;
use crate::projector::{project_indexed, CellIndex, GrowthPlan};
use crate::schema::{
    build_columns, find_column, placeholder_columns, ColumnDescriptor, ColumnLayout,
};
use crate::view::{EditMode, Row};

#[derive(Debug, Clone)]
pub struct GridSession {
    sheet_id: String,
    layout: ColumnLayout,
    sheet: Option<SheetMeta>,
    snapshot: Option<CellIndex>,
    edit: EditSession,
    columns: Vec<ColumnDescriptor>,
    /// Declared column count the schema was last built for.
    schema_columns: Option<usize>,
    rows: Vec<Row>,
    versions: Vec<Version>,
    stale: bool,
}

impl GridSession {
    pub fn new(sheet_id: impl Into<String>, layout: ColumnLayout) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            columns: placeholder_columns(&layout),
            schema_columns: None,
            layout,
            sheet: None,
            snapshot: None,
            edit: EditSession::Idle,
            rows: Vec::new(),
            versions: Vec::new(),
            stale: false,
        }
    }

    /// Process one event and return the requests it produced, in send order.
    pub fn handle(&mut self, event: InboundEvent) -> Vec<OutboundRequest> {
        match event {
            InboundEvent::SheetLoaded(msg) => {
                self.on_sheet_loaded(msg.sheet);
                Vec::new()
            }
            InboundEvent::CellsSnapshot(msg) | InboundEvent::CellsPushed(msg) => {
                self.on_cells(msg);
                Vec::new()
            }
            InboundEvent::EditStarted(msg) => {
                self.on_edit_started(msg);
                Vec::new()
            }
            InboundEvent::EditStopped(msg) => self.on_edit_stopped(msg),
            InboundEvent::VersionsChanged(msg) => {
                self.versions = msg.versions;
                Vec::new()
            }
            InboundEvent::RevertRequested(msg) => self.on_revert_requested(msg.version),
        }
    }

    /// Process events in order, concatenating their requests.
    pub fn handle_all(
        &mut self,
        events: impl IntoIterator<Item = InboundEvent>,
    ) -> Vec<OutboundRequest> {
        events.into_iter().flat_map(|e| self.handle(e)).collect()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn sheet_id(&self) -> &str {
        &self.sheet_id
    }

    pub fn sheet(&self) -> Option<&SheetMeta> {
        self.sheet.as_ref()
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn edit_session(&self) -> &EditSession {
        &self.edit
    }

    pub fn snapshot(&self) -> Option<&CellIndex> {
        self.snapshot.as_ref()
    }

    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    pub fn latest_version(&self) -> Option<&Version> {
        history::latest_version(&self.versions)
    }

    /// True when retained data has not been projected yet.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    // =========================================================================
    // Event handlers
    // =========================================================================

    fn on_sheet_loaded(&mut self, sheet: SheetMeta) {
        if sheet.id != self.sheet_id {
            log::debug!("ignoring metadata for sheet {} (session is {})", sheet.id, self.sheet_id);
            return;
        }
        self.sheet = Some(sheet);
        self.request_projection();
    }

    fn on_cells(&mut self, msg: CellsMessage) {
        if msg.sheet_id != self.sheet_id {
            log::debug!("ignoring cells for sheet {} (session is {})", msg.sheet_id, self.sheet_id);
            return;
        }
        self.snapshot = Some(CellIndex::from_records(msg.cells));
        self.request_projection();
    }

    fn on_edit_started(&mut self, msg: EditStartedMessage) {
        // A restart replaces the previous cursor; clear its flag first.
        if let Some(prev) = self.edit.cursor().cloned() {
            self.set_edit_mode(Some(prev.row as i64), &prev.column, EditMode::Clean);
        }
        self.set_edit_mode(msg.row_index, &msg.column_address, EditMode::Editing);
        self.edit = std::mem::take(&mut self.edit).start(msg.row_index, &msg.column_address);
    }

    fn on_edit_stopped(&mut self, msg: EditStoppedMessage) -> Vec<OutboundRequest> {
        // Reset the rendered flag before the cursor clears, so nothing observes
        // an EDITING cell with no session behind it.
        if let Some(cursor) = self.edit.cursor().cloned() {
            self.set_edit_mode(Some(cursor.row as i64), &cursor.column, EditMode::Clean);
        }
        self.set_edit_mode(msg.row_index, &msg.column_address, EditMode::Clean);
        self.edit = std::mem::take(&mut self.edit).stop();

        let requests = if msg.value_changed {
            self.commit_edit(&msg)
        } else {
            Vec::new()
        };

        self.flush();
        requests
    }

    fn commit_edit(&mut self, msg: &EditStoppedMessage) -> Vec<OutboundRequest> {
        let row = msg.row_index.and_then(|r| usize::try_from(r).ok());
        let (Some(row), Some(col)) = (row, column_index(&msg.column_address)) else {
            log::debug!(
                "dropping edit with unusable coordinate (row={:?}, column={:?})",
                msg.row_index,
                msg.column_address
            );
            return Vec::new();
        };
        let Some(sheet) = self.sheet.clone() else {
            log::warn!(
                "edit at {}{} before sheet metadata arrived, dropping",
                msg.column_address,
                row + 1
            );
            return Vec::new();
        };

        let raw_value = match find_column(&self.columns, &msg.column_address) {
            Some(column) => {
                let raw = column.parse(&msg.new_value);
                if let Some(rendered) = self.rows.get_mut(row) {
                    column.write_back(rendered, raw.clone());
                }
                raw
            }
            None => msg.new_value.clone(),
        };

        let mut requests = Vec::with_capacity(2);
        if let Some(plan) = GrowthPlan::for_edit(&sheet, row, col) {
            log::debug!(
                "growing sheet {} to {}x{} for edit at {}{}",
                sheet.id,
                plan.row_count,
                plan.column_count,
                msg.column_address,
                row + 1
            );
            requests.push(OutboundRequest::UpdateSheet(UpdateSheetRequest {
                id: sheet.id.clone(),
                row_count: plan.row_count,
                column_count: plan.column_count,
            }));
            self.sheet = Some(SheetMeta::new(
                sheet.id.clone(),
                plan.row_count,
                plan.column_count,
            ));
        }

        requests.push(OutboundRequest::UpdateCell(UpdateCellRequest {
            sheet_id: sheet.id,
            column_index: col,
            row_index: row,
            raw_value,
        }));
        requests
    }

    fn on_revert_requested(&mut self, version: String) -> Vec<OutboundRequest> {
        if version.trim().is_empty() {
            log::debug!("ignoring revert without a version");
            return Vec::new();
        }
        let Some(sheet) = &self.sheet else {
            log::warn!("revert to {} before sheet metadata arrived, dropping", version);
            return Vec::new();
        };
        vec![OutboundRequest::RevertSheet(RevertSheetRequest {
            sheet_id: sheet.id.clone(),
            version,
        })]
    }

    // =========================================================================
    // Projection
    // =========================================================================

    fn request_projection(&mut self) {
        self.stale = true;
        self.flush();
    }

    /// Apply pending schema growth and project the retained snapshot, unless
    /// an edit is open.
    fn flush(&mut self) {
        if self.edit.is_gating() {
            return;
        }
        self.sync_schema();
        if !self.stale {
            return;
        }
        let (Some(sheet), Some(snapshot)) = (&self.sheet, &self.snapshot) else {
            return;
        };
        self.rows = project_indexed(snapshot, sheet.rows(), &self.edit);
        self.stale = false;
    }

    /// Rebuild the schema on first metadata or when the declared column count
    /// grows. The schema never shrinks.
    fn sync_schema(&mut self) {
        let Some(sheet) = &self.sheet else {
            return;
        };
        let columns = sheet.columns();
        if self.schema_columns.map_or(true, |built| columns > built) {
            self.columns = build_columns(columns, &self.layout);
            self.schema_columns = Some(columns);
        }
    }

    fn set_edit_mode(&mut self, row: Option<i64>, address: &str, mode: EditMode) {
        let Some(row) = row.and_then(|r| usize::try_from(r).ok()) else {
            return;
        };
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.cell_at_mut(address)) {
            cell.edit_mode = mode;
        }
    }
}
