//! gql-sheets Grid Protocol: v1 Wire Format
//!
//! This crate defines the data contract between the grid engine and its
//! collaborators: the remote cell store (reached through query, mutation and
//! subscription calls) and the UI surface that raises edit events.
//!
//! The wire format is JSONL (newline-delimited JSON). Every message is an
//! object tagged by a snake_case `type` field; payload fields are camelCase,
//! matching the store's GraphQL schema.
//!
//! # Protocol Version
//!
//! This is **protocol v1**. Changes require:
//! 1. Version bump in PROTOCOL_VERSION
//! 2. New golden vectors in `crates/protocol/tests/golden/`
//! 3. Backward compatibility handling
//!
//! # Usage
//!
//! ```ignore
//! use gqlsheets_protocol::{InboundReader, OutboundRequest, to_jsonl};
//!
//! for event in InboundReader::new(stdin.lock()) {
//!     let event = event?;
//!     // hand the event to a GridSession
//! }
//! ```

use std::io::BufRead;

use serde::{Deserialize, Serialize};

/// Current protocol version. Increment for breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

// =============================================================================
// Shared Records
// =============================================================================

/// A single cell as delivered by the remote store.
///
/// Coordinates are signed on the wire; the store never sends negative values,
/// but the engine treats them as malformed rather than trusting the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRecord {
    pub row_index: i64,
    pub column_index: i64,
    pub raw_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_value: Option<String>,
}

impl CellRecord {
    /// A record whose computed value equals its raw input.
    pub fn new(row_index: i64, column_index: i64, raw_value: impl Into<String>) -> Self {
        let raw_value = raw_value.into();
        Self {
            row_index,
            column_index,
            computed_value: Some(raw_value.clone()),
            raw_value,
        }
    }

    pub fn with_computed(mut self, computed: impl Into<String>) -> Self {
        self.computed_value = Some(computed.into());
        self
    }

    pub fn without_computed(mut self) -> Self {
        self.computed_value = None;
        self
    }

    /// Zero-based `(row, column)`, or `None` if either coordinate is negative.
    pub fn coordinate(&self) -> Option<(usize, usize)> {
        let row = usize::try_from(self.row_index).ok()?;
        let col = usize::try_from(self.column_index).ok()?;
        Some((row, col))
    }
}

/// Sheet metadata: identity plus the declared grid bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetMeta {
    pub id: String,
    pub row_count: i64,
    pub column_count: i64,
}

impl SheetMeta {
    pub fn new(id: impl Into<String>, row_count: usize, column_count: usize) -> Self {
        Self {
            id: id.into(),
            row_count: row_count as i64,
            column_count: column_count as i64,
        }
    }

    /// Declared row count, negative values clamped to 0.
    pub fn rows(&self) -> usize {
        self.row_count.max(0) as usize
    }

    /// Declared column count, negative values clamped to 0.
    pub fn columns(&self) -> usize {
        self.column_count.max(0) as usize
    }
}

/// One entry of the sheet's version history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Millisecond UNIX timestamp, as a decimal string.
    pub version: String,
}

impl Version {
    pub fn new(version: impl Into<String>) -> Self {
        Self { version: version.into() }
    }

    pub fn timestamp_ms(&self) -> Option<i64> {
        self.version.trim().parse().ok()
    }
}

// =============================================================================
// Inbound Events (collaborators → engine)
// =============================================================================

/// Events consumed by the grid engine, in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Sheet metadata query completed (or was refetched after a mutation).
    SheetLoaded(SheetLoadedMessage),
    /// Cell query completed.
    CellsSnapshot(CellsMessage),
    /// Subscription pushed a fresh cell set.
    CellsPushed(CellsMessage),
    /// The UI opened an editor on a cell.
    EditStarted(EditStartedMessage),
    /// The UI closed the editor.
    EditStopped(EditStoppedMessage),
    /// Version history changed.
    VersionsChanged(VersionsMessage),
    /// The user confirmed a revert to an earlier version.
    RevertRequested(RevertRequestedMessage),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetLoadedMessage {
    pub sheet: SheetMeta,
}

/// A complete cell set for one sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellsMessage {
    pub sheet_id: String,
    #[serde(default)]
    pub cells: Vec<CellRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditStartedMessage {
    #[serde(default)]
    pub row_index: Option<i64>,
    pub column_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditStoppedMessage {
    #[serde(default)]
    pub row_index: Option<i64>,
    pub column_address: String,
    pub value_changed: bool,
    #[serde(default)]
    pub new_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionsMessage {
    #[serde(default)]
    pub versions: Vec<Version>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevertRequestedMessage {
    pub version: String,
}

// =============================================================================
// Outbound Requests (engine → remote store)
// =============================================================================

/// Mutation requests emitted by the grid engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundRequest {
    UpdateSheet(UpdateSheetRequest),
    UpdateCell(UpdateCellRequest),
    RevertSheet(RevertSheetRequest),
}

/// Grow the sheet's declared bounds. Always precedes the write that needed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSheetRequest {
    pub id: String,
    pub row_count: usize,
    pub column_count: usize,
}

/// Write a cell's raw input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCellRequest {
    pub sheet_id: String,
    pub column_index: usize,
    pub row_index: usize,
    pub raw_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevertSheetRequest {
    pub sheet_id: String,
    pub version: String,
}

// =============================================================================
// JSONL Framing
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("line {line}: invalid message: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse one JSONL line. Blank lines and `#` comments yield `Ok(None)`.
///
/// `line_no` is 1-based and only used for error reporting.
pub fn parse_inbound(line: &str, line_no: usize) -> Result<Option<InboundEvent>, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|source| ProtocolError::Json { line: line_no, source })
}

/// Serialize a message as a single JSONL line (without the trailing newline).
pub fn to_jsonl<T: Serialize>(msg: &T) -> Result<String, ProtocolError> {
    serde_json::to_string(msg).map_err(ProtocolError::Encode)
}

/// Iterates the inbound events of a JSONL stream, skipping blank and comment lines.
pub struct InboundReader<R> {
    reader: R,
    line_no: usize,
    buf: String,
}

impl<R: BufRead> InboundReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }

    /// Number of lines consumed so far.
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for InboundReader<R> {
    type Item = Result<InboundEvent, ProtocolError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(ProtocolError::Io(e))),
            }
            self.line_no += 1;
            match parse_inbound(&self.buf, self.line_no) {
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_record_uses_camel_case() {
        let rec = CellRecord::new(2, 1, "=A1").with_computed("5");
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(
            json,
            r#"{"rowIndex":2,"columnIndex":1,"rawValue":"=A1","computedValue":"5"}"#
        );
    }

    #[test]
    fn computed_value_is_optional() {
        let rec: CellRecord =
            serde_json::from_str(r#"{"rowIndex":0,"columnIndex":0,"rawValue":"x"}"#).unwrap();
        assert_eq!(rec.computed_value, None);
        assert_eq!(rec.coordinate(), Some((0, 0)));
    }

    #[test]
    fn negative_coordinate_has_no_position() {
        assert_eq!(CellRecord::new(-1, 0, "x").coordinate(), None);
        assert_eq!(CellRecord::new(0, -3, "x").coordinate(), None);
    }

    #[test]
    fn sheet_meta_clamps_negative_counts() {
        let meta = SheetMeta { id: "1".into(), row_count: -4, column_count: 3 };
        assert_eq!(meta.rows(), 0);
        assert_eq!(meta.columns(), 3);
    }

    #[test]
    fn version_timestamp() {
        assert_eq!(Version::new("1700000000000").timestamp_ms(), Some(1_700_000_000_000));
        assert_eq!(Version::new("latest").timestamp_ms(), None);
    }

    #[test]
    fn edit_started_null_row() {
        let line = r#"{"type":"edit_started","rowIndex":null,"columnAddress":"B"}"#;
        let event = parse_inbound(line, 1).unwrap().unwrap();
        assert_eq!(
            event,
            InboundEvent::EditStarted(EditStartedMessage {
                row_index: None,
                column_address: "B".into(),
            })
        );
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert!(parse_inbound("", 1).unwrap().is_none());
        assert!(parse_inbound("   \n", 2).unwrap().is_none());
        assert!(parse_inbound("# sheet 1 fixture", 3).unwrap().is_none());
    }

    #[test]
    fn parse_error_carries_line_number() {
        let err = parse_inbound(r#"{"type":"nope"}"#, 7).unwrap_err();
        match err {
            ProtocolError::Json { line, .. } => assert_eq!(line, 7),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reader_counts_lines() {
        let input = "\n# comment\n{\"type\":\"versions_changed\",\"versions\":[{\"version\":\"1\"}]}\n";
        let mut reader = InboundReader::new(input.as_bytes());
        let event = reader.next().unwrap().unwrap();
        assert!(matches!(event, InboundEvent::VersionsChanged(_)));
        assert_eq!(reader.line_no(), 3);
        assert!(reader.next().is_none());
    }

    #[test]
    fn outbound_is_tagged() {
        let req = OutboundRequest::UpdateSheet(UpdateSheetRequest {
            id: "1".into(),
            row_count: 6,
            column_count: 3,
        });
        assert_eq!(
            to_jsonl(&req).unwrap(),
            r#"{"type":"update_sheet","id":"1","rowCount":6,"columnCount":3}"#
        );
    }
}
