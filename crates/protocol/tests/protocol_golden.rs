//! Golden vector compatibility test for the v1 grid protocol.
//!
//! Golden vectors live in: crates/protocol/tests/golden/*.jsonl
//!
//! **Rule**: The golden vectors MUST NOT change. If the test fails, fix the types, not the vectors.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use gqlsheets_protocol::{
    parse_inbound, to_jsonl, InboundEvent, InboundReader, OutboundRequest, PROTOCOL_VERSION,
};

fn golden_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/golden")
        .join(filename)
}

fn load_golden_lines(filename: &str) -> Vec<String> {
    let path = golden_path(filename);
    let contents = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(String::from)
        .collect()
}

#[test]
fn test_vectors_match_protocol_version() {
    // A version bump needs a new set of golden vectors alongside these.
    assert_eq!(PROTOCOL_VERSION, 1, "golden vectors are for protocol v1");
}

#[test]
fn test_inbound_vectors_deserialize() {
    let lines = load_golden_lines("inbound.jsonl");
    assert_eq!(lines.len(), 7, "inbound.jsonl should have 7 lines");

    let events: Vec<InboundEvent> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            parse_inbound(line, i + 1)
                .unwrap_or_else(|e| panic!("{}", e))
                .expect("golden line is not blank")
        })
        .collect();

    match &events[0] {
        InboundEvent::SheetLoaded(msg) => {
            assert_eq!(msg.sheet.id, "1");
            assert_eq!(msg.sheet.rows(), 3);
            assert_eq!(msg.sheet.columns(), 3);
        }
        other => panic!("Expected SheetLoaded, got {:?}", other),
    }

    match &events[1] {
        InboundEvent::CellsSnapshot(msg) => {
            assert_eq!(msg.sheet_id, "1");
            assert_eq!(msg.cells.len(), 2);
            assert_eq!(msg.cells[1].raw_value, "=A1");
            assert_eq!(msg.cells[1].computed_value.as_deref(), Some("1"));
        }
        other => panic!("Expected CellsSnapshot, got {:?}", other),
    }

    match &events[2] {
        InboundEvent::CellsPushed(msg) => {
            assert_eq!(msg.cells[0].computed_value, None);
        }
        other => panic!("Expected CellsPushed, got {:?}", other),
    }

    match &events[3] {
        InboundEvent::EditStarted(msg) => {
            assert_eq!(msg.row_index, Some(2));
            assert_eq!(msg.column_address, "B");
        }
        other => panic!("Expected EditStarted, got {:?}", other),
    }

    match &events[4] {
        InboundEvent::EditStopped(msg) => {
            assert!(msg.value_changed);
            assert_eq!(msg.new_value, "=SUM(A1:A2)");
        }
        other => panic!("Expected EditStopped, got {:?}", other),
    }

    match &events[5] {
        InboundEvent::VersionsChanged(msg) => {
            assert_eq!(msg.versions.len(), 2);
            assert_eq!(msg.versions[1].timestamp_ms(), Some(1_700_000_060_000));
        }
        other => panic!("Expected VersionsChanged, got {:?}", other),
    }

    assert!(matches!(events[6], InboundEvent::RevertRequested(_)));
}

#[test]
fn test_inbound_reader_matches_line_parser() {
    let contents = fs::read_to_string(golden_path("inbound.jsonl")).unwrap();
    let events: Vec<InboundEvent> = InboundReader::new(contents.as_bytes())
        .collect::<Result<_, _>>()
        .expect("golden stream parses");
    assert_eq!(events.len(), 7);
}

#[test]
fn test_outbound_vectors_are_stable() {
    // Re-encoding each vector must reproduce it byte for byte.
    for line in load_golden_lines("outbound.jsonl") {
        let msg: OutboundRequest = serde_json::from_str(&line)
            .unwrap_or_else(|e| panic!("Failed to parse {}: {}", line, e));
        let encoded = to_jsonl(&msg).unwrap();
        assert_eq!(encoded, line);

        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert!(value.get("type").is_some(), "missing type tag: {}", line);
    }
}
