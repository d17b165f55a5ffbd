//! Edit-session tracking.
//!
//! At most one cell in the grid is under local edit at any instant. While a
//! session is open (armed or editing), remote snapshots must not be projected
//! over the rendered rows, or the user's in-flight input would be clobbered.
//!
//! ```text
//!   Idle ──start──▶ Armed ──(valid coordinate)──▶ Editing
//!    ▲                │                             │
//!    └─────stop───────┴────────────stop─────────────┘
//! ```
//!
//! `start` always re-arms, even from `Editing`, so a second editor opening
//! replaces the first cursor instead of adding another.

/// The cell currently under local edit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EditCursor {
    /// Column address (e.g. "B").
    pub column: String,
    /// 0-based row index.
    pub row: usize,
}

impl EditCursor {
    pub fn new(column: impl Into<String>, row: usize) -> Self {
        Self {
            column: column.into(),
            row,
        }
    }

    pub fn matches(&self, column: &str, row: usize) -> bool {
        self.row == row && self.column == column
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditSession {
    #[default]
    Idle,
    /// An edit started but its coordinate is unknown or invalid.
    Armed,
    Editing(EditCursor),
}

impl EditSession {
    /// Handle an edit-start event.
    ///
    /// Arms first, then attributes the session to `(column, row)` when the row
    /// is present and non-negative and the column address is non-empty.
    pub fn start(self, row: Option<i64>, column: &str) -> EditSession {
        match row.and_then(|r| usize::try_from(r).ok()) {
            Some(row) if !column.is_empty() => EditSession::Editing(EditCursor::new(column, row)),
            _ => {
                log::debug!(
                    "edit started without a usable coordinate (row={:?}, column={:?})",
                    row,
                    column
                );
                EditSession::Armed
            }
        }
    }

    /// Handle an edit-stop event. Always returns to `Idle`.
    pub fn stop(self) -> EditSession {
        EditSession::Idle
    }

    /// True while remote-driven projection must be suppressed.
    pub fn is_gating(&self) -> bool {
        !matches!(self, EditSession::Idle)
    }

    pub fn cursor(&self) -> Option<&EditCursor> {
        match self {
            EditSession::Editing(cursor) => Some(cursor),
            _ => None,
        }
    }

    /// True when the session is editing exactly this cell.
    pub fn is_editing(&self, column: &str, row: usize) -> bool {
        self.cursor().is_some_and(|c| c.matches(column, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_by_default() {
        let session = EditSession::default();
        assert_eq!(session, EditSession::Idle);
        assert!(!session.is_gating());
        assert!(session.cursor().is_none());
    }

    #[test]
    fn test_start_with_valid_coordinate() {
        let session = EditSession::Idle.start(Some(2), "B");
        assert_eq!(session, EditSession::Editing(EditCursor::new("B", 2)));
        assert!(session.is_gating());
        assert!(session.is_editing("B", 2));
        assert!(!session.is_editing("B", 1));
        assert!(!session.is_editing("C", 2));
    }

    #[test]
    fn test_start_without_row_stays_armed() {
        let session = EditSession::Idle.start(None, "B");
        assert_eq!(session, EditSession::Armed);
        assert!(session.is_gating());
        assert!(session.cursor().is_none());
    }

    #[test]
    fn test_start_with_negative_row_stays_armed() {
        assert_eq!(EditSession::Idle.start(Some(-1), "A"), EditSession::Armed);
    }

    #[test]
    fn test_start_with_empty_column_stays_armed() {
        assert_eq!(EditSession::Idle.start(Some(0), ""), EditSession::Armed);
    }

    #[test]
    fn test_restart_replaces_cursor() {
        let session = EditSession::Idle.start(Some(0), "A").start(Some(4), "C");
        assert_eq!(session.cursor(), Some(&EditCursor::new("C", 4)));
        assert!(!session.is_editing("A", 0));
    }

    #[test]
    fn test_restart_with_bad_coordinate_drops_previous_cursor() {
        let session = EditSession::Idle.start(Some(0), "A").start(None, "");
        assert_eq!(session, EditSession::Armed);
    }

    #[test]
    fn test_stop_always_idles() {
        assert_eq!(EditSession::Idle.stop(), EditSession::Idle);
        assert_eq!(EditSession::Armed.stop(), EditSession::Idle);
        assert_eq!(EditSession::Idle.start(Some(1), "A").stop(), EditSession::Idle);
    }
}
