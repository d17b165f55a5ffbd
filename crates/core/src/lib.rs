//! Grid projection and live-reconciliation engine.
//!
//! - [`address`]: column index ↔ letter address
//! - [`schema`]: column descriptors and their cell accessors
//! - [`projector`]: sparse cell records → dense rows
//! - [`edit`]: the single-cell edit session that gates reprojection
//! - [`session`]: the host event loop tying them together

pub mod address;
pub mod edit;
pub mod history;
pub mod projector;
pub mod schema;
pub mod session;
pub mod view;

pub use address::{column_address, column_index};
pub use edit::{EditCursor, EditSession};
pub use history::version_label;
pub use projector::{project, project_indexed, CellIndex, GrowthPlan};
pub use schema::{build_columns, placeholder_columns, ColumnDescriptor, ColumnLayout};
pub use session::GridSession;
pub use view::{EditMode, GridCell, Row, ROW_INDEX_KEY};
