//! CLI exit codes.
//!
//! Scripts driving `gsheets` rely on these, so treat them as part of the
//! command-line contract.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (unspecified)                        |
//! | 2    | Usage error (bad arguments)                        |
//! | 3    | I/O error (missing file, unreadable stdin)         |
//! | 4    | Parse error (bad JSON, JSONL event, column address) |

/// Command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Unspecified failure. Prefer a specific code.
pub const EXIT_ERROR: u8 = 1;

/// Bad arguments or option combinations.
pub const EXIT_USAGE: u8 = 2;

/// Reading input or writing output failed.
pub const EXIT_IO: u8 = 3;

/// Input was read but could not be understood.
pub const EXIT_PARSE: u8 = 4;
