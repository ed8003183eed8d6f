//! A1 notation parsing for spreadsheet ranges.
//!
//! Converts cell tokens such as `C5` and range tokens such as `Sheet2!C5:E9`
//! into zero-based, end-exclusive grid coordinates. Resolving a sheet title to
//! its numeric ID needs spreadsheet metadata and lives with the API client;
//! everything here is pure.

pub mod cell;
pub mod error;
pub mod range;

pub use cell::{column_index_to_letters, column_letter_to_index, parse_cell_ref, CellRef};
pub use error::A1Error;
pub use range::{parse_cell_range, split_sheet_prefix, CellRange, GridRange};
