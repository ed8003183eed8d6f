//! Two-endpoint ranges ("A1:D10") and sheet-qualified tokens ("Sheet1!A1:D10").

use serde::{Deserialize, Serialize};

use crate::cell::parse_cell_ref;
use crate::error::A1Error;

/// A rectangle on an unspecified sheet: start inclusive, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start_column: u32,
    pub start_row: u32,
    pub end_column: u32,
    pub end_row: u32,
}

impl CellRange {
    pub fn width(&self) -> u32 {
        self.end_column - self.start_column
    }

    pub fn height(&self) -> u32 {
        self.end_row - self.start_row
    }

    /// Tag the rectangle with a sheet ID.
    pub fn on_sheet(self, sheet_id: i64) -> GridRange {
        GridRange {
            sheet_id,
            start_row: self.start_row,
            end_row: self.end_row,
            start_column: self.start_column,
            end_column: self.end_column,
        }
    }
}

/// A rectangle on a specific sheet, serialized the way the Sheets API
/// expects a `GridRange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRange {
    #[serde(rename = "sheetId")]
    pub sheet_id: i64,
    #[serde(rename = "startRowIndex")]
    pub start_row: u32,
    #[serde(rename = "endRowIndex")]
    pub end_row: u32,
    #[serde(rename = "startColumnIndex")]
    pub start_column: u32,
    #[serde(rename = "endColumnIndex")]
    pub end_column: u32,
}

impl GridRange {
    /// The same range narrowed to a single column (absolute index).
    pub fn column(&self, column: u32) -> GridRange {
        GridRange {
            start_column: column,
            end_column: column + 1,
            ..*self
        }
    }
}

/// Parse `"A1:D10"` into a half-open rectangle.
///
/// End coordinates are the parsed end cell plus one, so `"A1:A1"` covers one
/// cell. Endpoints given in reverse order (`"D10:A1"`) are normalized so that
/// the end always lies past the start.
pub fn parse_cell_range(token: &str) -> Result<CellRange, A1Error> {
    let parts: Vec<&str> = token.trim().split(':').collect();
    if parts.len() != 2 {
        return Err(A1Error::InvalidRange(token.to_string()));
    }

    let first = parse_cell_ref(parts[0])?;
    let second = parse_cell_ref(parts[1])?;

    Ok(CellRange {
        start_column: first.column.min(second.column),
        start_row: first.row.min(second.row),
        end_column: first.column.max(second.column) + 1,
        end_row: first.row.max(second.row) + 1,
    })
}

/// Split an optional `SheetName!` prefix off a range token.
///
/// Quoted titles (`'My Sheet'!A1:B2`) are unquoted and `''` is read as a
/// literal quote. An empty title (`"!A1:B2"`) is rejected.
pub fn split_sheet_prefix(token: &str) -> Result<(Option<String>, &str), A1Error> {
    let trimmed = token.trim();
    let Some(bang) = trimmed.rfind('!') else {
        return Ok((None, trimmed));
    };

    let (raw_title, rest) = (&trimmed[..bang], &trimmed[bang + 1..]);
    let title = match raw_title
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
    {
        Some(quoted) => quoted.replace("''", "'"),
        None => raw_title.to_string(),
    };

    if title.is_empty() {
        return Err(A1Error::InvalidRange(token.to_string()));
    }

    Ok((Some(title), rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_range() {
        let range = parse_cell_range("A1:D10").unwrap();
        assert_eq!(
            (range.start_column, range.start_row, range.end_column, range.end_row),
            (0, 0, 4, 10)
        );
    }

    #[test]
    fn test_span_matches_typed_cells() {
        let single = parse_cell_range("A1:A1").unwrap();
        assert_eq!((single.width(), single.height()), (1, 1));

        let block = parse_cell_range("b2:c3").unwrap();
        assert_eq!((block.width(), block.height()), (2, 2));

        let wide = parse_cell_range("A5:AA5").unwrap();
        assert_eq!((wide.width(), wide.height()), (27, 1));
    }

    #[test]
    fn test_reversed_endpoints_are_normalized() {
        assert_eq!(
            parse_cell_range("D10:A1").unwrap(),
            parse_cell_range("A1:D10").unwrap()
        );
    }

    #[test]
    fn test_parse_cell_range_errors() {
        assert_eq!(
            parse_cell_range("A1"),
            Err(A1Error::InvalidRange("A1".to_string()))
        );
        assert!(matches!(parse_cell_range("A1:B2:C3"), Err(A1Error::InvalidRange(_))));
        assert!(matches!(parse_cell_range("A1:"), Err(A1Error::InvalidCellRef(_))));
        assert!(matches!(parse_cell_range("A1:2B"), Err(A1Error::InvalidCellRef(_))));
    }

    #[test]
    fn test_split_sheet_prefix() {
        assert_eq!(split_sheet_prefix("A1:B2").unwrap(), (None, "A1:B2"));
        assert_eq!(
            split_sheet_prefix("Sheet1!B2:C3").unwrap(),
            (Some("Sheet1".to_string()), "B2:C3")
        );
        assert_eq!(
            split_sheet_prefix("'Q1 Budget'!A1:B2").unwrap(),
            (Some("Q1 Budget".to_string()), "A1:B2")
        );
        assert_eq!(
            split_sheet_prefix("'Bob''s'!A1:B2").unwrap(),
            (Some("Bob's".to_string()), "A1:B2")
        );
        assert!(split_sheet_prefix("!A1:B2").is_err());
        assert!(split_sheet_prefix("''!A1:B2").is_err());
    }

    #[test]
    fn test_grid_range_serializes_as_api_shape() {
        let grid = parse_cell_range("C5:E9").unwrap().on_sheet(42);
        let json = serde_json::to_value(grid).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "sheetId": 42,
                "startRowIndex": 4,
                "endRowIndex": 9,
                "startColumnIndex": 2,
                "endColumnIndex": 5,
            })
        );
        assert_eq!(grid.column(3).start_column, 3);
        assert_eq!(grid.column(3).end_column, 4);
    }
}
