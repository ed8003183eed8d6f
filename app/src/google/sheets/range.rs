//! Sheet-qualified range resolution
//!
//! Turns `"Sheet2!C5:E9"` into a `GridRange` by parsing the rectangle and
//! asking spreadsheet metadata for the sheet's numeric ID. Without a prefix
//! the first sheet is used. Lookup failures propagate unchanged.

use async_trait::async_trait;
use gw_a1::{parse_cell_range, split_sheet_prefix, GridRange};
use tracing::debug;

use crate::common::AppResult;

/// Sheet-title lookups against a spreadsheet's metadata
#[async_trait]
pub trait SheetLookup: Send + Sync {
    /// Numeric ID of the sheet titled `title`; not found if absent
    async fn sheet_id(&self, spreadsheet_id: &str, title: &str) -> AppResult<i64>;

    /// Numeric ID of the first sheet in tab order
    async fn first_sheet_id(&self, spreadsheet_id: &str) -> AppResult<i64>;
}

/// Resolve an optional sheet title to its ID, defaulting to the first sheet
pub async fn resolve_sheet_id<L>(lookup: &L, spreadsheet_id: &str, title: Option<&str>) -> AppResult<i64>
where
    L: SheetLookup + ?Sized,
{
    match title {
        Some(title) => lookup.sheet_id(spreadsheet_id, title).await,
        None => lookup.first_sheet_id(spreadsheet_id).await,
    }
}

/// Resolve a range token, optionally prefixed with `SheetName!`, into a
/// `GridRange`.
///
/// The rectangle is parsed before any lookup so malformed input never costs a
/// network round trip.
pub async fn resolve_grid_range<L>(lookup: &L, spreadsheet_id: &str, token: &str) -> AppResult<GridRange>
where
    L: SheetLookup + ?Sized,
{
    let (title, cells) = split_sheet_prefix(token)?;
    let rect = parse_cell_range(cells)?;

    let sheet_id = resolve_sheet_id(lookup, spreadsheet_id, title.as_deref()).await?;
    debug!("Resolved {} to sheet {}", token, sheet_id);

    Ok(rect.on_sheet(sheet_id))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::common::{AppError, ErrorCode};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory spreadsheet metadata: (title, sheetId) in tab order
    pub(crate) struct FakeSheets {
        pub sheets: Vec<(&'static str, i64)>,
        pub lookups: AtomicUsize,
    }

    impl FakeSheets {
        pub(crate) fn new(sheets: Vec<(&'static str, i64)>) -> Self {
            Self {
                sheets,
                lookups: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SheetLookup for FakeSheets {
        async fn sheet_id(&self, _spreadsheet_id: &str, title: &str) -> AppResult<i64> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.sheets
                .iter()
                .find(|(t, _)| *t == title)
                .map(|(_, id)| *id)
                .ok_or_else(|| AppError::sheet_not_found(title))
        }

        async fn first_sheet_id(&self, spreadsheet_id: &str) -> AppResult<i64> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.sheets
                .first()
                .map(|(_, id)| *id)
                .ok_or_else(|| AppError::not_found(format!("spreadsheet {} has no sheets", spreadsheet_id)))
        }
    }

    fn workbook() -> FakeSheets {
        FakeSheets::new(vec![("Sheet1", 0), ("Sheet2", 42), ("Q1 Budget", 7)])
    }

    #[tokio::test]
    async fn test_resolves_named_sheet() {
        let grid = resolve_grid_range(&workbook(), "ss", "Sheet1!B2:C3").await.unwrap();
        assert_eq!(grid.sheet_id, 0);
        assert_eq!(
            (grid.start_column, grid.start_row, grid.end_column, grid.end_row),
            (1, 1, 3, 3)
        );
    }

    #[tokio::test]
    async fn test_end_to_end_sheet2() {
        let grid = resolve_grid_range(&workbook(), "ss", "Sheet2!C5:E9").await.unwrap();
        assert_eq!(
            grid,
            GridRange {
                sheet_id: 42,
                start_column: 2,
                start_row: 4,
                end_column: 5,
                end_row: 9,
            }
        );
    }

    #[tokio::test]
    async fn test_unprefixed_uses_first_sheet() {
        let sheets = FakeSheets::new(vec![("Data", 913), ("Other", 5)]);
        let grid = resolve_grid_range(&sheets, "ss", "A1:B2").await.unwrap();
        assert_eq!(grid.sheet_id, 913);
        assert_eq!((grid.end_column, grid.end_row), (2, 2));
    }

    #[tokio::test]
    async fn test_quoted_sheet_title() {
        let grid = resolve_grid_range(&workbook(), "ss", "'Q1 Budget'!A1:A1").await.unwrap();
        assert_eq!(grid.sheet_id, 7);
    }

    #[tokio::test]
    async fn test_unknown_sheet_is_not_found() {
        let err = resolve_grid_range(&workbook(), "ss", "Missing!A1:B2").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "sheet not found: Missing");
    }

    #[tokio::test]
    async fn test_malformed_range_skips_lookup() {
        let sheets = workbook();
        let err = resolve_grid_range(&sheets, "ss", "Sheet1!A1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(sheets.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolve_sheet_id_default() {
        assert_eq!(resolve_sheet_id(&workbook(), "ss", None).await.unwrap(), 0);
        assert_eq!(resolve_sheet_id(&workbook(), "ss", Some("Sheet2")).await.unwrap(), 42);
    }
}
