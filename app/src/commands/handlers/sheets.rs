//! Google Sheets Handler
//!
//! Value commands go straight to the values endpoints. Editing commands
//! resolve their A1 ranges against spreadsheet metadata and send a single
//! `batchUpdate`.

use gw_a1::{column_letter_to_index, parse_cell_ref, GridRange};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::common::{
    bool_with_default, list_response, optional_string, optional_u32, require_json, require_string, string_array, string_with_default,
};
use crate::commands::schema::{CommandSpec, ParamSpec};
use crate::common::{AppError, AppResult};
use crate::context::AppContext;
use crate::google::common::extract_array;
use crate::google::sheets::range::resolve_sheet_id;
use crate::google::sheets::requests::{self, CellFormat, ChartType, Color, MergeType};
use crate::google::sheets::{resolve_grid_range, SheetLookup, ValueInput};
use crate::google::SheetsApi;

const SPREADSHEET: ParamSpec = ParamSpec::arg("spreadsheet", "Spreadsheet ID");
const RANGE: ParamSpec = ParamSpec::arg("range", "A1 range, optionally sheet-qualified: Sheet1!A1:D10");
const SHEET: ParamSpec = ParamSpec::text("sheet", "Sheet title (default: first sheet)");
const VALUES: ParamSpec = ParamSpec::text("values", "JSON rows, e.g. '[[\"Name\",\"Qty\"],[\"Bolts\",12]]'").required();
const RAW: ParamSpec = ParamSpec::flag("raw", "Store input verbatim instead of parsing it like typed input");

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        namespace: "sheets",
        action: "get",
        about: "Show spreadsheet title, sheets and named ranges",
        params: &[SPREADSHEET],
    },
    CommandSpec {
        namespace: "sheets",
        action: "read",
        about: "Read cell values",
        params: &[
            SPREADSHEET,
            RANGE,
            ParamSpec::text("render", "formatted, unformatted or formula").default("formatted"),
        ],
    },
    CommandSpec {
        namespace: "sheets",
        action: "write",
        about: "Overwrite cell values",
        params: &[SPREADSHEET, RANGE, VALUES, RAW],
    },
    CommandSpec {
        namespace: "sheets",
        action: "append",
        about: "Append rows after the table in a range",
        params: &[SPREADSHEET, RANGE, VALUES, RAW],
    },
    CommandSpec {
        namespace: "sheets",
        action: "clear",
        about: "Clear cell values, keeping formatting",
        params: &[SPREADSHEET, RANGE],
    },
    CommandSpec {
        namespace: "sheets",
        action: "create",
        about: "Create a spreadsheet",
        params: &[
            ParamSpec::arg("title", "Spreadsheet title"),
            ParamSpec::list("sheets", "Initial sheet titles"),
        ],
    },
    CommandSpec {
        namespace: "sheets",
        action: "add-sheet",
        about: "Add a sheet",
        params: &[SPREADSHEET, ParamSpec::arg("title", "New sheet title")],
    },
    CommandSpec {
        namespace: "sheets",
        action: "delete-sheet",
        about: "Delete a sheet",
        params: &[SPREADSHEET, ParamSpec::arg("sheet", "Sheet title")],
    },
    CommandSpec {
        namespace: "sheets",
        action: "rename-sheet",
        about: "Rename a sheet",
        params: &[
            SPREADSHEET,
            ParamSpec::arg("sheet", "Current sheet title"),
            ParamSpec::arg("title", "New sheet title"),
        ],
    },
    CommandSpec {
        namespace: "sheets",
        action: "merge",
        about: "Merge cells",
        params: &[
            SPREADSHEET,
            RANGE,
            ParamSpec::text("type", "all, columns or rows").default("all"),
        ],
    },
    CommandSpec {
        namespace: "sheets",
        action: "unmerge",
        about: "Unmerge cells",
        params: &[SPREADSHEET, RANGE],
    },
    CommandSpec {
        namespace: "sheets",
        action: "sort",
        about: "Sort the rows of a range by one column",
        params: &[
            SPREADSHEET,
            RANGE,
            ParamSpec::text("column", "Column letter to sort by, e.g. C").required(),
            ParamSpec::flag("descending", "Sort Z to A"),
        ],
    },
    CommandSpec {
        namespace: "sheets",
        action: "format",
        about: "Format cells",
        params: &[
            SPREADSHEET,
            RANGE,
            ParamSpec::flag("bold", "Bold text"),
            ParamSpec::flag("italic", "Italic text"),
            ParamSpec::text("background", "Fill colour, #RRGGBB"),
            ParamSpec::text("foreground", "Text colour, #RRGGBB"),
            ParamSpec::text("number-format", "Number pattern, e.g. \"#,##0.00\""),
            ParamSpec::text("align", "left, center or right"),
        ],
    },
    CommandSpec {
        namespace: "sheets",
        action: "freeze",
        about: "Freeze header rows and/or columns",
        params: &[
            SPREADSHEET,
            SHEET,
            ParamSpec::number("rows", "Rows to freeze (0 unfreezes)"),
            ParamSpec::number("columns", "Columns to freeze (0 unfreezes)"),
        ],
    },
    CommandSpec {
        namespace: "sheets",
        action: "column-width",
        about: "Set the pixel width of columns",
        params: &[
            SPREADSHEET,
            ParamSpec::arg("columns", "Column or span, e.g. C or C:E"),
            ParamSpec::number("width", "Width in pixels").required(),
            SHEET,
        ],
    },
    CommandSpec {
        namespace: "sheets",
        action: "filter",
        about: "Set the sheet's basic filter over a range",
        params: &[SPREADSHEET, RANGE],
    },
    CommandSpec {
        namespace: "sheets",
        action: "filter-clear",
        about: "Remove the basic filter",
        params: &[SPREADSHEET, SHEET],
    },
    CommandSpec {
        namespace: "sheets",
        action: "named-range-add",
        about: "Name a range",
        params: &[SPREADSHEET, ParamSpec::arg("name", "Range name"), RANGE],
    },
    CommandSpec {
        namespace: "sheets",
        action: "named-ranges",
        about: "List named ranges",
        params: &[SPREADSHEET],
    },
    CommandSpec {
        namespace: "sheets",
        action: "named-range-delete",
        about: "Delete a named range",
        params: &[SPREADSHEET, ParamSpec::arg("name", "Range name or ID")],
    },
    CommandSpec {
        namespace: "sheets",
        action: "chart",
        about: "Chart a range: first column labels, remaining columns series",
        params: &[
            SPREADSHEET,
            RANGE,
            ParamSpec::text("type", "column, bar, line, area, scatter or pie").default("column"),
            ParamSpec::text("title", "Chart title"),
            ParamSpec::text("anchor", "Place over the data sheet at this cell (default: new sheet)"),
        ],
    },
    CommandSpec {
        namespace: "sheets",
        action: "conditional-format",
        about: "Highlight cells matching a condition",
        params: &[
            SPREADSHEET,
            RANGE,
            ParamSpec::text("condition", "Condition type, e.g. NUMBER_GREATER or TEXT_CONTAINS").required(),
            ParamSpec::list("value", "Condition operands"),
            ParamSpec::text("background", "Fill colour, #RRGGBB"),
            ParamSpec::flag("bold", "Bold text"),
        ],
    },
];

/// Handle Google Sheets commands
pub async fn handle(ctx: &AppContext, action: &str, params: &Value) -> AppResult<Value> {
    let sheets = SheetsApi::new(ctx.google().await?);

    match action {
        "get" => {
            let id = require_string(params, "spreadsheet")?;
            let meta = sheets
                .get_spreadsheet(
                    id,
                    Some("spreadsheetId,spreadsheetUrl,properties.title,sheets.properties,namedRanges"),
                )
                .await?;
            Ok(summarize_spreadsheet(&meta))
        }
        "read" => {
            let id = require_string(params, "spreadsheet")?;
            let range = require_string(params, "range")?;
            let render = render_option(string_with_default(params, "render", "formatted"))?;
            let response = sheets.get_values(id, range, render).await?;

            let values = response.get("values").cloned().unwrap_or_else(|| json!([]));
            let rows = values.as_array().map(|r| r.len()).unwrap_or(0);
            Ok(json!({ "range": response.get("range"), "values": values, "rowCount": rows }))
        }
        "write" | "append" => {
            let id = require_string(params, "spreadsheet")?;
            let range = require_string(params, "range")?;
            let values = value_rows(require_json(params, "values")?)?;
            let input = if bool_with_default(params, "raw", false) {
                ValueInput::Raw
            } else {
                ValueInput::UserEntered
            };

            if action == "write" {
                let response = sheets.update_values(id, range, &values, input).await?;
                Ok(update_summary(&response))
            } else {
                let response = sheets.append_values(id, range, &values, input).await?;
                Ok(update_summary(response.get("updates").unwrap_or(&Value::Null)))
            }
        }
        "clear" => {
            let id = require_string(params, "spreadsheet")?;
            let response = sheets.clear_values(id, require_string(params, "range")?).await?;
            Ok(json!({ "clearedRange": response.get("clearedRange") }))
        }
        "create" => {
            let title = require_string(params, "title")?;
            let created = sheets.create(title, &string_array(params, "sheets")).await?;
            Ok(summarize_spreadsheet(&created))
        }
        "named-ranges" => {
            let id = require_string(params, "spreadsheet")?;
            let meta = sheets.get_spreadsheet(id, Some("namedRanges")).await?;
            Ok(list_response("namedRanges", extract_array(&meta, "namedRanges")))
        }
        "named-range-delete" => {
            let id = require_string(params, "spreadsheet")?;
            let name = require_string(params, "name")?;
            let meta = sheets.get_spreadsheet(id, Some("namedRanges")).await?;
            let named_range_id = find_named_range(&meta, name)?;

            sheets
                .batch_update(id, vec![requests::delete_named_range(&named_range_id)])
                .await?;
            Ok(json!({ "spreadsheetId": id, "deleted": named_range_id }))
        }
        _ => {
            let id = require_string(params, "spreadsheet")?;
            let batch = edit_requests(&sheets, action, params).await?;
            let response = sheets.batch_update(id, batch).await?;
            Ok(batch_summary(id, action, &response))
        }
    }
}

/// Build the `batchUpdate` requests for an editing command
pub(crate) async fn edit_requests<L>(lookup: &L, action: &str, params: &Value) -> AppResult<Vec<Value>>
where
    L: SheetLookup + ?Sized,
{
    let id = require_string(params, "spreadsheet")?;

    let request = match action {
        "add-sheet" => requests::add_sheet(require_string(params, "title")?),
        "delete-sheet" => {
            let sheet = require_string(params, "sheet")?;
            requests::delete_sheet(lookup.sheet_id(id, sheet).await?)
        }
        "rename-sheet" => {
            let sheet = require_string(params, "sheet")?;
            let title = require_string(params, "title")?;
            requests::rename_sheet(lookup.sheet_id(id, sheet).await?, title)
        }
        "merge" => {
            let merge_type = MergeType::parse(string_with_default(params, "type", "all"))?;
            requests::merge_cells(&grid(lookup, params).await?, merge_type)
        }
        "unmerge" => requests::unmerge_cells(&grid(lookup, params).await?),
        "sort" => {
            let column = column_letter_to_index(require_string(params, "column")?)?;
            let descending = bool_with_default(params, "descending", false);
            requests::sort_range(&grid(lookup, params).await?, column, descending)?
        }
        "format" => {
            let format = cell_format(params)?;
            requests::repeat_cell_format(&grid(lookup, params).await?, &format)?
        }
        "freeze" => {
            let rows = optional_u32(params, "rows")?;
            let columns = optional_u32(params, "columns")?;
            if rows.is_none() && columns.is_none() {
                return Err(AppError::invalid_input("freeze needs --rows and/or --columns"));
            }
            requests::freeze(sheet_id(lookup, params).await?, rows, columns)?
        }
        "column-width" => {
            let (start, end) = requests::parse_column_span(require_string(params, "columns")?)?;
            let width = optional_u32(params, "width")?.ok_or_else(|| AppError::missing_param("width"))?;
            requests::column_width(sheet_id(lookup, params).await?, start, end, width)
        }
        "filter" => requests::set_basic_filter(&grid(lookup, params).await?),
        "filter-clear" => requests::clear_basic_filter(sheet_id(lookup, params).await?),
        "named-range-add" => {
            let name = require_string(params, "name")?;
            requests::add_named_range(name, &grid(lookup, params).await?)
        }
        "chart" => {
            let chart_type = ChartType::parse(string_with_default(params, "type", "column"))?;
            let anchor = optional_string(params, "anchor").map(parse_cell_ref).transpose()?;
            requests::add_chart(&grid(lookup, params).await?, chart_type, optional_string(params, "title"), anchor)?
        }
        "conditional-format" => {
            let condition = require_string(params, "condition")?;
            let background = optional_string(params, "background").map(Color::from_hex).transpose()?;
            let bold = bool_with_default(params, "bold", false);
            requests::add_conditional_format(
                &grid(lookup, params).await?,
                condition,
                &string_array(params, "value"),
                background,
                bold,
            )?
        }
        _ => return Err(AppError::not_found(format!("unknown command: sheets {}", action))),
    };

    debug!("sheets {} request: {}", action, request);
    Ok(vec![request])
}

/// The `range` param resolved against the spreadsheet's sheets
async fn grid<L>(lookup: &L, params: &Value) -> AppResult<GridRange>
where
    L: SheetLookup + ?Sized,
{
    let id = require_string(params, "spreadsheet")?;
    resolve_grid_range(lookup, id, require_string(params, "range")?).await
}

/// The `--sheet` param as a sheet ID, defaulting to the first sheet
async fn sheet_id<L>(lookup: &L, params: &Value) -> AppResult<i64>
where
    L: SheetLookup + ?Sized,
{
    let id = require_string(params, "spreadsheet")?;
    resolve_sheet_id(lookup, id, optional_string(params, "sheet")).await
}

fn cell_format(params: &Value) -> AppResult<CellFormat> {
    let color = |key| optional_string(params, key).map(Color::from_hex).transpose();
    Ok(CellFormat {
        bold: bool_with_default(params, "bold", false).then_some(true),
        italic: bool_with_default(params, "italic", false).then_some(true),
        background: color("background")?,
        foreground: color("foreground")?,
        number_format: optional_string(params, "number-format").map(String::from),
        horizontal_alignment: optional_string(params, "align")
            .map(requests::parse_alignment)
            .transpose()?,
    })
}

fn render_option(render: &str) -> AppResult<&'static str> {
    match render.to_ascii_lowercase().as_str() {
        "formatted" | "formatted_value" => Ok("FORMATTED_VALUE"),
        "unformatted" | "unformatted_value" => Ok("UNFORMATTED_VALUE"),
        "formula" => Ok("FORMULA"),
        other => Err(AppError::invalid_input(format!(
            "invalid render option {:?} (expected formatted, unformatted or formula)",
            other
        ))),
    }
}

/// Values must be a JSON array of rows; a flat array is one row
fn value_rows(values: Value) -> AppResult<Value> {
    let Value::Array(items) = values else {
        return Err(AppError::invalid_input("--values must be a JSON array of rows"));
    };
    if items.is_empty() {
        return Err(AppError::invalid_input("--values is empty"));
    }
    if items.iter().all(Value::is_array) {
        Ok(Value::Array(items))
    } else if items.iter().any(Value::is_array) {
        Err(AppError::invalid_input("--values mixes rows and single values"))
    } else {
        Ok(json!([items]))
    }
}

/// The ID of the named range whose name (or ID) matches
fn find_named_range(meta: &Value, name: &str) -> AppResult<String> {
    extract_array(meta, "namedRanges")
        .iter()
        .find(|r| {
            r.get("name").and_then(|v| v.as_str()) == Some(name)
                || r.get("namedRangeId").and_then(|v| v.as_str()) == Some(name)
        })
        .and_then(|r| r.get("namedRangeId").and_then(|v| v.as_str()))
        .map(String::from)
        .ok_or_else(|| AppError::not_found(format!("named range not found: {}", name)))
}

fn summarize_spreadsheet(meta: &Value) -> Value {
    let sheets: Vec<Value> = extract_array(meta, "sheets")
        .iter()
        .filter_map(|s| s.get("properties"))
        .map(|p| {
            json!({
                "sheetId": p.get("sheetId").and_then(|v| v.as_i64()).unwrap_or(0),
                "title": p.get("title"),
                "index": p.get("index").and_then(|v| v.as_i64()).unwrap_or(0),
                "rowCount": p.pointer("/gridProperties/rowCount"),
                "columnCount": p.pointer("/gridProperties/columnCount"),
            })
        })
        .collect();

    json!({
        "spreadsheetId": meta.get("spreadsheetId"),
        "title": meta.pointer("/properties/title"),
        "url": meta.get("spreadsheetUrl"),
        "sheets": sheets,
        "namedRanges": extract_array(meta, "namedRanges"),
    })
}

fn update_summary(update: &Value) -> Value {
    json!({
        "updatedRange": update.get("updatedRange"),
        "updatedRows": update.get("updatedRows"),
        "updatedColumns": update.get("updatedColumns"),
        "updatedCells": update.get("updatedCells"),
    })
}

fn batch_summary(spreadsheet_id: &str, action: &str, response: &Value) -> Value {
    info!("sheets {} applied to {}", action, spreadsheet_id);

    let reply = extract_array(response, "replies")
        .into_iter()
        .find(|r| r.as_object().is_some_and(|o| !o.is_empty()));
    json!({
        "spreadsheetId": spreadsheet_id,
        "applied": action,
        "reply": reply,
    })
}
