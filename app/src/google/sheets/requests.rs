//! `batchUpdate` request builders
//!
//! Each function returns one entry for the `requests` array of
//! `spreadsheets.batchUpdate`. They are pure; ranges arrive already resolved.

use gw_a1::{column_letter_to_index, CellRef, GridRange};
use serde_json::{json, Map, Value};

use crate::common::{AppError, AppResult};

/// RGB color with 0..1 channels, as the Sheets API expects
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Color {
    /// Parse `#RRGGBB` (the `#` is optional)
    pub fn from_hex(hex: &str) -> AppResult<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || AppError::invalid_input(format!("invalid color {:?} (expected #RRGGBB)", hex));

        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| -> AppResult<f64> {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map(|v| f64::from(v) / 255.0)
                .map_err(|_| invalid())
        };

        Ok(Self {
            red: channel(0)?,
            green: channel(2)?,
            blue: channel(4)?,
        })
    }

    fn to_json(self) -> Value {
        json!({ "red": self.red, "green": self.green, "blue": self.blue })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeType {
    All,
    Columns,
    Rows,
}

impl MergeType {
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(MergeType::All),
            "columns" => Ok(MergeType::Columns),
            "rows" => Ok(MergeType::Rows),
            other => Err(AppError::invalid_input(format!(
                "invalid merge type {:?} (expected all, columns or rows)",
                other
            ))),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            MergeType::All => "MERGE_ALL",
            MergeType::Columns => "MERGE_COLUMNS",
            MergeType::Rows => "MERGE_ROWS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartType {
    Column,
    Bar,
    Line,
    Area,
    Scatter,
    Pie,
}

impl ChartType {
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "column" => Ok(ChartType::Column),
            "bar" => Ok(ChartType::Bar),
            "line" => Ok(ChartType::Line),
            "area" => Ok(ChartType::Area),
            "scatter" => Ok(ChartType::Scatter),
            "pie" => Ok(ChartType::Pie),
            other => Err(AppError::invalid_input(format!("unsupported chart type {:?}", other))),
        }
    }

    fn basic_chart_type(&self) -> &'static str {
        match self {
            ChartType::Column => "COLUMN",
            ChartType::Bar => "BAR",
            ChartType::Line => "LINE",
            ChartType::Area => "AREA",
            ChartType::Scatter => "SCATTER",
            ChartType::Pie => "PIE",
        }
    }
}

/// Cell formatting to apply over a range; unset fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct CellFormat {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub background: Option<Color>,
    pub foreground: Option<Color>,
    pub number_format: Option<String>,
    pub horizontal_alignment: Option<String>,
}

impl CellFormat {
    /// The `userEnteredFormat` object and its field mask
    fn to_format_and_mask(&self) -> (Value, Vec<&'static str>) {
        let mut format = Map::new();
        let mut text = Map::new();
        let mut mask = Vec::new();

        if let Some(bold) = self.bold {
            text.insert("bold".into(), json!(bold));
            mask.push("userEnteredFormat.textFormat.bold");
        }
        if let Some(italic) = self.italic {
            text.insert("italic".into(), json!(italic));
            mask.push("userEnteredFormat.textFormat.italic");
        }
        if let Some(fg) = self.foreground {
            text.insert("foregroundColor".into(), fg.to_json());
            mask.push("userEnteredFormat.textFormat.foregroundColor");
        }
        if !text.is_empty() {
            format.insert("textFormat".into(), Value::Object(text));
        }
        if let Some(bg) = self.background {
            format.insert("backgroundColor".into(), bg.to_json());
            mask.push("userEnteredFormat.backgroundColor");
        }
        if let Some(pattern) = &self.number_format {
            format.insert("numberFormat".into(), json!({ "type": "NUMBER", "pattern": pattern }));
            mask.push("userEnteredFormat.numberFormat");
        }
        if let Some(align) = &self.horizontal_alignment {
            format.insert("horizontalAlignment".into(), json!(align));
            mask.push("userEnteredFormat.horizontalAlignment");
        }

        (Value::Object(format), mask)
    }
}

/// Parse `left|center|right` into the API's alignment enum
pub fn parse_alignment(s: &str) -> AppResult<String> {
    match s.to_ascii_lowercase().as_str() {
        "left" | "center" | "right" => Ok(s.to_ascii_uppercase()),
        other => Err(AppError::invalid_input(format!(
            "invalid alignment {:?} (expected left, center or right)",
            other
        ))),
    }
}

/// Parse a column span `C` or `C:E` into a zero-based, end-exclusive pair
pub fn parse_column_span(span: &str) -> AppResult<(u32, u32)> {
    let (first, last) = match span.split_once(':') {
        Some((a, b)) => (column_letter_to_index(a)?, column_letter_to_index(b)?),
        None => {
            let c = column_letter_to_index(span)?;
            (c, c)
        }
    };
    Ok((first.min(last), first.max(last) + 1))
}

pub fn merge_cells(range: &GridRange, merge_type: MergeType) -> Value {
    json!({ "mergeCells": { "range": range, "mergeType": merge_type.as_str() } })
}

pub fn unmerge_cells(range: &GridRange) -> Value {
    json!({ "unmergeCells": { "range": range } })
}

/// Sort rows of a range by one column; `column` is an absolute sheet index
pub fn sort_range(range: &GridRange, column: u32, descending: bool) -> AppResult<Value> {
    if column < range.start_column || column >= range.end_column {
        return Err(AppError::invalid_input(format!(
            "sort column {} lies outside the range",
            gw_a1::column_index_to_letters(column)
        )));
    }
    let order = if descending { "DESCENDING" } else { "ASCENDING" };
    Ok(json!({
        "sortRange": {
            "range": range,
            "sortSpecs": [{ "dimensionIndex": column, "sortOrder": order }]
        }
    }))
}

/// `repeatCell` applying a format over a range
pub fn repeat_cell_format(range: &GridRange, format: &CellFormat) -> AppResult<Value> {
    let (user_entered_format, mask) = format.to_format_and_mask();
    if mask.is_empty() {
        return Err(AppError::invalid_input("no formatting options given"));
    }
    Ok(json!({
        "repeatCell": {
            "range": range,
            "cell": { "userEnteredFormat": user_entered_format },
            "fields": mask.join(",")
        }
    }))
}

pub fn freeze(sheet_id: i64, rows: Option<u32>, columns: Option<u32>) -> AppResult<Value> {
    let mut grid = Map::new();
    let mut mask = Vec::new();
    if let Some(rows) = rows {
        grid.insert("frozenRowCount".into(), json!(rows));
        mask.push("gridProperties.frozenRowCount");
    }
    if let Some(columns) = columns {
        grid.insert("frozenColumnCount".into(), json!(columns));
        mask.push("gridProperties.frozenColumnCount");
    }
    if mask.is_empty() {
        return Err(AppError::invalid_input("freeze needs --rows and/or --columns"));
    }
    Ok(json!({
        "updateSheetProperties": {
            "properties": { "sheetId": sheet_id, "gridProperties": grid },
            "fields": mask.join(",")
        }
    }))
}

pub fn column_width(sheet_id: i64, start: u32, end: u32, pixels: u32) -> Value {
    json!({
        "updateDimensionProperties": {
            "range": {
                "sheetId": sheet_id,
                "dimension": "COLUMNS",
                "startIndex": start,
                "endIndex": end
            },
            "properties": { "pixelSize": pixels },
            "fields": "pixelSize"
        }
    })
}

pub fn set_basic_filter(range: &GridRange) -> Value {
    json!({ "setBasicFilter": { "filter": { "range": range } } })
}

pub fn clear_basic_filter(sheet_id: i64) -> Value {
    json!({ "clearBasicFilter": { "sheetId": sheet_id } })
}

pub fn add_named_range(name: &str, range: &GridRange) -> Value {
    json!({ "addNamedRange": { "namedRange": { "name": name, "range": range } } })
}

pub fn delete_named_range(named_range_id: &str) -> Value {
    json!({ "deleteNamedRange": { "namedRangeId": named_range_id } })
}

pub fn add_sheet(title: &str) -> Value {
    json!({ "addSheet": { "properties": { "title": title } } })
}

pub fn delete_sheet(sheet_id: i64) -> Value {
    json!({ "deleteSheet": { "sheetId": sheet_id } })
}

pub fn rename_sheet(sheet_id: i64, title: &str) -> Value {
    json!({
        "updateSheetProperties": {
            "properties": { "sheetId": sheet_id, "title": title },
            "fields": "title"
        }
    })
}

/// `addChart` over a data range whose first column is the domain (x-axis or
/// pie labels) and whose remaining columns are series. The first row is
/// treated as headers.
pub fn add_chart(
    range: &GridRange,
    chart_type: ChartType,
    title: Option<&str>,
    anchor: Option<CellRef>,
) -> AppResult<Value> {
    if range.end_column - range.start_column < 2 {
        return Err(AppError::invalid_input(
            "chart range needs at least two columns (labels + one series)",
        ));
    }

    let source = |column: u32| json!({ "sourceRange": { "sources": [range.column(column)] } });

    let mut spec = match chart_type {
        ChartType::Pie => json!({
            "pieChart": {
                "legendPosition": "RIGHT_LEGEND",
                "domain": source(range.start_column),
                "series": source(range.start_column + 1)
            }
        }),
        _ => {
            let series: Vec<Value> = (range.start_column + 1..range.end_column)
                .map(|c| json!({ "series": source(c), "targetAxis": "LEFT_AXIS" }))
                .collect();
            json!({
                "basicChart": {
                    "chartType": chart_type.basic_chart_type(),
                    "legendPosition": "BOTTOM_LEGEND",
                    "headerCount": 1,
                    "domains": [{ "domain": source(range.start_column) }],
                    "series": series
                }
            })
        }
    };
    if let Some(title) = title {
        spec["title"] = json!(title);
    }

    let position = match anchor {
        Some(cell) => json!({
            "overlayPosition": {
                "anchorCell": {
                    "sheetId": range.sheet_id,
                    "rowIndex": cell.row,
                    "columnIndex": cell.column
                }
            }
        }),
        None => json!({ "newSheet": true }),
    };

    Ok(json!({ "addChart": { "chart": { "spec": spec, "position": position } } }))
}

/// `addConditionalFormatRule` with a boolean condition such as
/// `NUMBER_GREATER` or `TEXT_CONTAINS`, inserted at highest priority
pub fn add_conditional_format(
    range: &GridRange,
    condition: &str,
    values: &[String],
    background: Option<Color>,
    bold: bool,
) -> AppResult<Value> {
    let condition_type = condition.trim().to_ascii_uppercase();
    if condition_type.is_empty()
        || !condition_type
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b == b'_')
    {
        return Err(AppError::invalid_input(format!("invalid condition type {:?}", condition)));
    }
    if background.is_none() && !bold {
        return Err(AppError::invalid_input(
            "conditional format needs --background and/or --bold",
        ));
    }

    let mut format = Map::new();
    if let Some(bg) = background {
        format.insert("backgroundColor".into(), bg.to_json());
    }
    if bold {
        format.insert("textFormat".into(), json!({ "bold": true }));
    }

    let mut condition_json = json!({ "type": condition_type });
    if !values.is_empty() {
        condition_json["values"] = values
            .iter()
            .map(|v| json!({ "userEnteredValue": v }))
            .collect();
    }

    Ok(json!({
        "addConditionalFormatRule": {
            "rule": {
                "ranges": [range],
                "booleanRule": { "condition": condition_json, "format": format }
            },
            "index": 0
        }
    }))
}
