//! Workbook reader for record tables kept as spreadsheets.
//!
//! The first row of the sheet is the header row; every later row becomes one
//! record keyed by those headers.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use indexmap::IndexMap;
use serde_json::Value;

use super::table::RecordSourceError;

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Whether `path` names a workbook rather than a JSON export.
pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Read one sheet into raw rows. `sheet_name` of `None` reads the first sheet.
pub fn read_sheet(
    path: &Path,
    sheet_name: Option<&str>,
) -> Result<Vec<IndexMap<String, Value>>, RecordSourceError> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_names = workbook.sheet_names();
    let sheet = match sheet_name {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| RecordSourceError::SheetNotFound(name.to_string()))?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| RecordSourceError::SheetNotFound("<first sheet>".to_string()))?,
    };

    let range = workbook.worksheet_range(&sheet)?;
    let mut rows = range.rows();

    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers = header_names(header_row);

    Ok(rows
        .filter(|cells| cells.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let value = cells.get(i).map(cell_value).unwrap_or(Value::Null);
                    (header.clone(), value)
                })
                .collect()
        })
        .collect())
}

/// Header text per column; blank headers get a positional name and repeats a suffix.
fn header_names(cells: &[Data]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(cells.len());
    for (i, cell) in cells.iter().enumerate() {
        let base = match cell_value(cell) {
            Value::Null => format!("Unnamed: {}", i),
            Value::String(s) if s.trim().is_empty() => format!("Unnamed: {}", i),
            Value::String(s) => s,
            other => other.to_string(),
        };

        let mut name = base.clone();
        let mut n = 1;
        while names.contains(&name) {
            name = format!("{}.{}", base, n);
            n += 1;
        }
        names.push(name);
    }
    names
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) if s.trim().is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => Value::from(*f),
        Data::Bool(b) => Value::Bool(*b),
        other => Value::String(other.to_string()),
    }
}
