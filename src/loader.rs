use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use polars::prelude::*;

use crate::error::{ExplorerError, Result};

/// Read a table file with all columns as String dtype, by extension:
/// `.xlsx`/`.xlsm` through calamine, anything else as CSV.
pub fn read_table_as_strings(
    path: &Path,
    rename: Option<&HashMap<String, String>>,
) -> Result<DataFrame> {
    let is_workbook = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx") || e.eq_ignore_ascii_case("xlsm"));
    if is_workbook {
        read_xlsx_as_strings(path, rename)
    } else {
        read_csv_as_strings(path, rename)
    }
}

/// Read a CSV file with all columns as String dtype.
/// Trims whitespace from column names and applies optional rename.
pub fn read_csv_as_strings(
    path: &Path,
    rename: Option<&HashMap<String, String>>,
) -> Result<DataFrame> {
    ensure_exists(path)?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    finish_table(df, path, rename)
}

/// Read the first sheet of an Excel workbook with all columns as String
/// dtype. The first row holds the headers; numeric cells are rendered
/// without a trailing `.0` so integer codes read back as written.
pub fn read_xlsx_as_strings(
    path: &Path,
    rename: Option<&HashMap<String, String>>,
) -> Result<DataFrame> {
    ensure_exists(path)?;

    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet = workbook.sheet_names().first().cloned().ok_or_else(|| {
        ExplorerError::InvalidData(format!("{} contains no sheets", path.display()))
    })?;
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .map(|cell| cell_to_string(cell).unwrap_or_default())
            .collect(),
        None => {
            return Err(ExplorerError::InvalidData(format!(
                "{} sheet '{}' is empty",
                path.display(),
                sheet
            )))
        }
    };

    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (idx, column) in values.iter_mut().enumerate() {
            column.push(row.get(idx).and_then(cell_to_string));
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(values)
        .map(|(name, vals)| Column::new(name.as_str().into(), vals))
        .collect();
    let df = DataFrame::new(columns)?;

    finish_table(df, path, rename)
}

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(dt.as_f64().to_string()),
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ExplorerError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )));
    }
    Ok(())
}

/// Trim header whitespace, apply the optional rename and log the shape.
fn finish_table(
    mut df: DataFrame,
    path: &Path,
    rename: Option<&HashMap<String, String>>,
) -> Result<DataFrame> {
    // Trim whitespace from column names
    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;

    // Apply optional column rename
    if let Some(map) = rename {
        let old: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
        let new: Vec<&str> = map.values().map(|s| s.as_str()).collect();
        df = df.lazy().rename(old, new, true).collect()?;
    }

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "read table"
    );

    Ok(df)
}

pub fn require_columns(df: &DataFrame, required: &[&str]) -> Result<()> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(ExplorerError::MissingColumn(col_name.to_string()));
        }
    }
    Ok(())
}

/// Keep only the listed columns that exist in `df`, in the listed order.
pub fn select_present(df: DataFrame, wanted: &[&str]) -> Result<DataFrame> {
    let present: Vec<&str> = wanted
        .iter()
        .copied()
        .filter(|name| df.column(name).is_ok())
        .collect();
    Ok(df.select(present)?)
}
