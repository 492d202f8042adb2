//! Text and type cleanup applied once at load time.
//!
//! Missing-value markers become real nulls here so nothing downstream needs
//! to compare against `"[ND]"` or `"null"` again.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;

use crate::error::Result;
use crate::hierarchy::Hierarchy;
use crate::schema::{establishment, missing};

/// Characters removed from hierarchy labels.
const QUOTES: [char; 2] = ['\'', '"'];

/// ISO format creation dates are rewritten to.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn strip_quotes(label: &str) -> String {
    label.chars().filter(|c| !QUOTES.contains(c)).collect()
}

pub fn is_missing_marker(value: &str) -> bool {
    missing::MARKERS.contains(&value.trim())
}

/// Parse a Lambert coordinate, treating markers and garbage as missing.
pub fn parse_coordinate(value: &str) -> Option<f64> {
    if is_missing_marker(value) {
        return None;
    }
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a creation date. Accepts plain dates and ISO timestamps.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if is_missing_marker(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Expression turning marker values of a string column into nulls and
/// trimming the rest.
fn nullify_markers(name: &str) -> Expr {
    let trimmed = col(name).str().strip_chars(lit(" \t\r\n"));
    let is_marker = trimmed
        .clone()
        .eq(lit(missing::NOT_DISCLOSED))
        .or(trimmed.clone().eq(lit(missing::NULL)));
    when(is_marker)
        .then(lit(NULL).cast(DataType::String))
        .otherwise(trimmed)
        .alias(name)
}

/// Replace a string column by mapping every non-null value through `f`.
fn map_string_column<F>(df: &mut DataFrame, name: &str, f: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let mapped: StringChunked = df
        .column(name)?
        .str()?
        .into_iter()
        .map(|v| v.and_then(&f))
        .collect();
    df.with_column(mapped.with_name(name.into()).into_series())?;
    Ok(())
}

/// Clean establishment records: markers → null on every string column,
/// coordinates → nullable f64, creation dates → canonical ISO text or null.
pub fn normalize_establishments(raw: DataFrame) -> Result<DataFrame> {
    let string_cols: Vec<String> = raw
        .get_columns()
        .iter()
        .filter(|c| c.dtype() == &DataType::String)
        .map(|c| c.name().to_string())
        .collect();

    let mut df = raw
        .lazy()
        .with_columns(
            string_cols
                .iter()
                .map(|c| nullify_markers(c))
                .collect::<Vec<_>>(),
        )
        .collect()?;

    for name in establishment::COORDINATES {
        if df.column(name).is_err() {
            continue;
        }
        let parsed: Float64Chunked = df
            .column(name)?
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_coordinate))
            .collect();
        df.with_column(parsed.with_name(name.into()).into_series())?;
    }

    for name in establishment::CREATION_DATES {
        if df.column(name).is_ok() {
            map_string_column(&mut df, name, |v| {
                parse_date(v).map(|d| d.format(DATE_FORMAT).to_string())
            })?;
        }
    }

    Ok(df)
}

/// Clean a hierarchy table: markers → null, codes trimmed, quotes stripped
/// from labels.
pub fn normalize_hierarchy(raw: DataFrame, hierarchy: Hierarchy) -> Result<DataFrame> {
    let exprs: Vec<Expr> = hierarchy
        .code_columns()
        .chain(hierarchy.label_columns())
        .map(nullify_markers)
        .collect();
    let mut df = raw.lazy().with_columns(exprs).collect()?;

    for name in hierarchy.label_columns() {
        map_string_column(&mut df, name, |v| Some(strip_quotes(v).trim().to_string()))?;
    }
    Ok(df)
}
