use std::collections::BTreeSet;

use polars::prelude::*;

use crate::error::Result;
use crate::hierarchy::Hierarchy;
use crate::join::WorkingTable;
use crate::normalize::parse_date;
use crate::schema::establishment;
use crate::selection::{DateRange, HierarchySelection, SelectionMode, Selections};

/// A single row restriction. Every filter is a pure predicate over one row,
/// so any set of them composes by AND in any order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFilter {
    /// Keep rows whose label is in `values`.
    Include {
        column: &'static str,
        values: BTreeSet<String>,
    },
    /// Drop rows whose label is in `values`. Null labels are kept.
    Exclude {
        column: &'static str,
        values: BTreeSet<String>,
    },
    /// Keep rows whose creation date falls in the range. Rows without a
    /// date are dropped.
    Created(DateRange),
}

impl RowFilter {
    /// Row mask for this filter over `df`.
    pub fn mask(&self, df: &DataFrame) -> Result<BooleanChunked> {
        match self {
            Self::Include { column, values } => membership_mask(df, column, values, true),
            Self::Exclude { column, values } => membership_mask(df, column, values, false),
            Self::Created(range) => {
                let dates = df.column(range.field.column())?.str()?;
                Ok(BooleanChunked::from_iter_values(
                    "mask".into(),
                    dates
                        .into_iter()
                        .map(|v| v.and_then(parse_date).is_some_and(|d| range.contains(d))),
                ))
            }
        }
    }

    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let mask = self.mask(df)?;
        Ok(df.filter(&mask)?)
    }
}

/// Mask of rows whose `column` value is (or, with `keep_members = false`, is
/// not) one of `values`.
pub(crate) fn membership_mask(
    df: &DataFrame,
    column: &str,
    values: &BTreeSet<String>,
    keep_members: bool,
) -> Result<BooleanChunked> {
    let labels = df.column(column)?.str()?;
    Ok(BooleanChunked::from_iter_values(
        "mask".into(),
        labels
            .into_iter()
            .map(|v| v.is_some_and(|s| values.contains(s)) == keep_members),
    ))
}

/// Row filters for every active level of one hierarchy.
pub fn hierarchy_filters(selection: &HierarchySelection) -> Vec<RowFilter> {
    let hierarchy: Hierarchy = selection.hierarchy();
    hierarchy
        .levels()
        .iter()
        .zip(selection.levels())
        .filter(|(_, sel)| sel.is_active())
        .map(|(columns, sel)| match sel.mode {
            SelectionMode::Include => RowFilter::Include {
                column: columns.label,
                values: sel.values.clone(),
            },
            // is_active() ruled out SelectionMode::None
            _ => RowFilter::Exclude {
                column: columns.label,
                values: sel.values.clone(),
            },
        })
        .collect()
}

/// All row filters of a selection set: activity levels, legal-category
/// levels, then the date range.
pub fn row_filters(selections: &Selections) -> Vec<RowFilter> {
    let mut filters = hierarchy_filters(&selections.activity);
    filters.extend(hierarchy_filters(&selections.legal_category));
    if let Some(range) = selections.dates.filter(|r| r.is_bounded()) {
        filters.push(RowFilter::Created(range));
    }
    filters
}

/// Apply filters by successive narrowing.
pub fn apply_row_filters(df: &DataFrame, filters: &[RowFilter]) -> Result<DataFrame> {
    let mut current = df.clone();
    for filter in filters {
        let before = current.height();
        current = filter.apply(&current)?;
        tracing::debug!(?filter, before, after = current.height(), "applied filter");
    }
    Ok(current)
}

/// Working rows left after every selection, with their distinct siret count.
#[derive(Debug, Clone)]
pub struct FilteredTable {
    frame: DataFrame,
    distinct_count: usize,
}

impl FilteredTable {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn distinct_count(&self) -> usize {
        self.distinct_count
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }
}

/// Apply the full set of selections to the working table.
///
/// Selections are taken as given; they are not checked against the options
/// the resolver offered. A reversed date range fails with `InvalidDateRange`.
pub fn apply_filters(table: &WorkingTable, selections: &Selections) -> Result<FilteredTable> {
    if let Some(range) = &selections.dates {
        range.validate()?;
    }
    let filters = row_filters(selections);
    let frame = apply_row_filters(table.frame(), &filters)?;
    let distinct_count = distinct_sirets(&frame)?;
    Ok(FilteredTable {
        frame,
        distinct_count,
    })
}

pub fn distinct_sirets(df: &DataFrame) -> Result<usize> {
    if df.height() == 0 {
        return Ok(0);
    }
    Ok(df
        .column(establishment::SIRET)?
        .as_materialized_series()
        .n_unique()?)
}
