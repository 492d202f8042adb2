use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::filter::FilteredTable;
use crate::schema::{activity, aggregate, establishment};

/// Dense (level-1 × level-2) activity count matrix.
///
/// Rows are the level-1 labels present in the data, columns every level-2
/// label present anywhere in it; both sorted ascending. Missing combinations
/// hold 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountMatrix {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `cells[r][c]` counts rows labelled `rows[r]` / `columns[c]`.
    pub cells: Vec<Vec<u64>>,
}

impl CountMatrix {
    /// Build from sparse (row, column) → count cells.
    pub fn from_cells(sparse: &BTreeMap<(String, String), u64>) -> Self {
        let rows: BTreeSet<&String> = sparse.keys().map(|(r, _)| r).collect();
        let columns: BTreeSet<&String> = sparse.keys().map(|(_, c)| c).collect();

        let cells = rows
            .iter()
            .map(|r| {
                columns
                    .iter()
                    .map(|c| {
                        sparse
                            .get(&((*r).clone(), (*c).clone()))
                            .copied()
                            .unwrap_or(0)
                    })
                    .collect()
            })
            .collect();

        Self {
            rows: rows.into_iter().cloned().collect(),
            columns: columns.into_iter().cloned().collect(),
            cells,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: &str, column: &str) -> Option<u64> {
        let r = self.rows.iter().position(|x| x == row)?;
        let c = self.columns.iter().position(|x| x == column)?;
        Some(self.cells[r][c])
    }

    pub fn row_total(&self, row: &str) -> Option<u64> {
        let r = self.rows.iter().position(|x| x == row)?;
        Some(self.cells[r].iter().sum())
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }

    /// Wide frame for charting: the level-1 label column, then one count
    /// column per level-2 label.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Column::new(activity::NIV1_LABEL.into(), &self.rows));
        for (c, name) in self.columns.iter().enumerate() {
            let counts: Vec<u64> = self.cells.iter().map(|row| row[c]).collect();
            columns.push(Column::new(name.as_str().into(), &counts));
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Count filtered rows per (activity level-1 label, level-2 label).
pub fn count_by_sector(filtered: &DataFrame) -> Result<CountMatrix> {
    if filtered.height() == 0 {
        return Ok(CountMatrix::default());
    }

    let grouped = filtered
        .clone()
        .lazy()
        .group_by([col(activity::NIV1_LABEL), col(activity::NIV2_LABEL)])
        .agg([col(establishment::SIRET).count().alias(aggregate::COUNT)])
        .collect()?;

    let sectors = grouped.column(activity::NIV1_LABEL)?.str()?;
    let divisions = grouped.column(activity::NIV2_LABEL)?.str()?;
    let counts = grouped
        .column(aggregate::COUNT)?
        .cast(&DataType::UInt64)?;
    let counts = counts.as_materialized_series().u64()?;

    let mut sparse: BTreeMap<(String, String), u64> = BTreeMap::new();
    for i in 0..grouped.height() {
        let (Some(sector), Some(division)) = (sectors.get(i), divisions.get(i)) else {
            continue; // labels are validated non-null at load
        };
        *sparse
            .entry((sector.to_string(), division.to_string()))
            .or_insert(0) += counts.get(i).unwrap_or(0);
    }

    Ok(CountMatrix::from_cells(&sparse))
}

/// Result of one recompute cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Distinct establishments left after filtering.
    pub distinct_count: usize,
    pub row_count: usize,
    pub matrix: CountMatrix,
}

impl Summary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

pub fn summarize(filtered: &FilteredTable) -> Result<Summary> {
    let matrix = count_by_sector(filtered.frame())?;
    Ok(Summary {
        distinct_count: filtered.distinct_count(),
        row_count: filtered.height(),
        matrix,
    })
}
