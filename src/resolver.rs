//! Cascading option discovery.
//!
//! Each level's choosable labels depend only on the working table and the
//! non-empty `include` selections of the levels above it. Excludes never
//! narrow the options shown below them; they only act in the filter applier.

use std::collections::BTreeSet;

use polars::prelude::*;
use serde::Serialize;

use crate::error::{ExplorerError, Result};
use crate::filter::membership_mask;
use crate::hierarchy::Hierarchy;
use crate::join::WorkingTable;
use crate::selection::{HierarchySelection, LevelSelection};

/// Available labels of one level, sorted ascending, next to the selection
/// the caller holds for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelOptions {
    pub hierarchy: Hierarchy,
    /// 1-based.
    pub level: usize,
    pub available: Vec<String>,
    pub selection: LevelSelection,
}

/// A chosen label dropped because an ancestor change made it unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleValue {
    pub hierarchy: Hierarchy,
    pub level: usize,
    pub value: String,
}

/// Distinct non-null labels of `column`, sorted ascending.
pub fn distinct_labels(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let labels = df.column(column)?.str()?;
    let distinct: BTreeSet<&str> = labels.into_iter().flatten().collect();
    Ok(distinct.into_iter().map(str::to_string).collect())
}

/// Walk the levels of `selection`'s hierarchy, coarsest first.
///
/// `on_level` sees the available labels and the caller's selection of each
/// level and returns the selection to narrow with; the walk narrows the frame
/// by it before computing the next level.
fn walk<F>(table: &WorkingTable, selection: &HierarchySelection, mut on_level: F) -> Result<()>
where
    F: FnMut(usize, Vec<String>, &LevelSelection) -> Result<LevelSelection>,
{
    let hierarchy = selection.hierarchy();
    let mut frame = table.frame().clone();

    for (idx, columns) in hierarchy.levels().iter().enumerate() {
        let level = idx + 1;
        let available = distinct_labels(&frame, columns.label)?;
        tracing::debug!(
            hierarchy = hierarchy.name(),
            level,
            rows = frame.height(),
            options = available.len(),
            "resolved level options"
        );

        let current = selection.levels().get(idx).cloned().unwrap_or_default();
        let effective = on_level(level, available, &current)?;

        if effective.narrows_children() && level < hierarchy.depth() {
            let mask = membership_mask(&frame, columns.label, &effective.values, true)?;
            frame = frame.filter(&mask)?;
        }
    }
    Ok(())
}

/// Options for every level of one hierarchy.
///
/// Fails with `SelectionOutOfRange` if any chosen value is not among the
/// labels available at its level.
pub fn resolve_options(
    table: &WorkingTable,
    selection: &HierarchySelection,
) -> Result<Vec<LevelOptions>> {
    let hierarchy = selection.hierarchy();
    let mut resolved = Vec::with_capacity(hierarchy.depth());

    walk(table, selection, |level, available, current| {
        if let Some(value) = current
            .values
            .iter()
            .find(|v| available.binary_search(v).is_err())
        {
            return Err(ExplorerError::SelectionOutOfRange {
                hierarchy: hierarchy.name(),
                level,
                value: value.clone(),
            });
        }
        resolved.push(LevelOptions {
            hierarchy,
            level,
            available,
            selection: current.clone(),
        });
        Ok(current.clone())
    })?;

    Ok(resolved)
}

/// Options of a single 1-based level.
pub fn level_options(
    table: &WorkingTable,
    selection: &HierarchySelection,
    level: usize,
) -> Result<Vec<String>> {
    selection.hierarchy().level(level)?;
    let mut options = resolve_options(table, selection)?;
    Ok(options.swap_remove(level - 1).available)
}

/// Drop every chosen value that is no longer available, top to bottom.
///
/// Each level is reconciled before the next level's options are computed, so
/// clearing a parent value also widens or narrows the children consistently.
/// Returns the reconciled selection and what was removed.
pub fn reconcile(
    table: &WorkingTable,
    selection: &HierarchySelection,
) -> Result<(HierarchySelection, Vec<StaleValue>)> {
    let hierarchy = selection.hierarchy();
    let mut reconciled = HierarchySelection::empty(hierarchy);
    let mut stale = Vec::new();

    walk(table, selection, |level, available, current| {
        let (kept, dropped): (BTreeSet<String>, BTreeSet<String>) = current
            .values
            .iter()
            .cloned()
            .partition(|v| available.binary_search(v).is_ok());
        stale.extend(dropped.into_iter().map(|value| StaleValue {
            hierarchy,
            level,
            value,
        }));
        let kept = LevelSelection {
            mode: current.mode,
            values: kept,
        };
        reconciled.set(level, kept.clone())?;
        Ok(kept)
    })?;

    if !stale.is_empty() {
        tracing::debug!(
            hierarchy = hierarchy.name(),
            cleared = stale.len(),
            "cleared stale selections"
        );
    }
    Ok((reconciled, stale))
}
