use std::collections::HashSet;

use polars::prelude::*;
use serde::Serialize;

use crate::error::{ExplorerError, Result};
use crate::hierarchy::{Hierarchy, HierarchyTable};
use crate::loader::require_columns;
use crate::schema::establishment;

/// Rows lost on the way from the establishment table to the working table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub establishments: usize,
    /// Dropped because the activity code has no level-5 match.
    pub unmatched_activity: usize,
    /// Dropped because the legal category has no level-3 match.
    pub unmatched_legal_category: usize,
    pub joined: usize,
}

impl JoinReport {
    pub fn dropped(&self) -> usize {
        self.unmatched_activity + self.unmatched_legal_category
    }
}

/// Establishments carrying the full label ancestry of both hierarchies.
///
/// Read-only once built; filtering always derives new frames.
#[derive(Debug, Clone)]
pub struct WorkingTable {
    frame: DataFrame,
}

impl WorkingTable {
    /// Wrap a frame that already holds the joined columns.
    pub fn from_frame(frame: DataFrame) -> Result<Self> {
        let mut required = vec![establishment::SIRET];
        for hierarchy in Hierarchy::ALL {
            required.extend(hierarchy.label_columns());
        }
        require_columns(&frame, &required)?;
        Ok(Self { frame })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }
}

/// Check the `siret` key: present, non-empty, unique.
pub fn validate_establishments(df: &DataFrame) -> Result<()> {
    require_columns(df, &establishment::REQUIRED)?;
    let sirets = df.column(establishment::SIRET)?.str()?;
    let mut seen: HashSet<&str> = HashSet::with_capacity(sirets.len());
    for (row, siret) in sirets.into_iter().enumerate() {
        let siret = match siret {
            Some(s) if !s.is_empty() => s,
            _ => {
                return Err(ExplorerError::Validation(format!(
                    "Empty siret at row {row}"
                )))
            }
        };
        if !seen.insert(siret) {
            return Err(ExplorerError::Validation(format!(
                "Duplicate siret '{siret}' at row {row}"
            )));
        }
    }
    Ok(())
}

/// Inner-join establishments to both hierarchies on their leaf codes.
///
/// `activity_key` names the establishment column matched against the
/// activity level-5 code; the legal category always joins on
/// `categorieJuridiqueUniteLegale`. Establishments whose code is absent from
/// either table do not appear in the result.
pub fn join_hierarchies(
    establishments: &DataFrame,
    activity_key: &str,
    activity: &HierarchyTable,
    legal: &HierarchyTable,
) -> Result<(WorkingTable, JoinReport)> {
    require_columns(establishments, &[activity_key, establishment::LEGAL_CATEGORY])?;
    debug_assert_eq!(activity.hierarchy(), Hierarchy::Activity);
    debug_assert_eq!(legal.hierarchy(), Hierarchy::LegalCategory);

    let with_activity = establishments
        .clone()
        .lazy()
        .join(
            activity.frame().clone().lazy().select(activity.join_columns()),
            [col(activity_key)],
            [col(Hierarchy::Activity.leaf().code)],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;

    let joined = with_activity
        .clone()
        .lazy()
        .join(
            legal.frame().clone().lazy().select(legal.join_columns()),
            [col(establishment::LEGAL_CATEGORY)],
            [col(Hierarchy::LegalCategory.leaf().code)],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;

    let report = JoinReport {
        establishments: establishments.height(),
        unmatched_activity: establishments.height() - with_activity.height(),
        unmatched_legal_category: with_activity.height() - joined.height(),
        joined: joined.height(),
    };

    if report.dropped() > 0 {
        tracing::warn!(
            unmatched_activity = report.unmatched_activity,
            unmatched_legal_category = report.unmatched_legal_category,
            "establishments dropped by hierarchy join"
        );
    }

    Ok((WorkingTable::from_frame(joined)?, report))
}
