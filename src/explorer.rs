use chrono::NaiveDate;
use polars::prelude::*;

use crate::aggregate::{self, Summary};
use crate::config::ExplorerConfig;
use crate::error::Result;
use crate::filter::{self, FilteredTable};
use crate::hierarchy::{Hierarchy, HierarchyTable};
use crate::join::{self, JoinReport, WorkingTable};
use crate::loader::{read_table_as_strings, select_present};
use crate::normalize::{self, parse_date};
use crate::resolver::{self, LevelOptions, StaleValue};
use crate::schema::establishment;
use crate::selection::{CreationDateField, DateRange, LevelSelection, Selections};

/// Loaded, validated and joined registry. Immutable after construction;
/// every query derives new frames from it.
#[derive(Debug, Clone)]
pub struct Explorer {
    config: ExplorerConfig,
    activity: HierarchyTable,
    legal_category: HierarchyTable,
    working: WorkingTable,
    report: JoinReport,
}

impl Explorer {
    // ── Construction ────────────────────────────────────────────────────────

    /// Read the three tables named by `config` and build the working table.
    pub fn load(config: ExplorerConfig) -> Result<Self> {
        let renames = (!config.establishment_renames.is_empty())
            .then_some(&config.establishment_renames);
        let establishments = read_table_as_strings(&config.establishments_path(), renames)?;
        let activity = read_table_as_strings(&config.activity_path(), None)?;
        let legal_category = read_table_as_strings(&config.legal_category_path(), None)?;
        Self::from_frames(config, establishments, activity, legal_category)
    }

    /// Build from raw frames (all columns as strings).
    pub fn from_frames(
        config: ExplorerConfig,
        establishments: DataFrame,
        activity: DataFrame,
        legal_category: DataFrame,
    ) -> Result<Self> {
        let activity = HierarchyTable::new(Hierarchy::Activity, activity)?;
        let legal_category = HierarchyTable::new(Hierarchy::LegalCategory, legal_category)?;

        let establishments = select_present(establishments, &establishment::RETAINED)?;
        let establishments = normalize::normalize_establishments(establishments)?;
        join::validate_establishments(&establishments)?;

        let (working, report) = join::join_hierarchies(
            &establishments,
            &config.activity_key,
            &activity,
            &legal_category,
        )?;

        tracing::info!(
            establishments = report.establishments,
            joined = report.joined,
            activity_leaves = activity.len(),
            legal_category_leaves = legal_category.len(),
            "registry loaded"
        );

        Ok(Self {
            config,
            activity,
            legal_category,
            working,
            report,
        })
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn working_table(&self) -> &WorkingTable {
        &self.working
    }

    pub fn join_report(&self) -> &JoinReport {
        &self.report
    }

    pub fn hierarchy_table(&self, hierarchy: Hierarchy) -> &HierarchyTable {
        match hierarchy {
            Hierarchy::Activity => &self.activity,
            Hierarchy::LegalCategory => &self.legal_category,
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    /// Cascading options for every level of `hierarchy`.
    pub fn options(&self, hierarchy: Hierarchy, selections: &Selections) -> Result<Vec<LevelOptions>> {
        resolver::resolve_options(&self.working, selections.hierarchy(hierarchy))
    }

    /// Cascading options of one 1-based level.
    pub fn level_options(
        &self,
        hierarchy: Hierarchy,
        selections: &Selections,
        level: usize,
    ) -> Result<Vec<String>> {
        resolver::level_options(&self.working, selections.hierarchy(hierarchy), level)
    }

    /// `selections` with every value its level no longer offers dropped, plus
    /// the dropped values. Both hierarchies are reconciled independently.
    pub fn effective_selections(
        &self,
        selections: &Selections,
    ) -> Result<(Selections, Vec<StaleValue>)> {
        let mut effective = selections.clone();
        let mut stale = Vec::new();
        for hierarchy in Hierarchy::ALL {
            let (reconciled, dropped) =
                resolver::reconcile(&self.working, selections.hierarchy(hierarchy))?;
            *effective.hierarchy_mut(hierarchy) = reconciled;
            stale.extend(dropped);
        }
        Ok((effective, stale))
    }

    /// Filter the working table. Stale values are treated as unset, so a
    /// selection held from before an ancestor change never empties the result
    /// on its own.
    pub fn apply(&self, selections: &Selections) -> Result<FilteredTable> {
        let (effective, stale) = self.effective_selections(selections)?;
        if !stale.is_empty() {
            tracing::debug!(ignored = stale.len(), "stale selections treated as empty");
        }
        filter::apply_filters(&self.working, &effective)
    }

    /// One full cycle: resolve, apply every selection, count, aggregate.
    pub fn summarize(&self, selections: &Selections) -> Result<Summary> {
        let span = tracing::debug_span!(
            "recompute",
            rows = self.working.height(),
            filtered = tracing::field::Empty
        );
        let _guard = span.enter();

        let filtered = self.apply(selections)?;
        span.record("filtered", filtered.height());
        aggregate::summarize(&filtered)
    }

    /// Earliest and latest creation date on `field` among working rows.
    pub fn creation_date_bounds(
        &self,
        field: CreationDateField,
    ) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let frame = self.working.frame();
        if frame.column(field.column()).is_err() {
            return Ok(None);
        }
        let dates = frame.column(field.column())?.str()?;
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        for date in dates.into_iter().flatten().filter_map(parse_date) {
            bounds = Some(match bounds {
                None => (date, date),
                Some((lo, hi)) => (lo.min(date), hi.max(date)),
            });
        }
        Ok(bounds)
    }

    /// Date range spanning every dated row on the configured field, the
    /// initial state of a date picker.
    pub fn default_date_range(&self) -> Result<Option<DateRange>> {
        let field = self.config.date_field;
        Ok(self
            .creation_date_bounds(field)?
            .map(|(start, end)| DateRange::new(field, Some(start), Some(end))))
    }
}

/// Selection state of one interactive user.
///
/// Every accepted change is validated against the options its level offers
/// given the levels above, and stale values below it are cleared right away,
/// so the held selections are always in range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSession {
    selections: Selections,
}

impl FilterSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    /// Replace one level's selection.
    ///
    /// Fails with `SelectionOutOfRange` (leaving the session untouched) when
    /// a value is not offered at that level. On success returns the
    /// descendant values cleared because they went stale.
    pub fn select(
        &mut self,
        table: &WorkingTable,
        hierarchy: Hierarchy,
        level: usize,
        selection: LevelSelection,
    ) -> Result<Vec<StaleValue>> {
        let mut candidate = self.selections.hierarchy(hierarchy).clone();
        candidate.set(level, selection)?;

        // Validate this level against its ancestors only.
        let mut upto = candidate.clone();
        for below in level + 1..=hierarchy.depth() {
            upto.set(below, LevelSelection::default())?;
        }
        resolver::resolve_options(table, &upto)?;

        let (reconciled, stale) = resolver::reconcile(table, &candidate)?;
        *self.selections.hierarchy_mut(hierarchy) = reconciled;
        Ok(stale)
    }

    /// Reset one level to an empty include.
    pub fn clear_level(
        &mut self,
        table: &WorkingTable,
        hierarchy: Hierarchy,
        level: usize,
    ) -> Result<Vec<StaleValue>> {
        self.select(table, hierarchy, level, LevelSelection::default())
    }

    /// Fails with `InvalidDateRange` when `start` is after `end`.
    pub fn set_dates(&mut self, dates: Option<DateRange>) -> Result<()> {
        if let Some(range) = &dates {
            range.validate()?;
        }
        self.selections.dates = dates;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.selections = Selections::default();
    }
}
