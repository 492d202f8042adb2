use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};
use crate::hierarchy::Hierarchy;
use crate::schema::{establishment, mode};

/// Polarity of a level selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Keep only the chosen labels.
    #[default]
    Include,
    /// Drop the chosen labels.
    Exclude,
    /// Unset: the level does not filter.
    None,
}

impl SelectionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Include => mode::INCLUDE,
            Self::Exclude => mode::EXCLUDE,
            Self::None => mode::NONE,
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionMode {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            mode::INCLUDE | "select" | "sélectionner" => Ok(Self::Include),
            mode::EXCLUDE | "exclure" => Ok(Self::Exclude),
            mode::NONE | "" => Ok(Self::None),
            _ => Err(ExplorerError::InvalidSelectionMode(s.to_string())),
        }
    }
}

/// Mode plus chosen labels for one hierarchy level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSelection {
    pub mode: SelectionMode,
    pub values: BTreeSet<String>,
}

impl LevelSelection {
    pub fn new<I, S>(mode: SelectionMode, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn include<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SelectionMode::Include, values)
    }

    pub fn exclude<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SelectionMode::Exclude, values)
    }

    /// True when this selection restricts rows at all.
    pub fn is_active(&self) -> bool {
        self.mode != SelectionMode::None && !self.values.is_empty()
    }

    /// True when this selection narrows the options of the next level.
    /// Only a non-empty include does; excludes apply at the end.
    pub fn narrows_children(&self) -> bool {
        self.mode == SelectionMode::Include && !self.values.is_empty()
    }
}

/// Selections for every level of one hierarchy, coarsest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchySelection {
    hierarchy: Hierarchy,
    levels: Vec<LevelSelection>,
}

impl HierarchySelection {
    /// All levels unset, default include mode, no values.
    pub fn empty(hierarchy: Hierarchy) -> Self {
        Self {
            hierarchy,
            levels: vec![LevelSelection::default(); hierarchy.depth()],
        }
    }

    pub fn hierarchy(&self) -> Hierarchy {
        self.hierarchy
    }

    pub fn levels(&self) -> &[LevelSelection] {
        &self.levels
    }

    /// Selection of a 1-based level.
    pub fn level(&self, level: usize) -> Result<&LevelSelection> {
        self.hierarchy.level(level)?;
        self.levels.get(level - 1).ok_or_else(|| self.short(level))
    }

    pub fn set(&mut self, level: usize, selection: LevelSelection) -> Result<()> {
        *self.level_mut(level)? = selection;
        Ok(())
    }

    pub fn with(mut self, level: usize, selection: LevelSelection) -> Result<Self> {
        self.set(level, selection)?;
        Ok(self)
    }

    pub(crate) fn level_mut(&mut self, level: usize) -> Result<&mut LevelSelection> {
        self.hierarchy.level(level)?;
        // Deserialized selections may carry fewer levels than the hierarchy.
        let depth = self.hierarchy.depth();
        if self.levels.len() < depth {
            self.levels.resize(depth, LevelSelection::default());
        }
        Ok(&mut self.levels[level - 1])
    }

    fn short(&self, level: usize) -> ExplorerError {
        ExplorerError::InvalidLevel {
            hierarchy: self.hierarchy.name(),
            level,
            depth: self.levels.len(),
        }
    }

    pub fn clear(&mut self) {
        self.levels = vec![LevelSelection::default(); self.hierarchy.depth()];
    }
}

/// Which creation date a date range applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationDateField {
    Establishment,
    #[default]
    LegalUnit,
}

impl CreationDateField {
    pub fn column(self) -> &'static str {
        match self {
            Self::Establishment => establishment::CREATED_ESTABLISHMENT,
            Self::LegalUnit => establishment::CREATED_LEGAL_UNIT,
        }
    }
}

/// Inclusive creation-date bounds; an open side is unbounded. A range whose
/// start is after its end is rejected by `validate` before any filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub field: CreationDateField,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(field: CreationDateField, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { field, start, end }
    }

    pub fn is_bounded(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => {
                Err(ExplorerError::InvalidDateRange { start, end })
            }
            _ => Ok(()),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

/// Everything the presentation layer passes in for one recompute cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selections {
    pub activity: HierarchySelection,
    pub legal_category: HierarchySelection,
    pub dates: Option<DateRange>,
}

impl Default for Selections {
    fn default() -> Self {
        Self {
            activity: HierarchySelection::empty(Hierarchy::Activity),
            legal_category: HierarchySelection::empty(Hierarchy::LegalCategory),
            dates: None,
        }
    }
}

impl Selections {
    pub fn hierarchy(&self, hierarchy: Hierarchy) -> &HierarchySelection {
        match hierarchy {
            Hierarchy::Activity => &self.activity,
            Hierarchy::LegalCategory => &self.legal_category,
        }
    }

    pub fn hierarchy_mut(&mut self, hierarchy: Hierarchy) -> &mut HierarchySelection {
        match hierarchy {
            Hierarchy::Activity => &mut self.activity,
            Hierarchy::LegalCategory => &mut self.legal_category,
        }
    }

    /// Set one level, builder style.
    pub fn with(mut self, hierarchy: Hierarchy, level: usize, selection: LevelSelection) -> Result<Self> {
        self.hierarchy_mut(hierarchy).set(level, selection)?;
        Ok(self)
    }

    pub fn with_dates(mut self, dates: DateRange) -> Self {
        self.dates = Some(dates);
        self
    }
}
