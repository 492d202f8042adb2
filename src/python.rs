use chrono::NaiveDate;
use pyo3::prelude::*;
use pyo3::types::PyModule;
use pyo3_polars::PyDataFrame;

use crate::config::ExplorerConfig;
use crate::error::ExplorerError;
use crate::explorer::{Explorer, FilterSession};
use crate::hierarchy::Hierarchy;
use crate::schema;
use crate::selection::{CreationDateField, DateRange, LevelSelection, SelectionMode};

#[pyclass(name = "Explorer")]
pub struct PyExplorer {
    config: ExplorerConfig,
    explorer: Option<Explorer>,
    session: FilterSession,
}

impl PyExplorer {
    fn loaded(&self) -> Result<&Explorer, ExplorerError> {
        self.explorer
            .as_ref()
            .ok_or_else(|| ExplorerError::NotLoaded("call load() first".into()))
    }
}

#[pymethods]
impl PyExplorer {
    #[new]
    #[pyo3(signature = (
        base_path,
        establishments_file=None,
        activity_file=None,
        legal_category_file=None,
        establishment_activity=false,
        date_field="legal_unit",
    ))]
    fn new(
        base_path: String,
        establishments_file: Option<String>,
        activity_file: Option<String>,
        legal_category_file: Option<String>,
        establishment_activity: bool,
        date_field: &str,
    ) -> PyResult<Self> {
        let mut builder = ExplorerConfig::builder(base_path);
        if let Some(name) = establishments_file {
            builder = builder.with_establishments_file(name);
        }
        if let Some(name) = activity_file {
            builder = builder.with_activity_file(name);
        }
        if let Some(name) = legal_category_file {
            builder = builder.with_legal_category_file(name);
        }
        if establishment_activity {
            builder = builder.with_establishment_activity();
        }
        let field = match date_field {
            "legal_unit" => CreationDateField::LegalUnit,
            "establishment" => CreationDateField::Establishment,
            other => {
                return Err(ExplorerError::Validation(format!(
                    "date_field must be 'legal_unit' or 'establishment', got '{other}'"
                ))
                .into())
            }
        };
        Ok(Self {
            config: builder.with_date_field(field).build(),
            explorer: None,
            session: FilterSession::new(),
        })
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load and join the three data files. Returns the working table and
    /// resets every selection.
    fn load(&mut self) -> PyResult<PyDataFrame> {
        let explorer = Explorer::load(self.config.clone())?;
        let df = explorer.working_table().frame().clone();
        self.explorer = Some(explorer);
        self.session.reset();
        Ok(PyDataFrame(df))
    }

    fn working_df(&self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.loaded()?.working_table().frame().clone()))
    }

    /// (establishments, unmatched activity, unmatched legal category, joined)
    fn join_report(&self) -> PyResult<(usize, usize, usize, usize)> {
        let r = self.loaded()?.join_report();
        Ok((
            r.establishments,
            r.unmatched_activity,
            r.unmatched_legal_category,
            r.joined,
        ))
    }

    // ── Selections ──────────────────────────────────────────────────────────

    /// Labels choosable at a 1-based level, given the current selections.
    fn options(&self, hierarchy: &str, level: usize) -> PyResult<Vec<String>> {
        let hierarchy: Hierarchy = hierarchy.parse()?;
        Ok(self
            .loaded()?
            .level_options(hierarchy, self.session.selections(), level)?)
    }

    /// Set one level. Returns the labels cleared below it.
    #[pyo3(signature = (hierarchy, level, values, mode="include"))]
    fn select(
        &mut self,
        hierarchy: &str,
        level: usize,
        values: Vec<String>,
        mode: &str,
    ) -> PyResult<Vec<String>> {
        let hierarchy: Hierarchy = hierarchy.parse()?;
        let mode: SelectionMode = mode.parse()?;
        let explorer = self
            .explorer
            .as_ref()
            .ok_or_else(|| ExplorerError::NotLoaded("call load() first".into()))?;
        let stale = self.session.select(
            explorer.working_table(),
            hierarchy,
            level,
            LevelSelection::new(mode, values),
        )?;
        Ok(stale.into_iter().map(|s| s.value).collect())
    }

    fn clear_level(&mut self, hierarchy: &str, level: usize) -> PyResult<Vec<String>> {
        self.select(hierarchy, level, Vec::new(), schema::mode::INCLUDE)
    }

    fn reset(&mut self) {
        self.session.reset();
    }

    #[pyo3(signature = (start=None, end=None))]
    fn set_date_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> PyResult<()> {
        let range = DateRange::new(self.config.date_field, start, end);
        self.session.set_dates(range.is_bounded().then_some(range))?;
        Ok(())
    }

    /// Earliest and latest creation date on the configured field.
    fn default_date_range(&self) -> PyResult<Option<(NaiveDate, NaiveDate)>> {
        Ok(self
            .loaded()?
            .creation_date_bounds(self.config.date_field)?)
    }

    fn selections_json(&self) -> PyResult<String> {
        Ok(serde_json::to_string(self.session.selections()).map_err(ExplorerError::from)?)
    }

    // ── Results ─────────────────────────────────────────────────────────────

    fn filtered_df(&self) -> PyResult<PyDataFrame> {
        let filtered = self.loaded()?.apply(self.session.selections())?;
        Ok(PyDataFrame(filtered.frame().clone()))
    }

    fn distinct_count(&self) -> PyResult<usize> {
        Ok(self.loaded()?.apply(self.session.selections())?.distinct_count())
    }

    /// Level-1 × level-2 activity counts, one row per level-1 label.
    fn count_matrix(&self) -> PyResult<PyDataFrame> {
        let summary = self.loaded()?.summarize(self.session.selections())?;
        Ok(PyDataFrame(summary.matrix.to_dataframe()?))
    }

    fn summary_json(&self) -> PyResult<String> {
        let summary = self.loaded()?.summarize(self.session.selections())?;
        Ok(summary.to_json()?)
    }
}

/// Export column names as Python submodules
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Establishment
    let establishment = PyModule::new(m.py(), "establishment")?;
    establishment.add("SIRET", schema::establishment::SIRET)?;
    establishment.add("SIREN", schema::establishment::SIREN)?;
    establishment.add(
        "ACTIVITY_LEGAL_UNIT",
        schema::establishment::ACTIVITY_LEGAL_UNIT,
    )?;
    establishment.add(
        "ACTIVITY_ESTABLISHMENT",
        schema::establishment::ACTIVITY_ESTABLISHMENT,
    )?;
    establishment.add("LEGAL_CATEGORY", schema::establishment::LEGAL_CATEGORY)?;
    establishment.add(
        "CREATED_ESTABLISHMENT",
        schema::establishment::CREATED_ESTABLISHMENT,
    )?;
    establishment.add(
        "CREATED_LEGAL_UNIT",
        schema::establishment::CREATED_LEGAL_UNIT,
    )?;
    establishment.add("LAMBERT_X", schema::establishment::LAMBERT_X)?;
    establishment.add("LAMBERT_Y", schema::establishment::LAMBERT_Y)?;
    m.add_submodule(&establishment)?;

    // Activity (NAF)
    let activity = PyModule::new(m.py(), "activity")?;
    for (i, level) in schema::activity::LEVELS.iter().enumerate() {
        activity.add(format!("NIV{}", i + 1), level.code)?;
        activity.add(format!("NIV{}_LABEL", i + 1), level.label)?;
    }
    m.add_submodule(&activity)?;

    // Legal category (CJ)
    let legal = PyModule::new(m.py(), "legal")?;
    for (i, level) in schema::legal::LEVELS.iter().enumerate() {
        legal.add(format!("CJ{}", i + 1), level.code)?;
        legal.add(format!("CJ{}_LABEL", i + 1), level.label)?;
    }
    m.add_submodule(&legal)?;

    // Selection modes
    let mode = PyModule::new(m.py(), "mode")?;
    mode.add("INCLUDE", schema::mode::INCLUDE)?;
    mode.add("EXCLUDE", schema::mode::EXCLUDE)?;
    mode.add("NONE", schema::mode::NONE)?;
    m.add_submodule(&mode)?;

    // Hierarchies
    let hierarchy = PyModule::new(m.py(), "hierarchy")?;
    hierarchy.add("ACTIVITY", schema::hierarchy::ACTIVITY)?;
    hierarchy.add("LEGAL_CATEGORY", schema::hierarchy::LEGAL_CATEGORY)?;
    m.add_submodule(&hierarchy)?;

    Ok(())
}

#[pymodule]
fn sirene_explorer(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyExplorer>()?;
    add_schema_exports(m)?;
    Ok(())
}
