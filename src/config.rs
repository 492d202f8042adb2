//! Configuration for loading an [`Explorer`](crate::Explorer).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::schema::establishment;
use crate::selection::CreationDateField;

pub const DEFAULT_ESTABLISHMENTS_FILE: &str = "etablissements-idf.csv";
pub const DEFAULT_ACTIVITY_FILE: &str = "naf_5_niveaux.csv";
/// Published by INSEE as a workbook; read through the xlsx loader.
pub const DEFAULT_LEGAL_CATEGORY_FILE: &str = "cj_septembre_2022.xlsx";

/// Where the three input tables live and how to read them.
///
/// # Example
///
/// ```rust
/// use sirene_explorer::{CreationDateField, ExplorerConfig};
///
/// let config = ExplorerConfig::builder("data")
///     .with_establishments_file("etablissements-2024.csv")
///     .with_date_field(CreationDateField::Establishment)
///     .build();
/// assert_eq!(config.establishments_path().to_str(), Some("data/etablissements-2024.csv"));
/// ```
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    pub base_path: PathBuf,
    pub establishments_file: String,
    pub activity_file: String,
    pub legal_category_file: String,
    /// Establishment column matched against the activity level-5 code.
    pub activity_key: String,
    /// Creation date used for default bounds and range filtering.
    pub date_field: CreationDateField,
    /// Optional header renames applied to the establishment file.
    pub establishment_renames: HashMap<String, String>,
}

impl ExplorerConfig {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            establishments_file: DEFAULT_ESTABLISHMENTS_FILE.to_string(),
            activity_file: DEFAULT_ACTIVITY_FILE.to_string(),
            legal_category_file: DEFAULT_LEGAL_CATEGORY_FILE.to_string(),
            activity_key: establishment::ACTIVITY_LEGAL_UNIT.to_string(),
            date_field: CreationDateField::default(),
            establishment_renames: HashMap::new(),
        }
    }

    pub fn builder(base_path: impl AsRef<Path>) -> ExplorerConfigBuilder {
        ExplorerConfigBuilder {
            config: Self::new(base_path),
        }
    }

    pub fn establishments_path(&self) -> PathBuf {
        self.base_path.join(&self.establishments_file)
    }

    pub fn activity_path(&self) -> PathBuf {
        self.base_path.join(&self.activity_file)
    }

    pub fn legal_category_path(&self) -> PathBuf {
        self.base_path.join(&self.legal_category_file)
    }
}

/// Builder for ExplorerConfig.
#[derive(Debug, Clone)]
pub struct ExplorerConfigBuilder {
    config: ExplorerConfig,
}

impl ExplorerConfigBuilder {
    pub fn with_establishments_file(mut self, name: impl Into<String>) -> Self {
        self.config.establishments_file = name.into();
        self
    }

    pub fn with_activity_file(mut self, name: impl Into<String>) -> Self {
        self.config.activity_file = name.into();
        self
    }

    pub fn with_legal_category_file(mut self, name: impl Into<String>) -> Self {
        self.config.legal_category_file = name.into();
        self
    }

    /// Join activity on the establishment's own code instead of the legal
    /// unit's.
    pub fn with_establishment_activity(mut self) -> Self {
        self.config.activity_key = establishment::ACTIVITY_ESTABLISHMENT.to_string();
        self
    }

    pub fn with_date_field(mut self, field: CreationDateField) -> Self {
        self.config.date_field = field;
        self
    }

    pub fn with_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.config
            .establishment_renames
            .insert(from.into(), to.into());
        self
    }

    pub fn build(self) -> ExplorerConfig {
        self.config
    }
}
