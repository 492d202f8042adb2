//! Filter and count business establishments along two classification
//! hierarchies: the five-level NAF activity nomenclature and the three-level
//! CJ legal-category nomenclature.
//!
//! Establishments are joined to both hierarchies once, at load. Each level of
//! each hierarchy then offers cascading options (narrowed by the `include`
//! selections above it), the selections are AND-composed into row filters,
//! and the surviving rows are summarized as a distinct siret count plus a
//! dense level-1 × level-2 activity count matrix.
//!
//! ```no_run
//! use sirene_explorer::{Explorer, ExplorerConfig, Hierarchy, LevelSelection, Selections};
//!
//! let explorer = Explorer::load(ExplorerConfig::new("data"))?;
//! let selections = Selections::default()
//!     .with(Hierarchy::Activity, 1, LevelSelection::include(["Commerce"]))?;
//! let summary = explorer.summarize(&selections)?;
//! println!("{} establishments", summary.distinct_count);
//! # Ok::<(), sirene_explorer::ExplorerError>(())
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod explorer;
pub mod filter;
pub mod hierarchy;
pub mod join;
pub mod loader;
pub mod normalize;
pub mod resolver;
pub mod schema;
pub mod selection;

#[cfg(test)]
mod fixtures;

#[cfg(feature = "python")]
mod python;

pub use aggregate::{CountMatrix, Summary};
pub use config::{ExplorerConfig, ExplorerConfigBuilder};
pub use error::{ExplorerError, Result};
pub use explorer::{Explorer, FilterSession};
pub use filter::{apply_filters, FilteredTable, RowFilter};
pub use hierarchy::{Hierarchy, HierarchyTable, HierarchyTree};
pub use join::{JoinReport, WorkingTable};
pub use resolver::{level_options, reconcile, resolve_options, LevelOptions, StaleValue};
pub use selection::{
    CreationDateField, DateRange, HierarchySelection, LevelSelection, SelectionMode, Selections,
};
