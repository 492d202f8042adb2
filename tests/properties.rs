mod common;

use std::sync::OnceLock;

use proptest::prelude::*;
use sirene_explorer::filter::{apply_row_filters, row_filters};
use sirene_explorer::{
    Explorer, Hierarchy, HierarchySelection, LevelSelection, SelectionMode, Selections,
};

fn explorer() -> &'static Explorer {
    static EXPLORER: OnceLock<Explorer> = OnceLock::new();
    EXPLORER.get_or_init(common::load_default)
}

/// Unfiltered options of every level, used as the label pool.
fn pool(hierarchy: Hierarchy) -> Vec<Vec<String>> {
    explorer()
        .options(hierarchy, &Selections::default())
        .unwrap()
        .into_iter()
        .map(|o| o.available)
        .collect()
}

type RawLevel = (u8, Vec<usize>);

fn raw_levels(depth: usize) -> impl Strategy<Value = Vec<RawLevel>> {
    prop::collection::vec((0u8..3, prop::collection::vec(0usize..16, 0..3)), depth)
}

fn mode(raw: u8) -> SelectionMode {
    match raw {
        0 => SelectionMode::Include,
        1 => SelectionMode::Exclude,
        _ => SelectionMode::None,
    }
}

/// Turn raw indices into a selection over labels that exist somewhere in the
/// hierarchy. Values may be unavailable under the chosen parents.
fn build(hierarchy: Hierarchy, raw: &[RawLevel]) -> HierarchySelection {
    let pool = pool(hierarchy);
    let mut selection = HierarchySelection::empty(hierarchy);
    for (idx, (m, picks)) in raw.iter().enumerate() {
        let labels = &pool[idx];
        let values = picks.iter().map(|i| labels[i % labels.len()].clone());
        selection
            .set(idx + 1, LevelSelection::new(mode(*m), values))
            .unwrap();
    }
    selection
}

fn selections(activity: &[RawLevel], legal: &[RawLevel]) -> Selections {
    Selections {
        activity: build(Hierarchy::Activity, activity),
        legal_category: build(Hierarchy::LegalCategory, legal),
        dates: None,
    }
}

fn sirets(df: &polars::prelude::DataFrame) -> Vec<String> {
    let mut out: Vec<String> = df
        .column("siret")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .flatten()
        .map(String::from)
        .collect();
    out.sort();
    out
}

/// Options of every level for `selection` after dropping stale values.
fn options_of(selection: &HierarchySelection) -> Vec<Vec<String>> {
    let table = explorer().working_table();
    let (reconciled, _) = sirene_explorer::reconcile(table, selection).unwrap();
    sirene_explorer::resolve_options(table, &reconciled)
        .unwrap()
        .into_iter()
        .map(|o| o.available)
        .collect()
}

/// For each level i > 1, options with level i-1 as chosen are a subset of
/// the options with level i-1 unset and every other level unchanged.
fn check_parent_include_narrows(
    hierarchy: Hierarchy,
    raw: &[RawLevel],
) -> Result<(), TestCaseError> {
    let selection = build(hierarchy, raw);
    let narrowed = options_of(&selection);
    for parent in 1..hierarchy.depth() {
        let mut widened_selection = selection.clone();
        widened_selection
            .set(parent, LevelSelection::default())
            .unwrap();
        let widened = options_of(&widened_selection);
        for label in &narrowed[parent] {
            prop_assert!(
                widened[parent].contains(label),
                "{} level {}: '{}' offered only with level {} set",
                hierarchy,
                parent + 1,
                label,
                parent
            );
        }
    }
    Ok(())
}

/// Dropping every exclude from a selection leaves all options unchanged.
fn check_excludes_keep_options(
    hierarchy: Hierarchy,
    raw: &[RawLevel],
) -> Result<(), TestCaseError> {
    let selection = build(hierarchy, raw);
    let mut without_excludes = selection.clone();
    for (idx, level) in selection.levels().iter().enumerate() {
        if level.mode == SelectionMode::Exclude {
            without_excludes
                .set(idx + 1, LevelSelection::default())
                .unwrap();
        }
    }
    prop_assert_eq!(options_of(&selection), options_of(&without_excludes));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn filter_order_is_irrelevant(
        activity in raw_levels(5),
        legal in raw_levels(3),
        seed in any::<u64>(),
    ) {
        let selections = selections(&activity, &legal);
        let filters = row_filters(&selections);
        let frame = explorer().working_table().frame();

        let forward = apply_row_filters(frame, &filters).unwrap();
        let mut rotated = filters.clone();
        if !rotated.is_empty() {
            let k = (seed as usize) % rotated.len();
            rotated.rotate_left(k);
        }
        rotated.reverse();
        let shuffled = apply_row_filters(frame, &rotated).unwrap();
        prop_assert_eq!(sirets(&forward), sirets(&shuffled));
    }

    #[test]
    fn parent_include_narrows_child_options(
        activity in raw_levels(5),
        legal in raw_levels(3),
    ) {
        check_parent_include_narrows(Hierarchy::Activity, &activity)?;
        check_parent_include_narrows(Hierarchy::LegalCategory, &legal)?;
    }

    #[test]
    fn excludes_never_change_options(
        activity in raw_levels(5),
        legal in raw_levels(3),
    ) {
        check_excludes_keep_options(Hierarchy::Activity, &activity)?;
        check_excludes_keep_options(Hierarchy::LegalCategory, &legal)?;
    }

    #[test]
    fn matrix_accounts_for_every_row(
        activity in raw_levels(5),
        legal in raw_levels(3),
    ) {
        let summary = explorer().summarize(&selections(&activity, &legal)).unwrap();
        prop_assert_eq!(summary.matrix.total() as usize, summary.row_count);
        prop_assert_eq!(summary.distinct_count, summary.row_count);
        for row in &summary.matrix.cells {
            prop_assert_eq!(row.len(), summary.matrix.columns.len());
        }
    }

    #[test]
    fn recompute_is_idempotent(
        activity in raw_levels(5),
        legal in raw_levels(3),
    ) {
        let selections = selections(&activity, &legal);
        let first = explorer().summarize(&selections).unwrap();
        let second = explorer().summarize(&selections).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn include_and_exclude_of_same_labels_keep_nothing(
        level in 1usize..=5,
        picks in prop::collection::vec(0usize..16, 1..3),
    ) {
        let labels = &pool(Hierarchy::Activity)[level - 1];
        let values: Vec<String> = picks.iter().map(|i| labels[i % labels.len()].clone()).collect();
        let included = Selections::default()
            .with(Hierarchy::Activity, level, LevelSelection::include(values.clone()))
            .unwrap();
        let excluded = Selections::default()
            .with(Hierarchy::Activity, level, LevelSelection::exclude(values))
            .unwrap();

        let mut filters = row_filters(&included);
        filters.extend(row_filters(&excluded));
        let out = apply_row_filters(explorer().working_table().frame(), &filters).unwrap();
        prop_assert_eq!(out.height(), 0);
    }
}
