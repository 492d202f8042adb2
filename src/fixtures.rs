//! Shared in-memory test data: six activity leaves under two sectors, three
//! legal categories, twelve establishments of which ten join.

use polars::prelude::*;

use crate::hierarchy::{Hierarchy, HierarchyTable};
use crate::join::{join_hierarchies, validate_establishments, JoinReport, WorkingTable};
use crate::normalize::normalize_establishments;
use crate::schema::establishment;

pub const UNKNOWN_ACTIVITY_SIRET: &str = "00000000000011";
pub const UNKNOWN_LEGAL_SIRET: &str = "00000000000012";

pub fn activity_frame() -> DataFrame {
    df!(
        "NIV1" => &["G", "G", "G", "C", "C", "A"],
        "NIV2" => &["47", "47", "46", "10", "33", "01"],
        "NIV3" => &["47.1", "47.2", "46.3", "10.7", "33.1", "01.1"],
        "NIV4" => &["47.11", "47.24", "46.31", "10.71", "33.12", "01.11"],
        "NIV5" => &["47.11C", "47.24Z", "46.31Z", "10.71A", "33.12Z", "01.11Z"],
        "NIV1 - Libellé" => &["Commerce", "Commerce", "Commerce", "Industrie", "Industrie", "Agriculture"],
        "NIV2 - Libellé" => &["Détail", "Détail", "Gros", "Industries alimentaires", "Réparation", "Cultures"],
        "NIV3 - Libellé" => &["Magasins non spécialisés", "Alimentaire spécialisé", "Gros alimentaire", "Pain et pâtisserie", "Réparation d'ouvrages", "Cultures non permanentes"],
        "NIV4 - Libellé" => &["Supérettes et épiceries", "Pain et pâtisserie en magasin", "Fruits et légumes", "Fabrication de pain", "Réparation de machines", "Céréales"],
        "NIV5 - Libellé" => &["Supérettes", "Boulangerie", "Commerce de gros de fruits", "Fabrication industrielle de pain", "Réparation de machines", "Culture de céréales"],
    )
    .unwrap()
}

pub fn legal_frame() -> DataFrame {
    df!(
        "CJ1" => &["5", "5", "1"],
        "CJ2" => &["57", "54", "10"],
        "CJ3" => &["5710", "5499", "1000"],
        "CJ1 - Libellé" => &["Société commerciale", "Société commerciale", "Entrepreneur individuel"],
        "CJ2 - Libellé" => &["SAS", "SARL", "Entrepreneur individuel"],
        "CJ3 - Libellé" => &["SAS", "SARL", "Entrepreneur individuel"],
    )
    .unwrap()
}

pub fn establishments_frame() -> DataFrame {
    df!(
        "siret" => &[
            "00000000000001", "00000000000002", "00000000000003", "00000000000004",
            "00000000000005", "00000000000006", "00000000000007", "00000000000008",
            "00000000000009", "00000000000010", UNKNOWN_ACTIVITY_SIRET, UNKNOWN_LEGAL_SIRET,
        ],
        "siren" => &[
            "000000001", "000000002", "000000003", "000000004", "000000005", "000000006",
            "000000007", "000000008", "000000009", "000000010", "000000011", "000000012",
        ],
        "activitePrincipaleUniteLegale" => &[
            "47.24Z", "47.11C", "47.11C", "47.24Z", "46.31Z", "46.31Z",
            "10.71A", "10.71A", "10.71A", "33.12Z", "99.99Z", "47.24Z",
        ],
        "categorieJuridiqueUniteLegale" => &[
            "5710", "5499", "1000", "1000", "5710", "5499",
            "5710", "5499", "1000", "5710", "5710", "9999",
        ],
        "dateCreationEtablissement" => &[
            "2024-01-10", "2023-11-20", "2024-03-15", "2024-04-01", "2024-05-20", "2024-06-30",
            "2024-07-14", "2024-08-08", "2024-09-01", "2024-12-31", "2024-01-01", "2024-01-02",
        ],
        "dateCreationUniteLegale" => &[
            "2024-01-10", "2024-02-05", "2024-03-15", "2024-04-01", "2024-05-20", "2024-06-30",
            "2024-07-14", "[ND]", "2024-09-01", "2024-12-31", "2024-01-01", "2024-01-02",
        ],
        "coordonneeLambertAbscisseEtablissement" => &[
            "651000", "[ND]", "652000", "653000", "654000", "655000",
            "656000", "657000", "658000", "659000", "660000", "661000",
        ],
        "coordonneeLambertOrdonneeEtablissement" => &[
            "6861000", "[ND]", "6862000", "6863000", "6864000", "6865000",
            "6866000", "6867000", "6868000", "6869000", "6870000", "6871000",
        ],
    )
    .unwrap()
}

pub fn working_table_with_report() -> (WorkingTable, JoinReport) {
    let establishments = normalize_establishments(establishments_frame()).unwrap();
    validate_establishments(&establishments).unwrap();
    let activity = HierarchyTable::new(Hierarchy::Activity, activity_frame()).unwrap();
    let legal = HierarchyTable::new(Hierarchy::LegalCategory, legal_frame()).unwrap();
    join_hierarchies(
        &establishments,
        establishment::ACTIVITY_LEGAL_UNIT,
        &activity,
        &legal,
    )
    .unwrap()
}

pub fn working_table() -> WorkingTable {
    working_table_with_report().0
}

/// Sirets of a frame, sorted.
pub fn sirets(df: &DataFrame) -> Vec<String> {
    let mut out: Vec<String> = df
        .column(establishment::SIRET)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .flatten()
        .map(|s| s.to_string())
        .collect();
    out.sort();
    out
}
