#![allow(dead_code)]

use std::fs;
use std::path::Path;

use rust_xlsxwriter::Workbook;
use sirene_explorer::{Explorer, ExplorerConfig};
use tempfile::TempDir;

pub const ACTIVITY_CSV: &str = "\
NIV1,NIV2,NIV3,NIV4,NIV5,NIV1 - Libellé,NIV2 - Libellé,NIV3 - Libellé,NIV4 - Libellé,NIV5 - Libellé
G,47,47.1,47.11,47.11C,Commerce,Détail,Magasins non spécialisés,Supérettes et épiceries,Supérettes
G,47,47.2,47.24,47.24Z,Commerce,Détail,Alimentaire spécialisé,Pain et pâtisserie en magasin,Boulangerie
G,46,46.3,46.31,46.31Z,Commerce,Gros,Gros alimentaire,Fruits et légumes,Commerce de gros de fruits
C,10,10.7,10.71,10.71A,Industrie,Industries alimentaires,Pain et pâtisserie,Fabrication de pain,Fabrication industrielle de pain
C,33,33.1,33.12,33.12Z,Industrie,Réparation,\"Réparation d'ouvrages\",Réparation de machines,Réparation de machines
A,01,01.1,01.11,01.11Z,Agriculture,Cultures,Cultures non permanentes,Céréales,Culture de céréales
";

pub const LEGAL_CSV: &str = "\
CJ1,CJ2,CJ3,CJ1 - Libellé,CJ2 - Libellé,CJ3 - Libellé
5,57,5710,Société commerciale,SAS,SAS
5,54,5499,Société commerciale,SARL,SARL
1,10,1000,Entrepreneur individuel,Entrepreneur individuel,Entrepreneur individuel
";

/// Ten establishments join; the last two carry codes absent from the
/// hierarchies. `nomenclature` is not a retained column.
pub const ESTABLISHMENTS_CSV: &str = "\
siret,siren,activitePrincipaleEtablissement,activitePrincipaleUniteLegale,categorieJuridiqueUniteLegale,dateCreationEtablissement,dateCreationUniteLegale,codePostalEtablissement,coordonneeLambertAbscisseEtablissement,coordonneeLambertOrdonneeEtablissement,nomenclature
00000000000001,000000001,47.24Z,47.24Z,5710,2024-01-10,2024-01-10,75001,651000,6861000,NAFRev2
00000000000002,000000002,46.31Z,47.11C,5499,2023-11-20,2024-02-05,75002,[ND],[ND],NAFRev2
00000000000003,000000003,47.11C,47.11C,1000,2024-03-15,2024-03-15,75003,652000,6862000,NAFRev2
00000000000004,000000004,47.24Z,47.24Z,1000,2024-04-01,2024-04-01,75004,653000,6863000,NAFRev2
00000000000005,000000005,46.31Z,46.31Z,5710,2024-05-20,2024-05-20,75005,654000,6864000,NAFRev2
00000000000006,000000006,46.31Z,46.31Z,5499,2024-06-30,2024-06-30,75006,655000,6865000,NAFRev2
00000000000007,000000007,10.71A,10.71A,5710,2024-07-14,2024-07-14,75007,656000,6866000,NAFRev2
00000000000008,000000008,10.71A,10.71A,5499,2024-08-08,[ND],75008,657000,6867000,NAFRev2
00000000000009,000000009,10.71A,10.71A,1000,2024-09-01,2024-09-01,75009,658000,6868000,NAFRev2
00000000000010,000000010,33.12Z,33.12Z,5710,2024-12-31,2024-12-31,null,659000,6869000,NAFRev2
00000000000011,000000011,99.99Z,99.99Z,5710,2024-01-01,2024-01-01,75011,660000,6870000,NAFRev2
00000000000012,000000012,47.24Z,47.24Z,9999,2024-01-02,2024-01-02,75012,661000,6871000,NAFRev2
";

/// Write comma-separated `rows` (header first) as a one-sheet workbook.
/// Integer-looking cells outside the header are stored as numbers, the way
/// spreadsheet tools save codes.
pub fn write_xlsx(path: &Path, rows: &str) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, line) in rows.lines().enumerate() {
        for (c, cell) in line.split(',').enumerate() {
            match cell.parse::<u32>() {
                Ok(n) if r > 0 => sheet.write_number(r as u32, c as u16, n as f64).unwrap(),
                _ => sheet.write_string(r as u32, c as u16, cell).unwrap(),
            };
        }
    }
    workbook.save(path).unwrap();
}

pub fn write_dataset_to(dir: &Path, establishments: &str) {
    fs::write(dir.join("etablissements-idf.csv"), establishments).unwrap();
    fs::write(dir.join("naf_5_niveaux.csv"), ACTIVITY_CSV).unwrap();
    write_xlsx(&dir.join("cj_septembre_2022.xlsx"), LEGAL_CSV);
}

/// A temp dir holding the three input files under their default names.
pub fn dataset() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_dataset_to(dir.path(), ESTABLISHMENTS_CSV);
    dir
}

pub fn load_default() -> Explorer {
    let dir = dataset();
    Explorer::load(ExplorerConfig::new(dir.path())).unwrap()
}
