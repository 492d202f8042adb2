/// Column-name constants for the establishment registry and its two
/// classification tables. Single source of truth - exported to Python via PyO3.

// ── Establishment columns ───────────────────────────────────────────────────
pub mod establishment {
    pub const SIRET: &str = "siret";
    pub const SIREN: &str = "siren";
    pub const COMMUNE_CODE: &str = "codeCommuneEtablissement";
    pub const ACTIVITY_ESTABLISHMENT: &str = "activitePrincipaleEtablissement";
    pub const ACTIVITY_LEGAL_UNIT: &str = "activitePrincipaleUniteLegale";
    pub const LEGAL_CATEGORY: &str = "categorieJuridiqueUniteLegale";
    pub const CREATED_ESTABLISHMENT: &str = "dateCreationEtablissement";
    pub const CREATED_LEGAL_UNIT: &str = "dateCreationUniteLegale";
    pub const STATUS_ESTABLISHMENT: &str = "etatAdministratifEtablissement";
    pub const STATUS_LEGAL_UNIT: &str = "etatAdministratifUniteLegale";
    pub const POSTAL_CODE: &str = "codePostalEtablissement";
    pub const LAMBERT_X: &str = "coordonneeLambertAbscisseEtablissement";
    pub const LAMBERT_Y: &str = "coordonneeLambertOrdonneeEtablissement";
    pub const NAME_LEGAL_UNIT: &str = "denominationUniteLegale";
    pub const NAME_ESTABLISHMENT: &str = "denominationUsuelleEtablissement";
    pub const SOCIAL_ECONOMY: &str = "economieSocialeSolidaireUniteLegale";
    pub const SEX_LEGAL_UNIT: &str = "sexeUniteLegale";
    pub const HEADCOUNT_ESTABLISHMENT: &str = "trancheEffectifsEtablissement";
    pub const HEADCOUNT_LEGAL_UNIT: &str = "trancheEffectifsUniteLegale";
    pub const ENTERPRISE_CATEGORY: &str = "categorieEntreprise";

    /// Columns retained after load, in output order.
    pub const RETAINED: [&str; 20] = [
        SIRET,
        SIREN,
        COMMUNE_CODE,
        ACTIVITY_ESTABLISHMENT,
        ACTIVITY_LEGAL_UNIT,
        LEGAL_CATEGORY,
        CREATED_ESTABLISHMENT,
        CREATED_LEGAL_UNIT,
        STATUS_ESTABLISHMENT,
        STATUS_LEGAL_UNIT,
        POSTAL_CODE,
        LAMBERT_X,
        LAMBERT_Y,
        NAME_LEGAL_UNIT,
        NAME_ESTABLISHMENT,
        SOCIAL_ECONOMY,
        SEX_LEGAL_UNIT,
        HEADCOUNT_ESTABLISHMENT,
        HEADCOUNT_LEGAL_UNIT,
        ENTERPRISE_CATEGORY,
    ];

    pub const COORDINATES: [&str; 2] = [LAMBERT_X, LAMBERT_Y];
    pub const CREATION_DATES: [&str; 2] = [CREATED_ESTABLISHMENT, CREATED_LEGAL_UNIT];

    /// Columns that must exist for the engine to work at all.
    pub const REQUIRED: [&str; 3] = [SIRET, SIREN, LEGAL_CATEGORY];
}

/// Code and label column pair of one hierarchy level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelColumns {
    pub code: &'static str,
    pub label: &'static str,
}

// ── Activity (NAF) hierarchy columns ────────────────────────────────────────
pub mod activity {
    use super::LevelColumns;

    pub const NIV1: &str = "NIV1";
    pub const NIV2: &str = "NIV2";
    pub const NIV3: &str = "NIV3";
    pub const NIV4: &str = "NIV4";
    pub const NIV5: &str = "NIV5";
    pub const NIV1_LABEL: &str = "NIV1 - Libellé";
    pub const NIV2_LABEL: &str = "NIV2 - Libellé";
    pub const NIV3_LABEL: &str = "NIV3 - Libellé";
    pub const NIV4_LABEL: &str = "NIV4 - Libellé";
    pub const NIV5_LABEL: &str = "NIV5 - Libellé";

    pub const LEVELS: [LevelColumns; 5] = [
        LevelColumns { code: NIV1, label: NIV1_LABEL },
        LevelColumns { code: NIV2, label: NIV2_LABEL },
        LevelColumns { code: NIV3, label: NIV3_LABEL },
        LevelColumns { code: NIV4, label: NIV4_LABEL },
        LevelColumns { code: NIV5, label: NIV5_LABEL },
    ];
}

// ── Legal-category (CJ) hierarchy columns ───────────────────────────────────
pub mod legal {
    use super::LevelColumns;

    pub const CJ1: &str = "CJ1";
    pub const CJ2: &str = "CJ2";
    pub const CJ3: &str = "CJ3";
    pub const CJ1_LABEL: &str = "CJ1 - Libellé";
    pub const CJ2_LABEL: &str = "CJ2 - Libellé";
    pub const CJ3_LABEL: &str = "CJ3 - Libellé";

    pub const LEVELS: [LevelColumns; 3] = [
        LevelColumns { code: CJ1, label: CJ1_LABEL },
        LevelColumns { code: CJ2, label: CJ2_LABEL },
        LevelColumns { code: CJ3, label: CJ3_LABEL },
    ];
}

// ── Missing-value markers ───────────────────────────────────────────────────
pub mod missing {
    pub const NOT_DISCLOSED: &str = "[ND]";
    pub const NULL: &str = "null";

    pub const MARKERS: [&str; 2] = [NOT_DISCLOSED, NULL];
}

// ── Selection mode values ───────────────────────────────────────────────────
pub mod mode {
    pub const INCLUDE: &str = "include";
    pub const EXCLUDE: &str = "exclude";
    pub const NONE: &str = "none";
}

// ── Hierarchy names ─────────────────────────────────────────────────────────
pub mod hierarchy {
    pub const ACTIVITY: &str = "activity";
    pub const LEGAL_CATEGORY: &str = "legal_category";
}

// ── Aggregate output columns ────────────────────────────────────────────────
pub mod aggregate {
    pub const COUNT: &str = "count";
}
