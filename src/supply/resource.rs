use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hex display color understood by the charting layer
pub type Color = &'static str;

/// Broad technology class of a generating resource.
///
/// Raw market resource types (`CCGT90`, `PVGR`, `PWRSTR`, ...) are classified
/// once when a record is ingested; everything downstream works on the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    Wind,
    Solar,
    Hydro,
    Nuclear,
    Coal,
    Gas,
    Steam,
    CombinedCycle,
    GasTurbine,
    Biomass,
    Landfill,
    Storage,
    DcTie,
    SyncCondenser,
    /// Placeholder identity for records kept without a type
    Unknown,
    Other,
}

impl ResourceCategory {
    pub const ALL: [ResourceCategory; 16] = [
        ResourceCategory::Wind,
        ResourceCategory::Solar,
        ResourceCategory::Hydro,
        ResourceCategory::Nuclear,
        ResourceCategory::Coal,
        ResourceCategory::Gas,
        ResourceCategory::Steam,
        ResourceCategory::CombinedCycle,
        ResourceCategory::GasTurbine,
        ResourceCategory::Biomass,
        ResourceCategory::Landfill,
        ResourceCategory::Storage,
        ResourceCategory::DcTie,
        ResourceCategory::SyncCondenser,
        ResourceCategory::Unknown,
        ResourceCategory::Other,
    ];

    /// Classify a raw resource type.
    ///
    /// Exact codes are looked up first, then keyword fragments, then `Other`.
    pub fn classify(resource_type: &str) -> Self {
        let upper = resource_type.trim().to_uppercase();

        if let Some(category) = EXACT_TYPES.get(upper.as_str()) {
            return *category;
        }

        let has = |needles: &[&str]| needles.iter().any(|n| upper.contains(n));

        if has(&["WIND"]) {
            ResourceCategory::Wind
        } else if has(&["SOLAR", "PV"]) {
            ResourceCategory::Solar
        } else if has(&["BESS", "BATTERY", "STORAGE"]) {
            ResourceCategory::Storage
        } else if has(&["HYDRO"]) {
            ResourceCategory::Hydro
        } else if has(&["NUCLEAR"]) {
            ResourceCategory::Nuclear
        } else if has(&["COAL"]) {
            ResourceCategory::Coal
        } else if has(&["GAS", "NG"]) {
            ResourceCategory::Gas
        } else if has(&["CC", "COMBINED"]) {
            ResourceCategory::CombinedCycle
        } else if has(&["GT", "TURBINE"]) {
            ResourceCategory::GasTurbine
        } else if has(&["STEAM"]) {
            ResourceCategory::Steam
        } else if has(&["BIOMASS", "BIO"]) {
            ResourceCategory::Biomass
        } else {
            ResourceCategory::Other
        }
    }

    pub const fn color(self) -> Color {
        match self {
            ResourceCategory::Wind => "#32CD32",
            ResourceCategory::Solar => "#FFD700",
            ResourceCategory::Hydro => "#4169E1",
            ResourceCategory::Nuclear => "#8A2BE2",
            ResourceCategory::Coal => "#8B4513",
            ResourceCategory::Gas => "#FF4500",
            ResourceCategory::Steam => "#FF6347",
            ResourceCategory::CombinedCycle => "#FF8C00",
            ResourceCategory::GasTurbine => "#FFA500",
            ResourceCategory::Biomass => "#228B22",
            ResourceCategory::Landfill => "#556B2F",
            ResourceCategory::Storage => "#9932CC",
            ResourceCategory::DcTie => "#FF1493",
            ResourceCategory::SyncCondenser => "#708090",
            ResourceCategory::Unknown => "#A9A9A9",
            ResourceCategory::Other => "#696969",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ResourceCategory::Wind => "Wind",
            ResourceCategory::Solar => "Solar",
            ResourceCategory::Hydro => "Hydro",
            ResourceCategory::Nuclear => "Nuclear",
            ResourceCategory::Coal => "Coal",
            ResourceCategory::Gas => "Gas",
            ResourceCategory::Steam => "Steam",
            ResourceCategory::CombinedCycle => "Combined cycle",
            ResourceCategory::GasTurbine => "Gas turbine",
            ResourceCategory::Biomass => "Biomass",
            ResourceCategory::Landfill => "Landfill gas",
            ResourceCategory::Storage => "Storage",
            ResourceCategory::DcTie => "DC tie",
            ResourceCategory::SyncCondenser => "Synchronous condenser",
            ResourceCategory::Unknown => "Unknown",
            ResourceCategory::Other => "Other",
        }
    }
}

/// Resource type codes with a fixed category
static EXACT_TYPES: Lazy<HashMap<&'static str, ResourceCategory>> = Lazy::new(|| {
    use ResourceCategory::*;

    let codes = [
        ("WIND", Wind),
        ("PVGR", Solar),
        ("SOLAR", Solar),
        ("HYDRO", Hydro),
        ("NUCLEAR", Nuclear),
        ("NUC", Nuclear),
        ("COAL", Coal),
        ("CLLIG", Coal),
        ("GAS", Gas),
        ("STEAM", Steam),
        ("CC", CombinedCycle),
        ("CCGT90", CombinedCycle),
        ("CCLE90", CombinedCycle),
        ("GT", GasTurbine),
        ("SCGT90", GasTurbine),
        ("SCLE90", GasTurbine),
        ("BIOMASS", Biomass),
        ("LANDFILL", Landfill),
        ("PWRSTR", Storage),
        ("ESR", Storage),
        ("GSREH", Storage),
        ("GSNONR", Storage),
        ("GSSUP", Storage),
        ("DC", DcTie),
        ("SYNC_COND", SyncCondenser),
        ("DSL", SyncCondenser),
        ("OTHER", Other),
        ("UNKNOWN", Unknown),
    ];

    codes.into_iter().collect()
});

impl std::fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
