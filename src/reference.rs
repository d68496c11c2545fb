//! Static reference data shared across the pipeline.
//!
//! The county list is fixed configuration for coverage reporting. It is never
//! derived from a dataset: a county missing from the list stays unmatched even
//! if submissions use it consistently.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The 47 reference counties, in official numbering order.
pub const REFERENCE_COUNTIES: [&str; 47] = [
    "Mombasa",
    "Kwale",
    "Kilifi",
    "Tana River",
    "Lamu",
    "Taita Taveta",
    "Garissa",
    "Wajir",
    "Mandera",
    "Marsabit",
    "Isiolo",
    "Meru",
    "Tharaka Nithi",
    "Embu",
    "Kitui",
    "Machakos",
    "Makueni",
    "Nyandarua",
    "Nyeri",
    "Kirinyaga",
    "Murang'a",
    "Kiambu",
    "Turkana",
    "West Pokot",
    "Samburu",
    "Trans Nzoia",
    "Uasin Gishu",
    "Elgeyo Marakwet",
    "Nandi",
    "Baringo",
    "Laikipia",
    "Nakuru",
    "Narok",
    "Kajiado",
    "Kericho",
    "Bomet",
    "Kakamega",
    "Vihiga",
    "Bungoma",
    "Busia",
    "Siaya",
    "Kisumu",
    "Homa Bay",
    "Migori",
    "Kisii",
    "Nyamira",
    "Nairobi",
];

// Form version tags for the known source schemas
pub const FORM_2024: &str = "form_2024";
pub const FORM_2025: &str = "form_2025";

static COUNTY_LOOKUP: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    REFERENCE_COUNTIES
        .iter()
        .map(|name| (name.to_lowercase(), *name))
        .collect()
});

/// Resolve a county value to its reference spelling, ignoring case and
/// surrounding whitespace. Returns `None` for values outside the 47-name list.
pub fn canonical_county(name: &str) -> Option<&'static str> {
    COUNTY_LOOKUP.get(&name.trim().to_lowercase()).copied()
}

/// Whether a value names one of the 47 reference counties.
pub fn is_reference_county(name: &str) -> bool {
    canonical_county(name).is_some()
}
