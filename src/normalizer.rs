//! Canonicalization of the free-text and coded roster fields.

use crate::geography::{lookup_latin_name, lookup_nationality};
use crate::models::{Gender, StatusCategory, UNDEFINED};

/// Checked before `STATUS_ACTIVE_KEYWORDS`.
pub const STATUS_GRADUATED_KEYWORDS: &[&str] = &["متخرج", "خريج"];

pub const STATUS_ACTIVE_KEYWORDS: &[&str] = &["متابع", "مؤهل", "مكتمل", "زائر", "مؤجل"];

/// Resolves a raw nationality (or a Latin country name) to the canonical
/// local-script country. Unknown text passes through trimmed.
pub fn normalize_country(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return UNDEFINED.to_string();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return UNDEFINED.to_string();
    }
    if let Some(entry) = lookup_nationality(raw) {
        return entry.country.to_string();
    }
    if let Some(country) = lookup_latin_name(trimmed) {
        return country.to_string();
    }
    trimmed.to_string()
}

pub fn normalize_gender(raw: Option<&str>) -> Gender {
    match raw.map(str::trim) {
        Some("M") => Gender::Male,
        Some("F") => Gender::Female,
        _ => Gender::Undefined,
    }
}

/// Keyword search over the status description. Anything that is neither
/// graduated nor active is `Inactive`; only a missing value is `Undefined`.
pub fn categorize_status(raw: Option<&str>) -> StatusCategory {
    let Some(text) = raw else {
        return StatusCategory::Undefined;
    };
    if STATUS_GRADUATED_KEYWORDS.iter().any(|k| text.contains(k)) {
        return StatusCategory::Graduated;
    }
    if STATUS_ACTIVE_KEYWORDS.iter().any(|k| text.contains(k)) {
        return StatusCategory::Active;
    }
    StatusCategory::Inactive
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geography::NATIONALITIES;

    #[test]
    fn nationality_keys_are_whitespace_insensitive() {
        for entry in NATIONALITIES {
            assert_eq!(
                normalize_country(Some(entry.raw)),
                normalize_country(Some(entry.raw.trim())),
                "key {:?}",
                entry.raw
            );
            assert_eq!(normalize_country(Some(entry.raw)), entry.country);
        }
    }

    #[test]
    fn missing_country_is_undefined() {
        assert_eq!(normalize_country(None), UNDEFINED);
        assert_eq!(normalize_country(Some("")), UNDEFINED);
        assert_eq!(normalize_country(Some("   ")), UNDEFINED);
    }

    #[test]
    fn placeholder_nationalities_collapse_to_undefined() {
        assert_eq!(normalize_country(Some("الجنسية تحت الإجراء")), UNDEFINED);
        assert_eq!(normalize_country(Some("القبائل النازحة")), UNDEFINED);
        assert_eq!(normalize_country(Some("بدون")), UNDEFINED);
    }

    #[test]
    fn many_nationalities_map_to_one_country() {
        assert_eq!(normalize_country(Some("بريطاني")), "المملكة المتحدة");
        assert_eq!(
            normalize_country(Some("المملكة المتحدة والجزر الشمالي")),
            "المملكة المتحدة"
        );
    }

    #[test]
    fn latin_country_names_map_back() {
        assert_eq!(normalize_country(Some("Egypt")), "مصر");
        assert_eq!(normalize_country(Some(" saudi arabia")), "السعودية");
    }

    #[test]
    fn unknown_country_passes_through_trimmed() {
        assert_eq!(normalize_country(Some("  أطلانتس ")), "أطلانتس");
    }

    #[test]
    fn gender_codes() {
        assert_eq!(normalize_gender(Some("M")), Gender::Male);
        assert_eq!(normalize_gender(Some(" F ")), Gender::Female);
        assert_eq!(normalize_gender(Some("m")), Gender::Undefined);
        assert_eq!(normalize_gender(Some("N")), Gender::Undefined);
        assert_eq!(normalize_gender(None), Gender::Undefined);
    }

    #[test]
    fn graduation_wins_over_active() {
        assert_eq!(
            categorize_status(Some("متابع ثم متخرج")),
            StatusCategory::Graduated
        );
        assert_eq!(categorize_status(Some("طالب خريج")), StatusCategory::Graduated);
    }

    #[test]
    fn active_keywords_are_substrings() {
        assert_eq!(categorize_status(Some("منتظم - متابع")), StatusCategory::Active);
        assert_eq!(categorize_status(Some("مؤجل القبول")), StatusCategory::Active);
    }

    #[test]
    fn everything_else_is_inactive() {
        assert_eq!(categorize_status(Some("منسحب")), StatusCategory::Inactive);
        assert_eq!(categorize_status(Some("NOT ACTIVE")), StatusCategory::Inactive);
        assert_eq!(categorize_status(Some("")), StatusCategory::Inactive);
        assert_eq!(categorize_status(None), StatusCategory::Undefined);
    }
}
