//! Hijri term codes such as `"الفصل الأول 1445"`.
//!
//! The digits found in a term code are the Hijri year itself; no calendar
//! conversion is attempted.

use std::sync::LazyLock;

use regex::Regex;

/// Appended to every formatted Hijri year.
pub const HIJRI_SUFFIX: &str = "هـ";

static YEAR_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{3,4}").expect("valid year regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Semester {
    First,
    Second,
    Third,
    Supplementary,
}

impl Semester {
    /// Match order matters: the supplementary marker contains the first
    /// semester marker as a substring.
    const MATCH_ORDER: [Semester; 4] = [
        Semester::Supplementary,
        Semester::Third,
        Semester::Second,
        Semester::First,
    ];

    pub fn marker(&self) -> &'static str {
        match self {
            Semester::First => "الأول",
            Semester::Second => "الثاني",
            Semester::Third => "الثالث",
            Semester::Supplementary => "التكميلي",
        }
    }

    /// Approximate position of the term within the Hijri year.
    pub fn month_phrase(&self) -> &'static str {
        match self {
            Semester::First => "بداية محرم",
            Semester::Second => "بداية جمادى الأولى",
            Semester::Third => "بداية رمضان",
            Semester::Supplementary => "نهاية شوال",
        }
    }
}

pub fn parse_semester(raw_term: Option<&str>) -> Option<Semester> {
    let text = raw_term?;
    Semester::MATCH_ORDER
        .into_iter()
        .find(|s| text.contains(s.marker()))
}

/// First run of 3-4 digits, read as the Hijri year.
pub fn parse_calendar_year(raw_term: Option<&str>) -> Option<i32> {
    year_digits(raw_term?)?.parse().ok()
}

fn year_digits(text: &str) -> Option<String> {
    ascii_digits(YEAR_DIGITS.find(text)?.as_str())
}

/// `"<month phrase> <year>هـ"`, or just `"<year>هـ"` when no semester marker
/// is present.
pub fn format_term_date(raw_term: Option<&str>) -> Option<String> {
    // The digit run is kept as written, leading zeros included.
    let year = year_digits(raw_term?)?;
    match parse_semester(raw_term) {
        Some(semester) => Some(format!(
            "{} {}{}",
            semester.month_phrase(),
            year,
            HIJRI_SUFFIX
        )),
        None => Some(format!("{}{}", year, HIJRI_SUFFIX)),
    }
}

// `\d` is Unicode-aware, so term codes written with Arabic-Indic digits match
// too; fold them to ASCII before parsing.
fn ascii_digits(digits: &str) -> Option<String> {
    digits
        .chars()
        .map(|c| match c {
            '0'..='9' => Some(c),
            '\u{0660}'..='\u{0669}' => char::from_digit(c as u32 - 0x0660, 10),
            '\u{06F0}'..='\u{06F9}' => char::from_digit(c as u32 - 0x06F0, 10),
            _ => None,
        })
        .collect()
}
