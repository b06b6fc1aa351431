use tracing::{debug, warn};

use crate::geography::country_to_continent;
use crate::models::{parse_numeric, Continent, RawStudentRow, StudentRecord, UNDEFINED};
use crate::normalizer::{categorize_status, normalize_country, normalize_gender};
use crate::terms::{format_term_date, parse_calendar_year};

fn or_undefined(value: Option<&str>) -> String {
    value.unwrap_or(UNDEFINED).to_string()
}

/// Builds the canonical record for one source row. Never fails: every defect
/// degrades a single field to its documented default.
pub fn build_record(row: &RawStudentRow) -> StudentRecord {
    let country = normalize_country(row.nationality.as_deref());
    let continent = country_to_continent(&country);

    let admit_year = parse_calendar_year(row.term_admit.as_deref());
    let last_term_year = parse_calendar_year(row.last_term.as_deref());

    StudentRecord {
        student_id: row.student_id.clone(),
        name: row.name.clone(),
        gender: normalize_gender(row.gender.as_deref()),
        country,
        continent,
        program: or_undefined(row.program.as_deref()),
        college: or_undefined(row.college.as_deref()),
        status: categorize_status(row.status.as_deref()),
        status_detail: or_undefined(row.status.as_deref()),
        funding: or_undefined(row.funding.as_deref()),
        level: or_undefined(row.level.as_deref()),
        gpa: parse_numeric(row.gpa.as_deref()),
        hours: parse_numeric(row.hours.as_deref()),
        term_admit: row.term_admit.clone(),
        last_term: row.last_term.clone(),
        admit_year,
        last_term_year,
        timeline_year: admit_year.or(last_term_year),
        admit_date: format_term_date(row.term_admit.as_deref()),
        last_term_date: format_term_date(row.last_term.as_deref()),
        email: row.email.clone(),
        mobile: row.mobile.clone(),
    }
}

pub fn build_records(rows: &[RawStudentRow]) -> Vec<StudentRecord> {
    let records: Vec<StudentRecord> = rows.iter().map(build_record).collect();

    let unmapped = records
        .iter()
        .filter(|r| r.country != UNDEFINED && r.continent == Continent::Undefined)
        .count();
    debug!(rows = records.len(), "built student records");
    if unmapped > 0 {
        warn!(records = unmapped, "countries without a continent mapping");
    }

    records
}
