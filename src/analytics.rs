//! Filtered views and aggregates over the normalized roster. Everything here
//! returns plain data; rendering is left to the caller.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::density::{estimate_density, sample_std};
use crate::models::{Gender, StatusCategory, StudentRecord};

#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub country: Option<String>,
    pub program: Option<String>,
    pub status: Option<StatusCategory>,
    pub gender: Option<Gender>,
    /// Inclusive. Records without a GPA are compared as the dataset minimum.
    pub gpa_range: Option<(f64, f64)>,
    /// Case-insensitive substring over name, country, college and program.
    pub search: Option<String>,
}

impl RecordFilter {
    pub fn apply<'a>(&self, records: &'a [StudentRecord]) -> Vec<&'a StudentRecord> {
        let (gpa_floor, _) = gpa_bounds(records);
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        records
            .iter()
            .filter(|r| self.country.as_deref().map_or(true, |c| r.country == c))
            .filter(|r| self.program.as_deref().map_or(true, |p| r.program == p))
            .filter(|r| self.status.map_or(true, |s| r.status == s))
            .filter(|r| self.gender.map_or(true, |g| r.gender == g))
            .filter(|r| {
                self.gpa_range.map_or(true, |(lo, hi)| {
                    let gpa = r.gpa.unwrap_or(gpa_floor);
                    gpa >= lo && gpa <= hi
                })
            })
            .filter(|r| needle.as_deref().map_or(true, |n| matches_search(r, n)))
            .collect()
    }
}

fn matches_search(record: &StudentRecord, needle: &str) -> bool {
    [
        record.name.as_deref().unwrap_or(""),
        &record.country,
        &record.college,
        &record.program,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

/// (min, max) GPA for slider bounds; `(0, 5)` when no GPA is known.
pub fn gpa_bounds<'a>(records: impl IntoIterator<Item = &'a StudentRecord>) -> (f64, f64) {
    let gpas: Vec<f64> = records.into_iter().filter_map(|r| r.gpa).collect();
    if gpas.is_empty() {
        return (0.0, 5.0);
    }
    let min = gpas.iter().copied().fold(f64::INFINITY, f64::min);
    let max = gpas.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        (min, min + 1.0)
    } else {
        (min, max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub active: usize,
    pub graduated: usize,
    pub mean_gpa: Option<f64>,
    pub countries: usize,
}

pub fn summarize(records: &[&StudentRecord]) -> Summary {
    let gpas: Vec<f64> = records.iter().filter_map(|r| r.gpa).collect();
    Summary {
        total: records.len(),
        active: records.iter().filter(|r| r.status == StatusCategory::Active).count(),
        graduated: records
            .iter()
            .filter(|r| r.status == StatusCategory::Graduated)
            .count(),
        mean_gpa: mean(&gpas),
        countries: records
            .iter()
            .map(|r| r.country.as_str())
            .collect::<HashSet<_>>()
            .len(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Program,
    College,
    Status,
    Gender,
    Country,
    Continent,
    Funding,
    Level,
}

impl Dimension {
    pub fn value(&self, record: &StudentRecord) -> String {
        match self {
            Dimension::Program => record.program.clone(),
            Dimension::College => record.college.clone(),
            Dimension::Status => record.status.label().to_string(),
            Dimension::Gender => record.gender.label().to_string(),
            Dimension::Country => record.country.clone(),
            Dimension::Continent => record.continent.label().to_string(),
            Dimension::Funding => record.funding.clone(),
            Dimension::Level => record.level.clone(),
        }
    }
}

/// Counts per value, most frequent first; ties by label.
pub fn value_counts(records: &[&StudentRecord], dimension: Dimension) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        *counts.entry(dimension.value(record)).or_insert(0) += 1;
    }
    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// The first `n` entries of a [`value_counts`] result.
pub fn top(mut counts: Vec<(String, usize)>, n: usize) -> Vec<(String, usize)> {
    counts.truncate(n);
    counts
}

/// Mean GPA per value, highest first. Groups with no GPA at all are omitted.
pub fn mean_gpa_by(records: &[&StudentRecord], dimension: Dimension) -> Vec<(String, f64)> {
    let mut groups: HashMap<String, Vec<f64>> = HashMap::new();
    for record in records {
        if let Some(gpa) = record.gpa {
            groups.entry(dimension.value(record)).or_default().push(gpa);
        }
    }
    let mut means: Vec<(String, f64)> = groups
        .into_iter()
        .filter_map(|(label, gpas)| mean(&gpas).map(|m| (label, m)))
        .collect();
    means.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    means
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryStats {
    pub country: String,
    pub students: usize,
    /// Rounded to two decimals.
    pub mean_gpa: Option<f64>,
}

pub fn country_stats(records: &[&StudentRecord]) -> Vec<CountryStats> {
    let mut groups: HashMap<&str, (usize, Vec<f64>)> = HashMap::new();
    for record in records {
        let entry = groups.entry(record.country.as_str()).or_default();
        entry.0 += 1;
        entry.1.extend(record.gpa);
    }
    let mut stats: Vec<CountryStats> = groups
        .into_iter()
        .map(|(country, (students, gpas))| CountryStats {
            country: country.to_string(),
            students,
            mean_gpa: mean(&gpas).map(|m| (m * 100.0).round() / 100.0),
        })
        .collect();
    stats.sort_by(|a, b| b.students.cmp(&a.students).then_with(|| a.country.cmp(&b.country)));
    stats
}

/// Students per timeline year, oldest first.
pub fn enrollment_trend(records: &[&StudentRecord]) -> Vec<(i32, usize)> {
    let mut years: BTreeMap<i32, usize> = BTreeMap::new();
    for year in records.iter().filter_map(|r| r.timeline_year) {
        *years.entry(year).or_insert(0) += 1;
    }
    years.into_iter().collect()
}

/// Credit-hours distribution per program, for box plots.
pub fn hours_by_program(records: &[&StudentRecord]) -> Vec<(String, NumericSummary)> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in records {
        if let Some(hours) = record.hours {
            groups.entry(record.program.as_str()).or_default().push(hours);
        }
    }
    groups
        .into_iter()
        .filter_map(|(program, hours)| {
            NumericSummary::describe(&hours).map(|s| (program.to_string(), s))
        })
        .collect()
}

pub fn gpa_density(records: &[&StudentRecord]) -> (Vec<f64>, Vec<f64>) {
    let gpas: Vec<f64> = records.iter().filter_map(|r| r.gpa).collect();
    estimate_density(&gpas)
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; 0 for a single value.
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl NumericSummary {
    /// `None` when there are no finite values.
    pub fn describe(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            count: sorted.len(),
            mean: mean(&sorted)?,
            std: sample_std(&sorted),
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawStudentRow;
    use crate::records::build_record;

    fn student(
        name: &str,
        nationality: &str,
        program: &str,
        status: &str,
        gpa: &str,
        term: &str,
    ) -> StudentRecord {
        build_record(&RawStudentRow {
            student_id: Some(name.to_string()),
            name: Some(name.to_string()),
            gender: Some(if name.starts_with('F') { "F" } else { "M" }.to_string()),
            nationality: Some(nationality.to_string()),
            program: Some(program.to_string()),
            college: Some("College".to_string()),
            status: Some(status.to_string()),
            gpa: Some(gpa.to_string()),
            hours: Some("30".to_string()),
            term_admit: Some(term.to_string()),
            ..Default::default()
        })
    }

    fn roster() -> Vec<StudentRecord> {
        vec![
            student("Fatima", "مصري", "Medicine", "متابع", "4.5", "الفصل الأول 1443"),
            student("Omar", "مصري", "Law", "متخرج", "3.0", "الفصل الأول 1440"),
            student("Musa", "يمني", "Medicine", "منسحب", "", "الفصل الثاني 1443"),
            student("Faris", "Indonesia", "Physics", "زائر", "2.0", ""),
        ]
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let records = roster();
        assert_eq!(RecordFilter::default().apply(&records).len(), 4);
    }

    #[test]
    fn filters_combine() {
        let records = roster();
        let filter = RecordFilter {
            country: Some("مصر".to_string()),
            status: Some(StatusCategory::Active),
            ..Default::default()
        };
        let hits = filter.apply(&records);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name.as_deref(), Some("Fatima"));
    }

    #[test]
    fn missing_gpa_counts_as_minimum() {
        let records = roster();
        let filter = RecordFilter {
            gpa_range: Some((2.0, 2.5)),
            ..Default::default()
        };
        let names: Vec<_> = filter
            .apply(&records)
            .iter()
            .filter_map(|r| r.name.clone())
            .collect();
        assert_eq!(names, vec!["Musa".to_string(), "Faris".to_string()]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let records = roster();
        let filter = RecordFilter {
            search: Some("medic".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&records).len(), 2);
    }

    #[test]
    fn gpa_bounds_handle_degenerate_sets() {
        assert_eq!(gpa_bounds(&Vec::<StudentRecord>::new()), (0.0, 5.0));
        let records = roster();
        assert_eq!(gpa_bounds(&records), (2.0, 4.5));
        assert_eq!(gpa_bounds(&records[..1]), (4.5, 5.5));
    }

    #[test]
    fn summary_counts() {
        let records = roster();
        let all: Vec<&StudentRecord> = records.iter().collect();
        let summary = summarize(&all);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.active, 2);
        assert_eq!(summary.graduated, 1);
        assert_eq!(summary.countries, 3);
        let mean = summary.mean_gpa.expect("mean");
        assert!((mean - 9.5 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn value_counts_are_sorted() {
        let records = roster();
        let all: Vec<&StudentRecord> = records.iter().collect();
        let counts = value_counts(&all, Dimension::Program);
        assert_eq!(counts[0], ("Medicine".to_string(), 2));
        assert_eq!(counts.len(), 3);
        assert_eq!(
            top(counts, 2),
            vec![("Medicine".to_string(), 2), ("Law".to_string(), 1)]
        );

        let continents = value_counts(&all, Dimension::Continent);
        assert_eq!(continents.len(), 2);
        assert!(continents.contains(&("أفريقيا".to_string(), 2)));
        assert!(continents.contains(&("آسيا".to_string(), 2)));
    }

    #[test]
    fn mean_gpa_skips_groups_without_gpa() {
        let records = roster();
        let all: Vec<&StudentRecord> = records.iter().collect();
        let by_country = mean_gpa_by(&all, Dimension::Country);
        assert_eq!(by_country.len(), 2);
        assert_eq!(by_country[0].0, "مصر");
        assert!((by_country[0].1 - 3.75).abs() < 1e-12);
    }

    #[test]
    fn country_stats_round_means() {
        let records = roster();
        let all: Vec<&StudentRecord> = records.iter().collect();
        let stats = country_stats(&all);
        assert_eq!(stats[0].country, "مصر");
        assert_eq!(stats[0].students, 2);
        assert_eq!(stats[0].mean_gpa, Some(3.75));
        let yemen = stats.iter().find(|s| s.country == "اليمن").expect("yemen");
        assert_eq!(yemen.mean_gpa, None);
    }

    #[test]
    fn trend_drops_unknown_years() {
        let records = roster();
        let all: Vec<&StudentRecord> = records.iter().collect();
        assert_eq!(enrollment_trend(&all), vec![(1440, 1), (1443, 2)]);
    }

    #[test]
    fn describe_quantiles() {
        let summary = NumericSummary::describe(&[4.0, 1.0, 3.0, 2.0]).expect("summary");
        assert_eq!(summary.count, 4);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        assert!((summary.median - 2.5).abs() < 1e-12);
        assert!((summary.q1 - 1.75).abs() < 1e-12);
        assert!((summary.q3 - 3.25).abs() < 1e-12);
        assert!(NumericSummary::describe(&[]).is_none());
    }

    #[test]
    fn hours_grouped_by_program() {
        let records = roster();
        let all: Vec<&StudentRecord> = records.iter().collect();
        let groups = hours_by_program(&all);
        let medicine = groups.iter().find(|(p, _)| p == "Medicine").expect("medicine");
        assert_eq!(medicine.1.count, 2);
        assert_eq!(medicine.1.std, 0.0);
    }
}
