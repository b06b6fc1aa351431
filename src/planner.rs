//! Seat allocation for the admissions planner.
//!
//! Seats are apportioned so that each country's post-allocation share moves
//! toward its share of applicants:
//! - need_i = max(0, w_i * (current_total + seats) - current_i), falling back
//!   to w_i when every need is zero;
//! - need is scaled to `seats` and floored (largest-remainder base step);
//! - admits are clamped to `min(cap_seat, cap_post_i)`, then raised to the
//!   per-country minimum but never above the cap;
//! - leftovers go to the largest fractional remainder still under its cap
//!   (then largest weight); overshoot caused by minimums is trimmed from the
//!   smallest remainder above the minimum.
//!
//! Caps are hard limits, so fewer than `seats` may be allocated.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::IntakeError;
use crate::geography::country_to_continent;
use crate::models::{AllocationResult, IntakeRow, PlannerConfig, StatusCategory, StudentRecord};
use crate::normalizer::normalize_country;

/// Header names accepted for the applicant table's two required columns.
pub const COUNTRY_COLUMNS: &[&str] = &["country", "nationality", "الدولة", "الجنسية"];
pub const APPLICANT_COLUMNS: &[&str] = &["applicants", "applicant_count", "count", "عدد المتقدمين", "المتقدمين"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationParams {
    pub seats: u64,
    pub min_per_country: u64,
    /// Fraction in (0, 1] of `seats` any one country may receive.
    pub max_seat_share: f64,
    /// Fraction in (0, 1] of the post-allocation population any one country
    /// may reach.
    pub max_post_share: f64,
}

impl From<&PlannerConfig> for AllocationParams {
    fn from(config: &PlannerConfig) -> Self {
        Self {
            seats: config.seats,
            min_per_country: config.min_per_country,
            max_seat_share: config.max_seat_share,
            max_post_share: config.max_post_share,
        }
    }
}

/// One row of the uploaded applicant table after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantRow {
    pub country: String,
    pub applicants: u64,
}

/// Per-row working state for the redistribution passes.
#[derive(Debug, Clone)]
struct Slot {
    weight: f64,
    remainder: f64,
    admits: u64,
    cap: u64,
}

pub fn allocate(rows: &[IntakeRow], params: &AllocationParams) -> Vec<AllocationResult> {
    let rows: Vec<&IntakeRow> = rows.iter().filter(|r| r.applicants > 0).collect();
    let seats = params.seats;

    if rows.is_empty() || seats == 0 {
        return rows.into_iter().map(|r| result(r, 0.0, 0, 0.0)).collect();
    }

    let total_applicants: f64 = rows.iter().map(|r| r.applicants as f64).sum();
    let total_current = saturating_sum(rows.iter().map(|r| r.current));
    let grand_post_total = total_current.saturating_add(seats);
    let grand = grand_post_total as f64;

    let weights: Vec<f64> = rows
        .iter()
        .map(|r| r.applicants as f64 / total_applicants)
        .collect();

    let mut need: Vec<f64> = rows
        .iter()
        .zip(&weights)
        .map(|(r, w)| (w * grand - r.current as f64).max(0.0))
        .collect();
    if need.iter().all(|n| *n <= 0.0) {
        need = weights.clone();
    }
    let need_total: f64 = need.iter().sum();

    let seat_share = params.max_seat_share.clamp(0.0, 1.0);
    let post_share = params.max_post_share.clamp(0.0, 1.0);
    let cap_seat = (seats as f64 * seat_share).floor() as u64;
    let post_limit = (post_share * grand).floor() as u64;

    let mut slots: Vec<Slot> = rows
        .iter()
        .zip(weights.iter().zip(&need))
        .map(|(r, (&weight, &n))| {
            let scaled = if need_total > 0.0 {
                n / need_total * seats as f64
            } else {
                0.0
            };
            let base = scaled.floor();
            let cap = cap_seat.min(post_limit.saturating_sub(r.current));
            Slot {
                weight,
                remainder: scaled - base,
                admits: (base as u64).min(cap),
                cap,
            }
        })
        .collect();

    if params.min_per_country > 0 {
        for slot in &mut slots {
            slot.admits = slot.admits.max(params.min_per_country.min(slot.cap));
        }
    }

    let allocated = saturating_sum(slots.iter().map(|s| s.admits));
    if allocated < seats {
        distribute_leftovers(seats - allocated, &mut slots);
    } else if allocated > seats {
        trim_over_allocation(allocated - seats, params.min_per_country, &mut slots);
    }

    let allocated = saturating_sum(slots.iter().map(|s| s.admits));
    debug!(seats, allocated, rows = slots.len(), "allocation finished");
    if allocated < seats {
        warn!(
            unallocated = seats - allocated,
            "caps prevent allocating every seat"
        );
    }

    let mut results: Vec<AllocationResult> = rows
        .iter()
        .zip(&slots)
        .map(|(r, s)| {
            let post_total = r.current.saturating_add(s.admits);
            result(r, s.weight, s.admits, post_total as f64 / grand)
        })
        .collect();

    results.sort_by(|a, b| {
        b.target_admits
            .cmp(&a.target_admits)
            .then_with(|| b.target_weight.partial_cmp(&a.target_weight).unwrap_or(Ordering::Equal))
            .then_with(|| a.country.cmp(&b.country))
    });
    results
}

fn result(row: &IntakeRow, weight: f64, admits: u64, post_share: f64) -> AllocationResult {
    AllocationResult {
        country: row.country.clone(),
        continent: row.continent,
        applicants: row.applicants,
        current: row.current,
        target_weight: weight,
        target_admits: admits,
        post_total: row.current.saturating_add(admits),
        post_share,
    }
}

fn saturating_sum(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

/// One seat at a time to the largest unused fractional remainder under cap;
/// once no positive remainder is left, the largest weight under cap is filled
/// up to its cap in a single step. Each step either consumes a remainder or
/// closes a slot, so the loop runs at most twice per slot.
fn distribute_leftovers(mut remaining: u64, slots: &mut [Slot]) {
    for _ in 0..=slots.len().saturating_mul(2) {
        if remaining == 0 {
            break;
        }
        let by_remainder = open_slots(slots)
            .filter(|(_, s)| s.remainder > 0.0)
            .max_by(|(ia, a), (ib, b)| {
                a.remainder
                    .total_cmp(&b.remainder)
                    .then_with(|| a.weight.total_cmp(&b.weight))
                    .then_with(|| ib.cmp(ia))
            })
            .map(|(i, _)| i);
        if let Some(i) = by_remainder {
            slots[i].admits += 1;
            slots[i].remainder = 0.0;
            remaining -= 1;
            continue;
        }

        let by_weight = open_slots(slots)
            .max_by(|(ia, a), (ib, b)| a.weight.total_cmp(&b.weight).then_with(|| ib.cmp(ia)))
            .map(|(i, _)| i);
        let Some(i) = by_weight else {
            break;
        };
        let grant = remaining.min(slots[i].cap - slots[i].admits);
        slots[i].admits += grant;
        remaining -= grant;
    }
}

fn open_slots(slots: &[Slot]) -> impl Iterator<Item = (usize, &Slot)> {
    slots.iter().enumerate().filter(|(_, s)| s.admits < s.cap)
}

/// Takes seats from the smallest remainder above the minimum, down to the
/// minimum in one step. If the minimums alone exceed the seat budget, the
/// budget wins and rows are trimmed below the minimum as well.
fn trim_over_allocation(mut excess: u64, min_per_country: u64, slots: &mut [Slot]) {
    for floor in [min_per_country, 0] {
        for _ in 0..=slots.len() {
            if excess == 0 {
                return;
            }
            let pick = slots
                .iter()
                .enumerate()
                .filter(|(_, s)| s.admits > floor)
                .min_by(|(ia, a), (ib, b)| {
                    a.remainder
                        .total_cmp(&b.remainder)
                        .then_with(|| a.weight.total_cmp(&b.weight))
                        .then_with(|| ib.cmp(ia))
                })
                .map(|(i, _)| i);

            let Some(i) = pick else {
                break;
            };
            let cut = excess.min(slots[i].admits - floor);
            slots[i].admits -= cut;
            excess -= cut;
        }
    }
}

/// Sum of squared shares; 0 for an all-zero input.
pub fn herfindahl_index(counts: &[u64]) -> f64 {
    let total: f64 = counts.iter().map(|&c| c as f64).sum();
    if total == 0.0 {
        return 0.0;
    }
    counts
        .iter()
        .map(|&c| {
            let share = c as f64 / total;
            share * share
        })
        .sum()
}

/// Reads the uploaded applicant table. Country text goes through the same
/// normalizer as the roster; non-numeric or negative counts become 0.
pub fn read_applicants<R: Read>(reader: R) -> Result<Vec<ApplicantRow>, IntakeError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let find = |names: &[&str]| {
        headers.iter().position(|h| {
            let h = h.trim_start_matches('\u{feff}').trim();
            names.iter().any(|n| h.eq_ignore_ascii_case(n))
        })
    };
    let country_ix = find(COUNTRY_COLUMNS).ok_or(IntakeError::MissingColumn { column: "country" })?;
    let count_ix =
        find(APPLICANT_COLUMNS).ok_or(IntakeError::MissingColumn { column: "applicants" })?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let country = record.get(country_ix).filter(|c| !c.trim().is_empty());
        rows.push(ApplicantRow {
            country: normalize_country(country),
            applicants: coerce_count(record.get(count_ix)),
        });
    }
    Ok(rows)
}

pub fn read_applicants_file(path: impl AsRef<Path>) -> Result<Vec<ApplicantRow>, IntakeError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IntakeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_applicants(file)
}

fn coerce_count(value: Option<&str>) -> u64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v.trunc() as u64)
        .unwrap_or(0)
}

/// Joins applicant counts with current enrollment per country. Duplicate
/// countries are summed; rows without applicants are dropped.
pub fn build_intake_rows(
    applicants: &[ApplicantRow],
    records: &[StudentRecord],
    count_active_only: bool,
) -> Result<Vec<IntakeRow>, IntakeError> {
    let mut current: HashMap<&str, u64> = HashMap::new();
    for record in records {
        if count_active_only && record.status != StatusCategory::Active {
            continue;
        }
        *current.entry(record.country.as_str()).or_insert(0) += 1;
    }

    let mut by_country: BTreeMap<&str, u64> = BTreeMap::new();
    for row in applicants {
        let total = by_country.entry(row.country.as_str()).or_insert(0);
        *total = total.saturating_add(row.applicants);
    }

    let rows: Vec<IntakeRow> = by_country
        .into_iter()
        .filter(|(_, applicants)| *applicants > 0)
        .map(|(country, applicants)| IntakeRow {
            country: country.to_string(),
            continent: country_to_continent(country),
            applicants,
            current: current.get(country).copied().unwrap_or(0),
        })
        .collect();

    if rows.is_empty() {
        warn!(uploaded = applicants.len(), "no applicant rows with a positive count");
        return Err(IntakeError::NoValidRows);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Continent;

    fn row(country: &str, applicants: u64, current: u64) -> IntakeRow {
        IntakeRow {
            country: country.to_string(),
            continent: Continent::Undefined,
            applicants,
            current,
        }
    }

    fn params(seats: u64) -> AllocationParams {
        AllocationParams {
            seats,
            min_per_country: 0,
            max_seat_share: 1.0,
            max_post_share: 1.0,
        }
    }

    fn admits(results: &[AllocationResult], country: &str) -> u64 {
        results
            .iter()
            .find(|r| r.country == country)
            .map(|r| r.target_admits)
            .expect("country present")
    }

    #[test]
    fn under_represented_country_gets_the_top_up() {
        let rows = vec![row("A", 70, 10), row("B", 30, 90)];
        let results = allocate(&rows, &params(100));

        assert_eq!(results[0].country, "A");
        assert_eq!(results[0].target_admits, 100);
        assert_eq!(results[0].post_total, 110);
        assert_eq!(results[1].target_admits, 0);
        assert_eq!(results[1].post_total, 90);
        assert!((results[0].post_share - 0.55).abs() < 1e-12);
        assert!((results[1].post_share - 0.45).abs() < 1e-12);
    }

    #[test]
    fn zero_seats_is_degenerate() {
        let rows = vec![row("A", 70, 10), row("B", 30, 90)];
        for r in allocate(&rows, &params(0)) {
            assert_eq!(r.target_admits, 0);
            assert_eq!(r.post_total, r.current);
            assert_eq!(r.post_share, 0.0);
            assert_eq!(r.target_weight, 0.0);
        }
    }

    #[test]
    fn zero_applicant_rows_are_dropped() {
        let rows = vec![row("A", 5, 0), row("B", 0, 3)];
        let results = allocate(&rows, &params(10));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].target_admits, 10);
        assert!((results[0].target_weight - 1.0).abs() < 1e-12);
    }

    #[test]
    fn leftovers_follow_largest_remainder() {
        // Needs 1/3 each of 10 seats: floors 3,3,3 and one leftover.
        let rows = vec![row("A", 1, 0), row("B", 1, 0), row("C", 1, 0)];
        let results = allocate(&rows, &params(10));
        let total: u64 = results.iter().map(|r| r.target_admits).sum();
        assert_eq!(total, 10);
        let mut counts: Vec<u64> = results.iter().map(|r| r.target_admits).collect();
        counts.sort_unstable();
        assert_eq!(counts, vec![3, 3, 4]);
    }

    #[test]
    fn over_represented_country_gets_nothing() {
        // grand = 1010: A's ideal is 606 (need 106), B's is 404 (below 500).
        let rows = vec![row("A", 60, 500), row("B", 40, 500)];
        let results = allocate(&rows, &params(10));
        assert_eq!(admits(&results, "A"), 10);
        assert_eq!(admits(&results, "B"), 0);
    }

    #[test]
    fn seat_cap_limits_each_country() {
        let rows = vec![row("A", 90, 0), row("B", 10, 0)];
        let mut p = params(100);
        p.max_seat_share = 0.5;
        let results = allocate(&rows, &p);
        assert_eq!(admits(&results, "A"), 50);
        assert_eq!(admits(&results, "B"), 50);
    }

    #[test]
    fn caps_can_leave_seats_unallocated() {
        let rows = vec![row("A", 90, 0), row("B", 10, 0)];
        let mut p = params(100);
        p.max_seat_share = 0.3;
        let results = allocate(&rows, &p);
        assert_eq!(admits(&results, "A"), 30);
        assert_eq!(admits(&results, "B"), 30);
    }

    #[test]
    fn post_share_cap_accounts_for_current_enrollment() {
        // grand = 100 + 100; A may reach at most 0.5 * 200 = 100 students.
        let rows = vec![row("A", 80, 80), row("B", 20, 20)];
        let mut p = params(100);
        p.max_post_share = 0.5;
        let results = allocate(&rows, &p);
        assert_eq!(admits(&results, "A"), 20);
        assert!(results.iter().all(|r| r.post_total <= 100));
    }

    #[test]
    fn minimum_is_honored_when_caps_allow() {
        let rows = vec![row("A", 97, 0), row("B", 2, 0), row("C", 1, 0)];
        let mut p = params(20);
        p.min_per_country = 3;
        let results = allocate(&rows, &p);
        assert_eq!(results.iter().map(|r| r.target_admits).sum::<u64>(), 20);
        assert!(results.iter().all(|r| r.target_admits >= 3));
        assert_eq!(admits(&results, "A"), 14);
    }

    #[test]
    fn cap_wins_over_minimum() {
        // post limit = floor(0.5 * 20) = 10; B already has 10 students.
        let rows = vec![row("A", 50, 0), row("B", 50, 10)];
        let mut p = params(10);
        p.min_per_country = 2;
        p.max_post_share = 0.5;
        let results = allocate(&rows, &p);
        assert_eq!(admits(&results, "B"), 0);
        assert_eq!(admits(&results, "A"), 10);
    }

    #[test]
    fn minimums_above_budget_never_exceed_seats() {
        let rows: Vec<IntakeRow> = (0..6).map(|i| row(&format!("C{}", i), 10, 0)).collect();
        let mut p = params(4);
        p.min_per_country = 1;
        let results = allocate(&rows, &p);
        assert_eq!(results.iter().map(|r| r.target_admits).sum::<u64>(), 4);
    }

    #[test]
    fn large_capped_budget_fills_every_open_seat() {
        let rows = vec![row("A", 90, 0), row("B", 10, 0)];
        let mut p = params(4_000_000);
        p.max_seat_share = 0.6;
        let results = allocate(&rows, &p);

        assert_eq!(admits(&results, "A"), 2_400_000);
        assert_eq!(admits(&results, "B"), 1_600_000);
        assert_eq!(results.iter().map(|r| r.target_admits).sum::<u64>(), 4_000_000);
    }

    #[test]
    fn large_minimums_are_trimmed_to_budget() {
        let rows = vec![row("A", 5, 0), row("B", 3, 0), row("C", 2, 0)];
        let mut p = params(3_000_000);
        p.min_per_country = 2_000_000;
        let results = allocate(&rows, &p);
        assert_eq!(results.iter().map(|r| r.target_admits).sum::<u64>(), 3_000_000);
    }

    #[test]
    fn huge_applicant_counts_saturate_instead_of_overflowing() {
        let data = "country,applicants\nمصري,1e19\nEgypt,1e19\nيمني,1e19\n";
        let applicants = read_applicants(data.as_bytes()).expect("read");
        let intake = build_intake_rows(&applicants, &[], true).expect("intake");

        let egypt = intake.iter().find(|r| r.country == "مصر").expect("egypt");
        assert_eq!(egypt.applicants, u64::MAX);

        let results = allocate(&intake, &params(10));
        assert_eq!(results.iter().map(|r| r.target_admits).sum::<u64>(), 10);
        let weights: f64 = results.iter().map(|r| r.target_weight).sum();
        assert!((weights - 1.0).abs() < 1e-9);
        assert!((herfindahl_index(&[u64::MAX, u64::MAX]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn results_are_sorted_by_admits() {
        let rows = vec![row("A", 1, 0), row("B", 5, 0), row("C", 3, 0)];
        let results = allocate(&rows, &params(9));
        let admits: Vec<u64> = results.iter().map(|r| r.target_admits).collect();
        let mut sorted = admits.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(admits, sorted);
    }

    #[test]
    fn herfindahl_bounds() {
        assert_eq!(herfindahl_index(&[]), 0.0);
        assert_eq!(herfindahl_index(&[0, 0]), 0.0);
        assert!((herfindahl_index(&[10]) - 1.0).abs() < 1e-12);
        assert!((herfindahl_index(&[5, 5, 5, 5]) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn applicant_table_is_normalized_and_coerced() {
        let data = "Country,Applicants\nمصري,12\nEgypt,3\nيمني,abc\n,4\nتونسي,-2\nأردني,7.9\n";
        let rows = read_applicants(data.as_bytes()).expect("read");
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].country, "مصر");
        assert_eq!(rows[1].country, "مصر");
        assert_eq!(rows[2].applicants, 0);
        assert_eq!(rows[3].country, crate::models::UNDEFINED);
        assert_eq!(rows[4].applicants, 0);
        assert_eq!(rows[5].applicants, 7);
    }

    #[test]
    fn applicant_table_without_counts_is_rejected() {
        let data = "country,notes\nمصري,x\n";
        match read_applicants(data.as_bytes()) {
            Err(IntakeError::MissingColumn { column }) => assert_eq!(column, "applicants"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn missing_applicant_file_is_an_io_error() {
        assert!(matches!(
            read_applicants_file("no/such/applicants.csv"),
            Err(IntakeError::Io { .. })
        ));
    }

    #[test]
    fn intake_joins_current_enrollment() {
        let applicants = vec![
            ApplicantRow { country: "مصر".into(), applicants: 12 },
            ApplicantRow { country: "مصر".into(), applicants: 3 },
            ApplicantRow { country: "اليمن".into(), applicants: 0 },
            ApplicantRow { country: "تونس".into(), applicants: 4 },
        ];
        let mut active = crate::records::build_record(&crate::models::RawStudentRow {
            nationality: Some("مصري".into()),
            status: Some("متابع".into()),
            ..Default::default()
        });
        let mut graduated = active.clone();
        graduated.status = StatusCategory::Graduated;
        active.student_id = Some("1".into());

        let records = vec![active, graduated];
        let rows = build_intake_rows(&applicants, &records, true).expect("rows");
        assert_eq!(rows.len(), 2);
        let egypt = rows.iter().find(|r| r.country == "مصر").expect("egypt");
        assert_eq!(egypt.applicants, 15);
        assert_eq!(egypt.current, 1);
        assert_eq!(egypt.continent, Continent::Africa);

        let rows = build_intake_rows(&applicants, &records, false).expect("rows");
        let egypt = rows.iter().find(|r| r.country == "مصر").expect("egypt");
        assert_eq!(egypt.current, 2);
        let tunisia = rows.iter().find(|r| r.country == "تونس").expect("tunisia");
        assert_eq!(tunisia.current, 0);
    }

    #[test]
    fn intake_without_positive_rows_is_rejected() {
        let applicants = vec![ApplicantRow { country: "مصر".into(), applicants: 0 }];
        assert!(matches!(
            build_intake_rows(&applicants, &[], true),
            Err(IntakeError::NoValidRows)
        ));
    }
}
