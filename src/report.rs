use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;

use crate::geography::country_display_name;
use crate::models::{AllocationResult, RawStudentRow, StudentRecord};

/// Exportable fields of a [`StudentRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    StudentId,
    Name,
    Gender,
    Country,
    Continent,
    Program,
    College,
    Status,
    StatusDetail,
    Gpa,
    Hours,
    Funding,
    Level,
    TermAdmit,
    LastTerm,
    AdmitYear,
    LastTermYear,
    AdmitDate,
    LastTermDate,
    Email,
    Mobile,
}

impl Column {
    /// Cell text; missing values are written as empty cells.
    pub fn value(&self, record: &StudentRecord) -> String {
        fn opt<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(ToString::to_string).unwrap_or_default()
        }

        match self {
            Column::StudentId => opt(&record.student_id),
            Column::Name => opt(&record.name),
            Column::Gender => record.gender.to_string(),
            Column::Country => record.country.clone(),
            Column::Continent => record.continent.to_string(),
            Column::Program => record.program.clone(),
            Column::College => record.college.clone(),
            Column::Status => record.status.to_string(),
            Column::StatusDetail => record.status_detail.clone(),
            Column::Gpa => opt(&record.gpa),
            Column::Hours => opt(&record.hours),
            Column::Funding => record.funding.clone(),
            Column::Level => record.level.clone(),
            Column::TermAdmit => opt(&record.term_admit),
            Column::LastTerm => opt(&record.last_term),
            Column::AdmitYear => opt(&record.admit_year),
            Column::LastTermYear => opt(&record.last_term_year),
            Column::AdmitDate => opt(&record.admit_date),
            Column::LastTermDate => opt(&record.last_term_date),
            Column::Email => opt(&record.email),
            Column::Mobile => opt(&record.mobile),
        }
    }
}

/// Column order and headers of the exported student table.
pub const DEFAULT_EXPORT_COLUMNS: &[(Column, &str)] = &[
    (Column::StudentId, "الرقم الجامعي"),
    (Column::Name, "الاسم"),
    (Column::Country, "الدولة"),
    (Column::Program, "التخصص"),
    (Column::College, "الكلية"),
    (Column::Status, "الحالة المختصرة"),
    (Column::StatusDetail, "تفاصيل الحالة"),
    (Column::Gpa, "المعدل التراكمي"),
    (Column::Hours, "الساعات المكتسبة"),
    (Column::Funding, "نوع المنحة"),
    (Column::TermAdmit, "فصل القبول (هجري)"),
    (Column::LastTerm, "آخر فصل (هجري)"),
    (Column::AdmitYear, "سنة القبول"),
    (Column::LastTermYear, "سنة آخر فصل"),
    (Column::Email, "البريد الإلكتروني"),
    (Column::Mobile, "الجوال"),
];

pub fn write_records_csv(
    path: &Path,
    records: &[&StudentRecord],
    columns: &[(Column, &str)],
) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(columns.iter().map(|(_, label)| *label))?;
    for record in records {
        writer.write_record(columns.iter().map(|(column, _)| column.value(record)))?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_allocation_csv(path: &Path, results: &[AllocationResult]) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record([
        "Country",
        "Country_EN",
        "Continent",
        "Applicants",
        "Current",
        "Target_Weight",
        "Target_Admits",
        "Post_Total",
        "Post_Share",
    ])?;

    for row in results {
        writer.write_record(&[
            row.country.clone(),
            country_display_name(&row.country)
                .map(str::to_string)
                .unwrap_or_else(|| row.country.clone()),
            row.continent.to_string(),
            row.applicants.to_string(),
            row.current.to_string(),
            format!("{:.4}", row.target_weight),
            row.target_admits.to_string(),
            row.post_total.to_string(),
            format!("{:.4}", row.post_share),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_density_csv(path: &Path, xs: &[f64], ys: &[f64]) -> Result<()> {
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(["GPA", "Density"])?;
    for (x, y) in xs.iter().zip(ys) {
        writer.write_record(&[x.to_string(), y.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}

const UNIQUE_VALUE_COLUMNS: &[&str] = &[
    "LAST_STST",
    "CELG_CODE",
    "LAST_TERM",
    "CITZ_DESC",
    "MAJR_DESC",
    "COLL_DESC",
];

fn raw_field<'a>(row: &'a RawStudentRow, column: &str) -> Option<&'a str> {
    match column {
        "LAST_STST" => row.status.as_deref(),
        "CELG_CODE" => row.funding.as_deref(),
        "LAST_TERM" => row.last_term.as_deref(),
        "CITZ_DESC" => row.nationality.as_deref(),
        "MAJR_DESC" => row.program.as_deref(),
        "COLL_DESC" => row.college.as_deref(),
        _ => None,
    }
}

/// Distinct raw values of the descriptive columns, for building lookup tables.
pub fn unique_values_report(source: &str, rows: &[RawStudentRow]) -> String {
    let mut content = String::new();
    content.push_str("DATA DESCRIPTION REPORT\n");
    content.push_str("=======================\n");
    content.push_str(&format!("Source File: {}\n", source));
    content.push_str(&format!(
        "Content: Unique values for columns {}.\n\n",
        UNIQUE_VALUE_COLUMNS.join(", ")
    ));

    for column in UNIQUE_VALUE_COLUMNS {
        let values: BTreeSet<&str> = rows.iter().filter_map(|r| raw_field(r, column)).collect();

        content.push_str(&format!("COLUMN: {}\n", column));
        content.push_str(&format!("Count: {} unique values\n", values.len()));
        content.push_str(&"-".repeat(30));
        content.push('\n');
        for value in values {
            content.push_str(value);
            content.push('\n');
        }
        content.push('\n');
        content.push_str(&"=".repeat(50));
        content.push_str("\n\n");
    }

    content
}
