use std::fmt;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// Sentinel used for every categorical field that has no usable value.
pub const UNDEFINED: &str = "غير محدد";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data_source_mode: DataSourceMode,
    pub data_file: Option<String>,
    pub data_url: Option<String>,
    pub output_directory: Option<String>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub planner: PlannerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSourceMode {
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "internet")]
    Internet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub seats: u64,
    pub min_per_country: u64,
    pub max_seat_share: f64,
    pub max_post_share: f64,
    /// Count only `Active` students as current enrollment.
    pub count_active_only: bool,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            seats: 100,
            min_per_country: 0,
            max_seat_share: 1.0,
            max_post_share: 1.0,
            count_active_only: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_source_mode: DataSourceMode::Local,
            data_file: Some("data/data.csv".to_string()),
            data_url: None,
            output_directory: Some("output".to_string()),
            log_filter: default_log_filter(),
            planner: PlannerConfig::default(),
        }
    }
}

impl Config {
    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read config: {}", file_path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", file_path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, file_path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(file_path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let planner = &self.planner;
        for (name, share) in [
            ("max_seat_share", planner.max_seat_share),
            ("max_post_share", planner.max_post_share),
        ] {
            if !(share > 0.0 && share <= 1.0) {
                bail!("planner.{} must be in (0, 1], got {}", name, share);
            }
        }
        if self.data_source_mode == DataSourceMode::Internet
            && self.data_url.as_deref().map_or(true, |u| u.trim().is_empty())
        {
            bail!("data_url is required when data_source_mode = \"internet\"");
        }
        Ok(())
    }

    pub fn data_file(&self) -> &str {
        self.data_file.as_deref().unwrap_or("data/data.csv")
    }

    pub fn output_directory(&self) -> &str {
        self.output_directory.as_deref().unwrap_or("output")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Undefined,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "ذكر",
            Gender::Female => "أنثى",
            Gender::Undefined => UNDEFINED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusCategory {
    Active,
    Graduated,
    Inactive,
    Undefined,
}

impl StatusCategory {
    pub fn label(&self) -> &'static str {
        match self {
            StatusCategory::Active => "نشط",
            StatusCategory::Graduated => "متخرج",
            StatusCategory::Inactive => "غير نشط",
            StatusCategory::Undefined => UNDEFINED,
        }
    }

    /// Accepts the English variant name or the local label.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        [
            StatusCategory::Active,
            StatusCategory::Graduated,
            StatusCategory::Inactive,
            StatusCategory::Undefined,
        ]
        .into_iter()
        .find(|s| s.label() == value || format!("{:?}", s).eq_ignore_ascii_case(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Continent {
    Asia,
    Europe,
    Africa,
    NorthAmerica,
    SouthAmerica,
    Australia,
    Undefined,
}

impl Continent {
    pub fn label(&self) -> &'static str {
        match self {
            Continent::Asia => "آسيا",
            Continent::Europe => "أوروبا",
            Continent::Africa => "أفريقيا",
            Continent::NorthAmerica => "أمريكا الشمالية",
            Continent::SouthAmerica => "أمريكا الجنوبية",
            Continent::Australia => "أستراليا",
            Continent::Undefined => UNDEFINED,
        }
    }
}

macro_rules! display_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_label!(Gender, StatusCategory, Continent);

/// One row of the source table, exactly as exported from the registrar.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawStudentRow {
    #[serde(rename = "STD_ID")]
    pub student_id: Option<String>,
    #[serde(rename = "STD_NAME")]
    pub name: Option<String>,
    #[serde(rename = "GENDER")]
    pub gender: Option<String>,
    #[serde(rename = "CITZ_DESC")]
    pub nationality: Option<String>,
    #[serde(rename = "MAJR_DESC")]
    pub program: Option<String>,
    #[serde(rename = "COLL_DESC")]
    pub college: Option<String>,
    #[serde(rename = "LAST_STST")]
    pub status: Option<String>,
    #[serde(rename = "CELG_CODE")]
    pub funding: Option<String>,
    #[serde(rename = "STD_GPA")]
    pub gpa: Option<String>,
    #[serde(rename = "STD_HRS")]
    pub hours: Option<String>,
    #[serde(rename = "TERM_ADMIT")]
    pub term_admit: Option<String>,
    #[serde(rename = "LAST_TERM")]
    pub last_term: Option<String>,
    #[serde(rename = "LEVL_DESC")]
    pub level: Option<String>,
    #[serde(rename = "EMAIL")]
    pub email: Option<String>,
    #[serde(rename = "MOBILE")]
    pub mobile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    pub student_id: Option<String>,
    pub name: Option<String>,
    pub gender: Gender,
    pub country: String,
    pub continent: Continent,
    pub program: String,
    pub college: String,
    pub status_detail: String,
    pub status: StatusCategory,
    pub funding: String,
    pub level: String,
    pub gpa: Option<f64>,
    pub hours: Option<f64>,
    pub term_admit: Option<String>,
    pub last_term: Option<String>,
    pub admit_year: Option<i32>,
    pub last_term_year: Option<i32>,
    pub timeline_year: Option<i32>,
    pub admit_date: Option<String>,
    pub last_term_date: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
}

/// Planner input: one row per distinct canonical country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeRow {
    pub country: String,
    pub continent: Continent,
    pub applicants: u64,
    pub current: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationResult {
    pub country: String,
    pub continent: Continent,
    pub applicants: u64,
    pub current: u64,
    pub target_weight: f64,
    pub target_admits: u64,
    pub post_total: u64,
    pub post_share: f64,
}

/// Coerces a free-text cell to a finite number; anything else is `None`.
pub fn parse_numeric(value: Option<&str>) -> Option<f64> {
    value?
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_coercion_is_soft() {
        assert_eq!(parse_numeric(Some(" 3.25 ")), Some(3.25));
        assert_eq!(parse_numeric(Some("4,5")), Some(4.5));
        assert_eq!(parse_numeric(Some("n/a")), None);
        assert_eq!(parse_numeric(Some("NaN")), None);
        assert_eq!(parse_numeric(None), None);
    }

    #[test]
    fn status_parse_accepts_both_spellings() {
        assert_eq!(StatusCategory::parse("active"), Some(StatusCategory::Active));
        assert_eq!(StatusCategory::parse("متخرج"), Some(StatusCategory::Graduated));
        assert_eq!(StatusCategory::parse("unknown"), None);
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).expect("serialize");
        let parsed: Config = toml::from_str(&text).expect("parse");
        assert_eq!(parsed.planner.seats, 100);
        assert_eq!(parsed.data_source_mode, DataSourceMode::Local);
        parsed.validate().expect("valid");
    }

    #[test]
    fn partial_planner_table_uses_defaults() {
        let text = "data_source_mode = \"local\"\n\n[planner]\nseats = 40\n";
        let config: Config = toml::from_str(text).expect("parse");
        assert_eq!(config.planner.seats, 40);
        assert_eq!(config.planner.min_per_country, 0);
        assert_eq!(config.planner.max_seat_share, 1.0);
        assert_eq!(config.planner.max_post_share, 1.0);
        assert!(config.planner.count_active_only);
        config.validate().expect("valid");
    }

    #[test]
    fn out_of_range_share_is_rejected() {
        let mut config = Config::default();
        config.planner.max_post_share = 0.0;
        assert!(config.validate().is_err());
    }
}
