use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::LoadError;
use crate::models::{RawStudentRow, StudentRecord};
use crate::records::build_records;

/// Columns the roster must carry; the rest default to null when absent.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "STD_ID",
    "GENDER",
    "CITZ_DESC",
    "MAJR_DESC",
    "COLL_DESC",
    "LAST_STST",
];

pub struct RosterLoader {
    client: reqwest::Client,
}

impl Default for RosterLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl RosterLoader {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Vec<RawStudentRow>, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| LoadError::from_io(path, e))?;
        let rows = parse_roster(file)?;
        info!(path = %path.display(), rows = rows.len(), "loaded roster");
        Ok(rows)
    }

    pub async fn fetch_url(&self, url: &str) -> Result<Vec<RawStudentRow>, LoadError> {
        debug!(url, "fetching roster");

        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(30))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LoadError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await?;
        let rows = parse_roster(body.as_ref())?;
        info!(url, rows = rows.len(), "downloaded roster");
        Ok(rows)
    }

    /// Reads and normalizes in one step; a load failure yields no records.
    pub fn load_records(&self, path: impl AsRef<Path>) -> Result<Vec<StudentRecord>, LoadError> {
        Ok(build_records(&self.load_file(path)?))
    }
}

/// Parses a roster table with a header row. Empty cells become `None`.
pub fn parse_roster<R: Read>(reader: R) -> Result<Vec<RawStudentRow>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h.trim_start_matches('\u{feff}').trim() == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns { missing });
    }

    let mut rows = Vec::new();
    for result in reader.deserialize::<RawStudentRow>() {
        rows.push(result?);
    }
    Ok(rows)
}
