pub mod csv_file;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::supply::GeneratorRecord;

pub use csv_file::CsvRecordSource;

#[derive(Error, Debug)]
pub enum RecordsError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Client for an upstream service serving offer-curve snapshots as JSON
pub struct RecordsClient {
    client: Client,
    base_url: String,
}

impl RecordsClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RecordsError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch generator records for one interval (or the latest snapshot)
    pub async fn fetch_offer_curves(
        &self,
        interval: Option<DateTime<Utc>>,
    ) -> Result<Vec<GeneratorRecord>, RecordsError> {
        let url = match interval {
            Some(interval) => format!(
                "{}/offer-curves?interval={}",
                self.base_url,
                interval.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            None => format!("{}/offer-curves", self.base_url),
        };

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(%url, %status, "Upstream rejected offer-curve request");
            return Err(RecordsError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let raw: Vec<serde_json::Value> = serde_json::from_str(&body)?;
        let received = raw.len();
        let records: Vec<GeneratorRecord> = raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(index, error = %e, "Dropping undecodable offer-curve record");
                    None
                }
            })
            .collect();
        debug!(%url, received, count = records.len(), "Fetched offer curves");

        Ok(records)
    }
}

/// Where generator records come from
pub enum RecordSource {
    Csv(CsvRecordSource),
    Http(RecordsClient),
}

impl RecordSource {
    pub async fn fetch(
        &self,
        interval: Option<DateTime<Utc>>,
    ) -> Result<Vec<GeneratorRecord>, RecordsError> {
        match self {
            Self::Csv(source) => source.load(interval).await,
            Self::Http(client) => client.fetch_offer_curves(interval).await,
        }
    }
}

/// Parse an interval timestamp: RFC 3339, or `YYYY-MM-DD HH:MM[:SS]` taken as UTC.
pub fn parse_interval(timestamp: &str) -> Result<DateTime<Utc>, RecordsError> {
    let trimmed = timestamp.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| chrono::NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| RecordsError::InvalidTimestamp(timestamp.to_string()))
}
