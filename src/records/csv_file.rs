use chrono::{DateTime, Utc};
use csv::StringRecord;
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::records::{RecordsError, parse_interval};
use crate::supply::GeneratorRecord;

/// Offer-curve snapshot stored as CSV.
///
/// Expected header columns (by name):
/// - resource_name
/// - resource_type
/// - telemetered_resource_status (or operating_status)
/// - sced_tpo_offer_curve (or offer_curve): `[[mw, price], ...]`
/// - output_schedule (optional)
/// - interval_start_utc (optional)
pub struct CsvRecordSource {
    path: PathBuf,
}

impl CsvRecordSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(
        &self,
        interval: Option<DateTime<Utc>>,
    ) -> Result<Vec<GeneratorRecord>, RecordsError> {
        let contents = tokio::fs::read(&self.path).await?;
        let records = parse_records(contents.as_slice(), interval)?;
        debug!(path = %self.path.display(), count = records.len(), "Loaded offer curves");
        Ok(records)
    }
}

struct Columns {
    name: Option<usize>,
    resource_type: Option<usize>,
    status: Option<usize>,
    curve: Option<usize>,
    schedule: Option<usize>,
    interval: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Self {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };

        Self {
            name: find(&["resource_name"]),
            resource_type: find(&["resource_type"]),
            status: find(&["telemetered_resource_status", "operating_status"]),
            curve: find(&["sced_tpo_offer_curve", "offer_curve"]),
            schedule: find(&["output_schedule"]),
            interval: find(&["interval_start_utc"]),
        }
    }
}

fn cell(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parse an offer-curve cell such as `[[100.0, 20.0], [200.0, 35.0]]`.
///
/// Tuple-style literals are accepted. An unreadable cell becomes a single
/// zero-field point so the builder reports the curve as malformed.
fn parse_offer_curve(raw: &str, resource: &str) -> Vec<Vec<f64>> {
    let normalized = raw.replace('(', "[").replace(')', "]");

    match serde_json::from_str::<Vec<Vec<f64>>>(&normalized) {
        Ok(curve) => curve,
        Err(e) => {
            warn!(resource, error = %e, "Unreadable offer curve");
            vec![Vec::new()]
        }
    }
}

pub fn parse_records<R: Read>(
    reader: R,
    interval: Option<DateTime<Utc>>,
) -> Result<Vec<GeneratorRecord>, RecordsError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let columns = Columns::locate(rdr.headers()?);
    if columns.status.is_none() {
        warn!("No operating status column; every row will be treated as unavailable");
    }
    let mut records = Vec::new();

    for (line, result) in rdr.records().enumerate() {
        let row = result?;

        if let Some(wanted) = interval {
            let row_interval = cell(&row, columns.interval).map(parse_interval);
            match row_interval {
                Some(Ok(ts)) if ts == wanted => {}
                Some(Err(e)) => {
                    warn!(line = line + 2, error = %e, "Skipping row with bad interval");
                    continue;
                }
                _ => continue,
            }
        }

        let resource_name = cell(&row, columns.name).map(str::to_string);
        let label = resource_name.as_deref().unwrap_or("<unnamed>");

        let offer_curve = cell(&row, columns.curve)
            .map(|raw| parse_offer_curve(raw, label))
            .unwrap_or_default();

        let output_schedule = cell(&row, columns.schedule).and_then(|raw| match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(resource = label, value = raw, "Unreadable output schedule");
                None
            }
        });

        records.push(GeneratorRecord {
            resource_type: cell(&row, columns.resource_type).map(str::to_string),
            operating_status: cell(&row, columns.status).unwrap_or_default().to_string(),
            offer_curve,
            output_schedule,
            resource_name,
        });
    }

    Ok(records)
}
