pub mod builder;
pub mod clearing;
pub mod resource;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

pub use builder::{BuilderConfig, MissingIdentityPolicy, ScheduleRequirement, SupplyCurveBuilder};
pub use clearing::{ClearingOutcome, ClearingResult};
pub use resource::{Color, ResourceCategory};

/// Identifier substituted for a missing resource name or type
pub const PLACEHOLDER_IDENTITY: &str = "UNKNOWN";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SupplyError {
    #[error("Invalid demand: {0} MW")]
    InvalidDemand(f64),
    #[error("Malformed offer curve for {resource} at point {index}: {reason}")]
    MalformedCurve {
        resource: String,
        index: usize,
        reason: String,
    },
}

/// One generating unit for a single market interval, as delivered by the data store.
///
/// `offer_curve` keeps the raw `[cumulative_mw, price]` pairs. A null curve is
/// empty, null or non-numeric fields become NaN and a non-list point becomes an
/// empty point, so the builder counts them as malformed. A missing status is
/// empty and treated as unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorRecord {
    pub resource_name: Option<String>,
    pub resource_type: Option<String>,
    #[serde(default)]
    pub operating_status: String,
    #[serde(default, deserialize_with = "lenient_curve")]
    pub offer_curve: Vec<Vec<f64>>,
    pub output_schedule: Option<f64>,
}

fn lenient_curve<'de, D>(deserializer: D) -> Result<Vec<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;

    Ok(raw
        .unwrap_or_default()
        .iter()
        .map(|point| match point {
            Value::Array(fields) => fields
                .iter()
                .map(|v| v.as_f64().unwrap_or(f64::NAN))
                .collect(),
            _ => Vec::new(),
        })
        .collect())
}

impl GeneratorRecord {
    pub fn new(
        resource_name: impl Into<String>,
        resource_type: impl Into<String>,
        operating_status: impl Into<String>,
        offer_curve: &[(f64, f64)],
        output_schedule: Option<f64>,
    ) -> Self {
        Self {
            resource_name: Some(resource_name.into()),
            resource_type: Some(resource_type.into()),
            operating_status: operating_status.into(),
            offer_curve: offer_curve.iter().map(|&(mw, price)| vec![mw, price]).collect(),
            output_schedule,
        }
    }
}

/// A validated step of an offer curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OfferPoint {
    pub cumulative_mw: f64,
    pub price: f64,
}

impl OfferPoint {
    /// Validate a raw curve point against the cumulative MW reached so far.
    pub fn parse(
        raw: &[f64],
        prev_mw: f64,
        resource: &str,
        index: usize,
    ) -> Result<Self, SupplyError> {
        let malformed = |reason: String| SupplyError::MalformedCurve {
            resource: resource.to_string(),
            index,
            reason,
        };

        let [cumulative_mw, price] = raw else {
            return Err(malformed(format!("expected 2 fields, got {}", raw.len())));
        };
        let (cumulative_mw, price) = (*cumulative_mw, *price);

        if !cumulative_mw.is_finite() || !price.is_finite() {
            return Err(malformed("non-finite value".to_string()));
        }
        if cumulative_mw < 0.0 {
            return Err(malformed(format!("negative cumulative MW {cumulative_mw}")));
        }
        if cumulative_mw < prev_mw {
            return Err(malformed(format!(
                "cumulative MW decreased from {prev_mw} to {cumulative_mw}"
            )));
        }

        Ok(Self {
            cumulative_mw,
            price,
        })
    }
}

/// A positive-width, single-price block of capacity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSegment {
    pub mw: f64,
    pub price: f64,
    pub resource_name: String,
    pub resource_type: String,
    pub category: ResourceCategory,
}

/// A segment placed on the merit-order stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyCurvePoint {
    #[serde(flatten)]
    pub segment: PriceSegment,
    pub cumulative_capacity_start: f64,
    pub cumulative_capacity_end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceTypeSummary {
    pub capacity: f64,
    /// Cheapest dispatched price seen for the type
    pub marginal_cost: f64,
    pub category: ResourceCategory,
    pub color: Color,
}

/// Data-quality counters for one build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    pub records_seen: usize,
    pub records_used: usize,
    pub skipped_status: usize,
    pub skipped_missing_identity: usize,
    pub placeholder_identity: usize,
    pub skipped_missing_schedule: usize,
    pub skipped_zero_schedule: usize,
    pub malformed_curves: usize,
    pub truncated_renewables: usize,
}

/// Output of [`SupplyCurveBuilder::build`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplyCurve {
    pub points: Vec<SupplyCurvePoint>,
    pub resource_types: BTreeMap<String, ResourceTypeSummary>,
    pub total_capacity: f64,
    pub stats: FilterStats,
}

impl SupplyCurve {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Lowest and highest segment price
    pub fn price_range(&self) -> Option<(f64, f64)> {
        let first = self.points.first()?.segment.price;
        let last = self.points.last()?.segment.price;
        Some((first, last))
    }

    /// Capacity emitted for one named resource
    pub fn capacity_of(&self, resource_name: &str) -> f64 {
        self.points
            .iter()
            .filter(|p| p.segment.resource_name == resource_name)
            .map(|p| p.segment.mw)
            .sum()
    }
}
