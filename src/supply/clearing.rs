use serde::Serialize;
use std::collections::BTreeMap;

use crate::supply::{SupplyCurve, SupplyError};

/// Dispatch of a cleared market
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClearingResult {
    pub demand: f64,
    pub clearing_price: f64,
    pub marginal_resource_type: String,
    pub marginal_resource_name: String,
    pub dispatched_capacity_by_type: BTreeMap<String, f64>,
    /// Capacity-weighted cost of the dispatched MW; `None` when nothing is dispatched
    pub avg_dispatched_cost: Option<f64>,
}

/// Result of intersecting a demand quantity with the supply curve
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClearingOutcome {
    Cleared(ClearingResult),
    /// Demand exceeds every MW on offer, so no clearing price exists
    Shortfall {
        demand: f64,
        total_capacity: f64,
        unserved: f64,
    },
}

impl ClearingOutcome {
    pub fn clearing_price(&self) -> Option<f64> {
        match self {
            ClearingOutcome::Cleared(result) => Some(result.clearing_price),
            ClearingOutcome::Shortfall { .. } => None,
        }
    }

    pub fn demand(&self) -> f64 {
        match self {
            ClearingOutcome::Cleared(result) => result.demand,
            ClearingOutcome::Shortfall { demand, .. } => *demand,
        }
    }

    pub fn is_shortfall(&self) -> bool {
        matches!(self, ClearingOutcome::Shortfall { .. })
    }
}

impl SupplyCurve {
    /// Demand as a fraction of the total offered capacity
    pub fn demand_at_load_factor(&self, load_factor: f64) -> f64 {
        self.total_capacity * load_factor
    }

    /// Find the marginal segment serving `demand` MW.
    pub fn clear(&self, demand: f64) -> Result<ClearingOutcome, SupplyError> {
        if !demand.is_finite() || demand < 0.0 {
            return Err(SupplyError::InvalidDemand(demand));
        }

        let Some(marginal) = self
            .points
            .iter()
            .position(|p| p.cumulative_capacity_end >= demand)
        else {
            return Ok(ClearingOutcome::Shortfall {
                demand,
                total_capacity: self.total_capacity,
                unserved: demand - self.total_capacity,
            });
        };

        let (dispatched_capacity_by_type, dispatched_mw, dispatched_cost) = self.points
            [..=marginal]
            .iter()
            .map(|p| {
                let mw = (demand - p.cumulative_capacity_start).min(p.segment.mw);
                (p, mw)
            })
            .fold(
                (BTreeMap::new(), 0.0, 0.0),
                |(mut by_type, total_mw, total_cost), (p, mw)| {
                    *by_type
                        .entry(p.segment.resource_type.clone())
                        .or_insert(0.0) += mw;
                    (by_type, total_mw + mw, total_cost + mw * p.segment.price)
                },
            );

        let segment = &self.points[marginal].segment;

        Ok(ClearingOutcome::Cleared(ClearingResult {
            demand,
            clearing_price: segment.price,
            marginal_resource_type: segment.resource_type.clone(),
            marginal_resource_name: segment.resource_name.clone(),
            dispatched_capacity_by_type,
            avg_dispatched_cost: (dispatched_mw > 0.0).then(|| dispatched_cost / dispatched_mw),
        }))
    }
}
