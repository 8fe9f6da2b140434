use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

use crate::supply::{
    FilterStats, GeneratorRecord, OfferPoint, PLACEHOLDER_IDENTITY, PriceSegment,
    ResourceCategory, ResourceTypeSummary, SupplyCurve, SupplyCurvePoint,
};

/// What to do with a record that has no resource name or type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingIdentityPolicy {
    #[default]
    Skip,
    /// Keep the record under [`PLACEHOLDER_IDENTITY`]
    Placeholder,
}

/// Which records must carry an output schedule to be dispatched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleRequirement {
    #[default]
    AllResources,
    RenewablesOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub excluded_statuses: Vec<String>,
    /// Resource types truncated at their output schedule
    pub renewable_types: Vec<String>,
    pub missing_identity: MissingIdentityPolicy,
    pub schedule_requirement: ScheduleRequirement,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            excluded_statuses: vec!["OUT".into(), "OFF".into(), "OFFNS".into()],
            renewable_types: vec!["WIND".into(), "PVGR".into()],
            missing_identity: MissingIdentityPolicy::default(),
            schedule_requirement: ScheduleRequirement::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    Status,
    MissingIdentity,
    MissingSchedule,
    ZeroSchedule,
}

#[derive(Debug)]
struct Expansion {
    segments: Vec<PriceSegment>,
    placeholder: bool,
    malformed: bool,
    truncated: bool,
}

#[derive(Debug)]
enum RecordOutcome {
    Skipped(SkipReason),
    Expanded(Expansion),
}

impl FilterStats {
    fn tally(self, outcome: &RecordOutcome) -> Self {
        let mut next = Self {
            records_seen: self.records_seen + 1,
            ..self
        };

        match outcome {
            RecordOutcome::Skipped(SkipReason::Status) => next.skipped_status += 1,
            RecordOutcome::Skipped(SkipReason::MissingIdentity) => {
                next.skipped_missing_identity += 1
            }
            RecordOutcome::Skipped(SkipReason::MissingSchedule) => {
                next.skipped_missing_schedule += 1
            }
            RecordOutcome::Skipped(SkipReason::ZeroSchedule) => next.skipped_zero_schedule += 1,
            RecordOutcome::Expanded(expansion) => {
                next.records_used += 1;
                next.placeholder_identity += usize::from(expansion.placeholder);
                next.malformed_curves += usize::from(expansion.malformed);
                next.truncated_renewables += usize::from(expansion.truncated);
            }
        }

        next
    }
}

fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Turns a snapshot of generator records into a merit-order supply curve.
///
/// The builder holds only configuration, so one instance can serve any number
/// of concurrent requests.
#[derive(Debug, Clone)]
pub struct SupplyCurveBuilder {
    config: BuilderConfig,
    excluded: HashSet<String>,
    renewables: HashSet<String>,
}

impl Default for SupplyCurveBuilder {
    fn default() -> Self {
        Self::new(BuilderConfig::default())
    }
}

impl SupplyCurveBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        let excluded = config.excluded_statuses.iter().map(|s| normalize(s)).collect();
        let renewables = config.renewable_types.iter().map(|s| normalize(s)).collect();

        Self {
            config,
            excluded,
            renewables,
        }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn is_renewable(&self, resource_type: &str) -> bool {
        self.renewables.contains(&normalize(resource_type))
    }

    /// Build the curve from every record whose status is not excluded
    pub fn build(&self, records: &[GeneratorRecord]) -> SupplyCurve {
        self.assemble(records, None)
    }

    /// Build the curve from records whose status is in `allowed` only
    pub fn build_for_statuses<S: AsRef<str>>(
        &self,
        records: &[GeneratorRecord],
        allowed: &[S],
    ) -> SupplyCurve {
        let allowed: HashSet<String> = allowed.iter().map(|s| normalize(s.as_ref())).collect();
        self.assemble(records, Some(&allowed))
    }

    fn assemble(&self, records: &[GeneratorRecord], allowed: Option<&HashSet<String>>) -> SupplyCurve {
        let (segments, stats) = records
            .iter()
            .map(|record| self.evaluate(record, allowed))
            .fold(
                (Vec::new(), FilterStats::default()),
                |(mut segments, stats), outcome| {
                    let stats = stats.tally(&outcome);
                    if let RecordOutcome::Expanded(expansion) = outcome {
                        segments.extend(expansion.segments);
                    }
                    (segments, stats)
                },
            );

        let points = merit_order(segments);
        let resource_types = summarize(&points);
        let total_capacity = points
            .last()
            .map(|p| p.cumulative_capacity_end)
            .unwrap_or(0.0);

        info!(
            records = stats.records_seen,
            used = stats.records_used,
            segments = points.len(),
            total_capacity,
            missing_schedule = stats.skipped_missing_schedule,
            malformed = stats.malformed_curves,
            "Built supply curve"
        );

        SupplyCurve {
            points,
            resource_types,
            total_capacity,
            stats,
        }
    }

    fn evaluate(&self, record: &GeneratorRecord, allowed: Option<&HashSet<String>>) -> RecordOutcome {
        let status = normalize(&record.operating_status);
        // a unit without a reported status is never assumed available
        let status_ok = !status.is_empty()
            && match allowed {
                Some(allowed) => allowed.contains(&status),
                None => !self.excluded.contains(&status),
            };
        if !status_ok {
            debug!(resource = ?record.resource_name, %status, "Skipping unavailable resource");
            return RecordOutcome::Skipped(SkipReason::Status);
        }

        let name = present(record.resource_name.as_ref());
        let resource_type = present(record.resource_type.as_ref());
        let (name, resource_type, placeholder) = match (name, resource_type) {
            (Some(name), Some(resource_type)) => (name, resource_type, false),
            (name, resource_type) => match self.config.missing_identity {
                MissingIdentityPolicy::Skip => {
                    debug!(?name, ?resource_type, "Skipping record without identity");
                    return RecordOutcome::Skipped(SkipReason::MissingIdentity);
                }
                MissingIdentityPolicy::Placeholder => (
                    name.unwrap_or(PLACEHOLDER_IDENTITY),
                    resource_type.unwrap_or(PLACEHOLDER_IDENTITY),
                    true,
                ),
            },
        };

        let renewable = self.is_renewable(resource_type);
        let schedule = record.output_schedule.filter(|s| s.is_finite());

        match schedule {
            None if renewable
                || self.config.schedule_requirement == ScheduleRequirement::AllResources =>
            {
                debug!(resource = name, "Skipping record without output schedule");
                return RecordOutcome::Skipped(SkipReason::MissingSchedule);
            }
            Some(schedule) if renewable && schedule <= 0.0 => {
                debug!(resource = name, schedule, "Skipping idle renewable");
                return RecordOutcome::Skipped(SkipReason::ZeroSchedule);
            }
            _ => {}
        }

        let limit = if renewable { schedule } else { None };
        let mut expansion = expand(&record.offer_curve, name, resource_type, limit);
        expansion.placeholder = placeholder;

        RecordOutcome::Expanded(expansion)
    }
}

/// Walk an offer curve into positive-width segments, stopping at `limit` MW if given.
fn expand(curve: &[Vec<f64>], name: &str, resource_type: &str, limit: Option<f64>) -> Expansion {
    let category = ResourceCategory::classify(resource_type);
    let mut segments = Vec::new();
    let mut prev_mw = 0.0;
    let mut emitted = 0.0;
    let mut malformed = false;
    let mut truncated = false;

    for (index, raw) in curve.iter().enumerate() {
        let point = match OfferPoint::parse(raw, prev_mw, name, index) {
            Ok(point) => point,
            Err(e) => {
                warn!("{e}; ignoring the rest of the curve");
                malformed = true;
                break;
            }
        };

        let width = point.cumulative_mw - prev_mw;
        prev_mw = point.cumulative_mw;
        if width <= 0.0 {
            continue;
        }

        let mw = match limit {
            Some(limit) => width.min(limit - emitted),
            None => width,
        };
        truncated |= mw < width;
        emitted += mw;

        segments.push(PriceSegment {
            mw,
            price: point.price,
            resource_name: name.to_string(),
            resource_type: resource_type.to_string(),
            category,
        });

        if limit.is_some_and(|limit| emitted >= limit) {
            truncated |= index + 1 < curve.len();
            break;
        }
    }

    Expansion {
        segments,
        placeholder: false,
        malformed,
        truncated,
    }
}

/// Sort segments by price, then width, and stack them.
fn merit_order(segments: Vec<PriceSegment>) -> Vec<SupplyCurvePoint> {
    let mut segments: Vec<PriceSegment> = segments.into_iter().filter(|s| s.mw > 0.0).collect();

    segments.sort_by(|a, b| {
        a.price
            .partial_cmp(&b.price)
            .unwrap_or(Ordering::Equal)
            .then(a.mw.partial_cmp(&b.mw).unwrap_or(Ordering::Equal))
    });

    segments
        .into_iter()
        .scan(0.0, |running, segment| {
            let start = *running;
            *running = start + segment.mw;
            Some(SupplyCurvePoint {
                cumulative_capacity_start: start,
                cumulative_capacity_end: *running,
                segment,
            })
        })
        .collect()
}

fn summarize(points: &[SupplyCurvePoint]) -> BTreeMap<String, ResourceTypeSummary> {
    points.iter().fold(BTreeMap::new(), |mut summary, point| {
        let segment = &point.segment;
        summary
            .entry(segment.resource_type.clone())
            .and_modify(|s: &mut ResourceTypeSummary| s.capacity += segment.mw)
            .or_insert_with(|| ResourceTypeSummary {
                capacity: segment.mw,
                marginal_cost: segment.price,
                category: segment.category,
                color: segment.category.color(),
            });
        summary
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn mw_price(curve: &SupplyCurve) -> Vec<(f64, f64)> {
        curve
            .points
            .iter()
            .map(|p| (p.segment.mw, p.segment.price))
            .collect()
    }

    fn mixed_fleet() -> Vec<GeneratorRecord> {
        vec![
            GeneratorRecord::new("NUKE_1", "NUC", "ON", &[(1000.0, 5.0)], Some(1000.0)),
            GeneratorRecord::new(
                "CC_1",
                "CCGT90",
                "ON",
                &[(200.0, 25.0), (450.0, 32.0), (600.0, 55.0)],
                Some(400.0),
            ),
            GeneratorRecord::new(
                "WIND_1",
                "WIND",
                "ON",
                &[(50.0, -5.0), (150.0, 0.0), (300.0, 10.0)],
                Some(120.0),
            ),
            GeneratorRecord::new("SOLAR_1", "PVGR", "ON", &[(80.0, -2.0)], Some(200.0)),
            GeneratorRecord::new("PEAKER_1", "SCGT90", "ONREG", &[(100.0, 120.0)], Some(0.0)),
            GeneratorRecord::new("BESS_1", "PWRSTR", "ON", &[(50.0, 32.0), (100.0, 900.0)], Some(10.0)),
            GeneratorRecord::new("CC_2", "CCGT90", "OUT", &[(500.0, 1.0)], Some(500.0)),
        ]
    }

    #[test]
    fn single_thermal_unit_keeps_full_curve() {
        let records = [GeneratorRecord::new(
            "UNIT_A",
            "CCGT90",
            "ON",
            &[(100.0, 20.0), (200.0, 35.0)],
            Some(150.0),
        )];

        let curve = SupplyCurveBuilder::default().build(&records);

        assert_eq!(mw_price(&curve), vec![(100.0, 20.0), (100.0, 35.0)]);
        assert_eq!(curve.total_capacity, 200.0);
    }

    #[test]
    fn wind_is_cut_at_output_schedule() {
        let records = [GeneratorRecord::new(
            "WIND_A",
            "WIND",
            "ON",
            &[(50.0, -5.0), (150.0, 0.0), (300.0, 10.0)],
            Some(120.0),
        )];

        let curve = SupplyCurveBuilder::default().build(&records);

        assert_eq!(mw_price(&curve), vec![(50.0, -5.0), (70.0, 0.0)]);
        assert_eq!(curve.total_capacity, 120.0);
        assert_eq!(curve.stats.truncated_renewables, 1);
    }

    #[test]
    fn outage_emits_nothing() {
        let records = [GeneratorRecord::new(
            "UNIT_A",
            "CCGT90",
            "OUT",
            &[(100.0, 20.0), (200.0, 35.0)],
            Some(200.0),
        )];

        let curve = SupplyCurveBuilder::default().build(&records);

        assert!(curve.is_empty());
        assert_eq!(curve.total_capacity, 0.0);
        assert_eq!(curve.stats.skipped_status, 1);
        assert!(curve.resource_types.is_empty());
    }

    #[test]
    fn equal_prices_order_by_width() {
        let records = [
            GeneratorRecord::new("BIG", "CCGT90", "ON", &[(50.0, 20.0)], Some(50.0)),
            GeneratorRecord::new("SMALL", "CCGT90", "ON", &[(30.0, 20.0)], Some(30.0)),
        ];

        let curve = SupplyCurveBuilder::default().build(&records);

        assert_eq!(mw_price(&curve), vec![(30.0, 20.0), (50.0, 20.0)]);
        assert_eq!(curve.points[0].segment.resource_name, "SMALL");
        assert_eq!(curve.points[1].cumulative_capacity_start, 30.0);
        assert_eq!(curve.points[1].cumulative_capacity_end, 80.0);
    }

    #[test]
    fn merit_order_and_stacking_hold() {
        let curve = SupplyCurveBuilder::default().build(&mixed_fleet());

        for pair in curve.points.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.segment.price <= b.segment.price);
            if a.segment.price == b.segment.price {
                assert!(a.segment.mw <= b.segment.mw);
            }
            assert_eq!(a.cumulative_capacity_end, b.cumulative_capacity_start);
        }
        for point in &curve.points {
            assert!(point.segment.mw > 0.0);
            assert_abs_diff_eq!(
                point.cumulative_capacity_end,
                point.cumulative_capacity_start + point.segment.mw,
                epsilon = 1e-9
            );
        }
        assert_eq!(curve.points[0].cumulative_capacity_start, 0.0);
    }

    #[test]
    fn capacity_is_conserved() {
        let curve = SupplyCurveBuilder::default().build(&mixed_fleet());

        let by_segment: f64 = curve.points.iter().map(|p| p.segment.mw).sum();
        let by_type: f64 = curve.resource_types.values().map(|s| s.capacity).sum();

        assert_abs_diff_eq!(curve.total_capacity, by_segment, epsilon = 1e-9);
        assert_abs_diff_eq!(curve.total_capacity, by_type, epsilon = 1e-9);
    }

    #[test]
    fn renewable_output_bounded_by_schedule_and_curve() {
        let curve = SupplyCurveBuilder::default().build(&mixed_fleet());

        // schedule below the offered capacity
        assert_abs_diff_eq!(curve.capacity_of("WIND_1"), 120.0, epsilon = 0.1);
        // schedule above the offered capacity
        assert_abs_diff_eq!(curve.capacity_of("SOLAR_1"), 80.0, epsilon = 0.1);
    }

    #[test]
    fn thermal_units_offer_everything() {
        let curve = SupplyCurveBuilder::default().build(&mixed_fleet());

        assert_abs_diff_eq!(curve.capacity_of("NUKE_1"), 1000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(curve.capacity_of("CC_1"), 600.0, epsilon = 1e-9);
        // scheduled output does not cap non-renewables
        assert_abs_diff_eq!(curve.capacity_of("BESS_1"), 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(curve.capacity_of("PEAKER_1"), 100.0, epsilon = 1e-9);
        assert_eq!(curve.capacity_of("CC_2"), 0.0);
    }

    #[test]
    fn repeated_builds_are_identical() {
        let builder = SupplyCurveBuilder::default();
        let records = mixed_fleet();

        assert_eq!(builder.build(&records), builder.build(&records));
    }

    #[test]
    fn summary_tracks_cheapest_price_and_color() {
        let curve = SupplyCurveBuilder::default().build(&mixed_fleet());

        let combined_cycle = &curve.resource_types["CCGT90"];
        assert_eq!(combined_cycle.capacity, 600.0);
        assert_eq!(combined_cycle.marginal_cost, 25.0);
        assert_eq!(combined_cycle.color, "#FF8C00");

        let wind = &curve.resource_types["WIND"];
        assert_eq!(wind.marginal_cost, -5.0);
        assert_eq!(wind.color, "#32CD32");

        assert_eq!(curve.resource_types["PWRSTR"].category, ResourceCategory::Storage);
    }

    #[test]
    fn negative_and_zero_prices_survive() {
        let curve = SupplyCurveBuilder::default().build(&mixed_fleet());

        let prices: Vec<f64> = curve.points.iter().map(|p| p.segment.price).collect();
        assert_eq!(&prices[..3], &[-5.0, -2.0, 0.0]);
    }

    #[test]
    fn missing_schedules_are_counted() {
        let mut wind = GeneratorRecord::new("WIND_A", "WIND", "ON", &[(100.0, 0.0)], None);
        let thermal = GeneratorRecord::new("UNIT_A", "CCGT90", "ON", &[(100.0, 20.0)], None);
        let calm = GeneratorRecord::new("WIND_B", "WIND", "ON", &[(100.0, 0.0)], Some(0.0));

        let curve = SupplyCurveBuilder::default().build(&[wind.clone(), thermal.clone(), calm.clone()]);
        assert!(curve.is_empty());
        assert_eq!(curve.stats.skipped_missing_schedule, 2);
        assert_eq!(curve.stats.skipped_zero_schedule, 1);
        assert_eq!(curve.stats.records_seen, 3);
        assert_eq!(curve.stats.records_used, 0);

        let lenient = SupplyCurveBuilder::new(BuilderConfig {
            schedule_requirement: ScheduleRequirement::RenewablesOnly,
            ..BuilderConfig::default()
        });
        wind.output_schedule = Some(f64::NAN);
        let curve = lenient.build(&[wind, thermal, calm]);
        assert_eq!(mw_price(&curve), vec![(100.0, 20.0)]);
        assert_eq!(curve.stats.skipped_missing_schedule, 1);
    }

    #[test]
    fn blank_status_is_unavailable() {
        let silent = GeneratorRecord::new("UNIT_A", "CCGT90", "", &[(100.0, 20.0)], Some(100.0));
        let blank = GeneratorRecord::new("UNIT_B", "CCGT90", "  ", &[(50.0, 30.0)], Some(50.0));
        let online = GeneratorRecord::new("UNIT_C", "NUC", "ON", &[(500.0, 5.0)], Some(500.0));
        let records = [silent, blank, online];

        let curve = SupplyCurveBuilder::default().build(&records);
        assert_eq!(mw_price(&curve), vec![(500.0, 5.0)]);
        assert_eq!(curve.stats.skipped_status, 2);

        let curve = SupplyCurveBuilder::default().build_for_statuses(&records, &["ON", ""]);
        assert_eq!(curve.stats.skipped_status, 2);
    }

    #[test]
    fn missing_identity_follows_policy() {
        let mut anonymous = GeneratorRecord::new("", "CCGT90", "ON", &[(100.0, 20.0)], Some(100.0));
        anonymous.resource_name = None;
        let mut untyped = GeneratorRecord::new("UNIT_B", "", "ON", &[(50.0, 30.0)], Some(50.0));
        untyped.resource_type = Some("   ".to_string());
        let records = [anonymous, untyped];

        let curve = SupplyCurveBuilder::default().build(&records);
        assert!(curve.is_empty());
        assert_eq!(curve.stats.skipped_missing_identity, 2);

        let keep = SupplyCurveBuilder::new(BuilderConfig {
            missing_identity: MissingIdentityPolicy::Placeholder,
            ..BuilderConfig::default()
        });
        let curve = keep.build(&records);
        assert_eq!(curve.stats.placeholder_identity, 2);
        assert_eq!(curve.points[0].segment.resource_name, PLACEHOLDER_IDENTITY);
        assert_eq!(curve.points[1].segment.resource_type, PLACEHOLDER_IDENTITY);
        assert_eq!(curve.resource_types[PLACEHOLDER_IDENTITY].category, ResourceCategory::Unknown);
        assert_eq!(curve.resource_types[PLACEHOLDER_IDENTITY].color, "#A9A9A9");
    }

    #[test]
    fn malformed_point_drops_rest_of_curve_only() {
        let mut broken = GeneratorRecord::new(
            "BROKEN",
            "CCGT90",
            "ON",
            &[(100.0, 20.0), (80.0, 25.0), (300.0, 40.0)],
            Some(100.0),
        );
        let mut short = GeneratorRecord::new("SHORT", "NUC", "ON", &[], Some(100.0));
        short.offer_curve = vec![vec![100.0]];
        let healthy = GeneratorRecord::new("HEALTHY", "NUC", "ON", &[(400.0, 8.0)], Some(400.0));

        let curve = SupplyCurveBuilder::default().build(&[broken.clone(), short, healthy]);

        assert_eq!(mw_price(&curve), vec![(400.0, 8.0), (100.0, 20.0)]);
        assert_eq!(curve.stats.malformed_curves, 2);
        assert_eq!(curve.stats.records_used, 3);

        broken.offer_curve[1] = vec![80.0, 25.0, 1.0];
        let curve = SupplyCurveBuilder::default().build(&[broken]);
        assert_eq!(curve.total_capacity, 100.0);
    }

    #[test]
    fn flat_steps_are_ignored() {
        let records = [GeneratorRecord::new(
            "UNIT_A",
            "CCGT90",
            "ON",
            &[(0.0, 10.0), (100.0, 20.0), (100.0, 30.0), (150.0, 40.0)],
            Some(150.0),
        )];

        let curve = SupplyCurveBuilder::default().build(&records);

        assert_eq!(mw_price(&curve), vec![(100.0, 20.0), (50.0, 40.0)]);
    }

    #[test]
    fn status_allow_list_overrides_exclusions() {
        let builder = SupplyCurveBuilder::default();
        let records = mixed_fleet();

        let curve = builder.build_for_statuses(&records, &["onreg"]);
        assert_eq!(curve.stats.records_used, 1);
        assert_eq!(curve.capacity_of("PEAKER_1"), 100.0);
        assert_eq!(curve.stats.skipped_status, records.len() - 1);

        let curve = builder.build_for_statuses(&records, &["OUT"]);
        assert_eq!(curve.capacity_of("CC_2"), 500.0);
    }

    #[test]
    fn custom_exclusions_and_renewables() {
        let builder = SupplyCurveBuilder::new(BuilderConfig {
            excluded_statuses: vec!["ONTEST".into()],
            renewable_types: vec!["HYDRO".into()],
            ..BuilderConfig::default()
        });
        let records = [
            GeneratorRecord::new("TEST_UNIT", "CCGT90", "ONTEST", &[(100.0, 20.0)], Some(100.0)),
            GeneratorRecord::new("DAM", "HYDRO", "ON", &[(100.0, 1.0), (300.0, 2.0)], Some(150.0)),
            GeneratorRecord::new("WIND_A", "WIND", "ON", &[(100.0, 0.0), (200.0, 1.0)], Some(50.0)),
        ];

        let curve = builder.build(&records);

        assert!(builder.is_renewable("hydro"));
        assert!(!builder.is_renewable("WIND"));
        assert_eq!(curve.stats.skipped_status, 1);
        assert_eq!(curve.capacity_of("DAM"), 150.0);
        assert_eq!(curve.capacity_of("WIND_A"), 200.0);
    }

    #[test]
    fn empty_input_gives_empty_curve() {
        let curve = SupplyCurveBuilder::default().build(&[]);

        assert!(curve.is_empty());
        assert_eq!(curve.total_capacity, 0.0);
        assert_eq!(curve.stats, FilterStats::default());
        assert_eq!(curve.price_range(), None);
    }
}
