use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

use crate::supply::{ClearingOutcome, Color, SupplyCurve, SupplyCurvePoint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Demand as a share of total capacity when none is requested
    pub load_factor: f64,
    /// Narrowest bar drawn, as a share of total capacity
    pub min_bar_fraction: f64,
    /// Linear range of the symmetric-log price axis
    pub linthresh: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            load_factor: 0.75,
            min_bar_fraction: 0.0005,
            linthresh: 10.0,
        }
    }
}

/// One drawn bar; may merge several narrow segments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub start: f64,
    pub end: f64,
    pub width: f64,
    pub price: f64,
    pub resource_type: String,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

struct BarGroup {
    start: f64,
    width: f64,
    cost: f64,
    // insertion order decides ties
    types: Vec<(String, f64, Color)>,
}

impl BarGroup {
    fn starting_at(start: f64) -> Self {
        Self {
            start,
            width: 0.0,
            cost: 0.0,
            types: Vec::new(),
        }
    }

    fn add(&mut self, point: &SupplyCurvePoint) {
        let segment = &point.segment;
        self.width += segment.mw;
        self.cost += segment.mw * segment.price;

        match self.types.iter_mut().find(|(t, _, _)| *t == segment.resource_type) {
            Some((_, mw, _)) => *mw += segment.mw,
            None => self.types.push((
                segment.resource_type.clone(),
                segment.mw,
                segment.category.color(),
            )),
        }
    }

    fn finish(self) -> ChartBar {
        let (resource_type, color) = self
            .types
            .into_iter()
            .fold(None, |best: Option<(String, f64, Color)>, candidate| match best {
                Some(best) if best.1 >= candidate.1 => Some(best),
                _ => Some(candidate),
            })
            .map(|(t, _, c)| (t, c))
            .unwrap_or_default();

        ChartBar {
            start: self.start,
            end: self.start + self.width,
            width: self.width,
            price: self.cost / self.width,
            resource_type,
            color,
        }
    }
}

/// Merge merit-order segments until each bar is at least `min_bar_fraction` of the curve wide
pub fn group_bars(curve: &SupplyCurve, min_bar_fraction: f64) -> Vec<ChartBar> {
    let min_width = curve.total_capacity * min_bar_fraction;
    let mut bars = Vec::new();
    let mut group: Option<BarGroup> = None;

    for point in &curve.points {
        group
            .get_or_insert_with(|| BarGroup::starting_at(point.cumulative_capacity_start))
            .add(point);

        if let Some(full) = group.take_if(|g| g.width >= min_width) {
            bars.push(full.finish());
        }
    }

    if let Some(rest) = group {
        bars.push(rest.finish());
    }

    bars
}

/// Symmetric log: linear inside `±linthresh`, log10-compressed outside.
pub fn symlog(x: f64, linthresh: f64) -> f64 {
    if x.abs() <= linthresh {
        x
    } else {
        x.signum() * (linthresh + (x.abs() / linthresh).log10())
    }
}

pub fn format_price_label(x: f64) -> String {
    let magnitude = x.abs();
    if x == 0.0 {
        "0".to_string()
    } else if magnitude < 1.0 {
        format!("{x:.1}")
    } else if magnitude < 500.0 {
        format!("{}", x as i64)
    } else if magnitude < 1000.0 {
        format!("{}", (x / 500.0) as i64 * 500)
    } else if x % 1000.0 == 0.0 {
        format!("{}k", (x / 1000.0) as i64)
    } else {
        format!("{:.1}k", x / 1000.0)
    }
}

const NEGATIVE_PRICE_TICKS: [f64; 10] = [
    -5000.0, -2500.0, -1000.0, -500.0, -250.0, -100.0, -50.0, -25.0, -10.0, -1.0,
];
const PRICE_TICKS: [f64; 15] = [
    0.0, 1.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 1500.0, 2000.0, 2500.0, 3000.0,
    4000.0, 5000.0,
];

/// Price axis limits and ticks (untransformed values)
pub fn price_axis(min_price: f64, max_price: f64) -> (f64, f64, Vec<Tick>) {
    let y_min = if min_price < 0.0 {
        min_price * 1.2
    } else {
        (min_price * 0.8).max(0.1)
    };
    let y_max = (max_price * 1.2).max(y_min + 1.0);

    let negatives: &[f64] = if min_price < 0.0 { &NEGATIVE_PRICE_TICKS } else { &[] };
    let ticks = negatives
        .iter()
        .chain(PRICE_TICKS.iter())
        .copied()
        .filter(|&y| y_min <= y && y <= y_max)
        .map(|value| Tick {
            value,
            label: format_price_label(value),
        })
        .collect();

    (y_min, y_max, ticks)
}

/// Capacity ticks every 10 GW
pub fn capacity_ticks(max_capacity: f64) -> Vec<Tick> {
    (0u32..)
        .map(|i| f64::from(i) * 10_000.0)
        .take_while(|&value| value < max_capacity + 10_000.0)
        .map(|value| Tick {
            value,
            label: if value > 0.0 {
                format!("{}k", (value / 1000.0) as i64)
            } else {
                "0".to_string()
            },
        })
        .collect()
}

/// Everything the frontend needs to draw a supply curve
#[derive(Debug, Clone, Serialize)]
pub struct PlotData {
    pub bars: Vec<ChartBar>,
    pub price_ticks: Vec<Tick>,
    pub capacity_ticks: Vec<Tick>,
    pub demand: f64,
    pub clearing_price: Option<f64>,
    pub traces: Value,
    pub layout: Value,
}

pub fn build_plot(curve: &SupplyCurve, outcome: &ClearingOutcome, config: &ChartConfig) -> PlotData {
    let bars = group_bars(curve, config.min_bar_fraction);
    let (min_price, max_price) = curve.price_range().unwrap_or((0.0, 0.0));
    let (y_min, y_max, price_ticks) = price_axis(min_price, max_price);
    let capacity_ticks = capacity_ticks(curve.total_capacity);
    let demand = outcome.demand();
    let clearing_price = outcome.clearing_price();
    let t = |price: f64| symlog(price, config.linthresh);

    // one trace per resource type keeps the legend short
    let mut by_type: BTreeMap<&str, (Color, Vec<f64>, Vec<f64>, Vec<f64>, Vec<String>)> =
        BTreeMap::new();
    for bar in &bars {
        let entry = by_type
            .entry(bar.resource_type.as_str())
            .or_insert_with(|| (bar.color, Vec::new(), Vec::new(), Vec::new(), Vec::new()));
        entry.1.push(bar.start + bar.width / 2.0);
        entry.2.push(t(bar.price));
        entry.3.push(bar.width);
        entry.4.push(format!(
            "Resource Type: {}<br>Capacity: {:.1} MW<br>Price: ${:.2}/MWh<br>Load: {:.0} - {:.0} MW",
            bar.resource_type, bar.width, bar.price, bar.start, bar.end
        ));
    }

    let mut traces: Vec<Value> = by_type
        .into_iter()
        .map(|(resource_type, (color, x, y, width, hover))| {
            json!({
                "type": "bar",
                "name": resource_type,
                "x": x,
                "y": y,
                "width": width,
                "marker": { "color": color, "line": { "width": 0 } },
                "hovertext": hover,
                "hovertemplate": "%{hovertext}<extra></extra>"
            })
        })
        .collect();

    traces.push(json!({
        "type": "scatter",
        "mode": "lines",
        "name": "Demand",
        "x": [demand, demand],
        "y": [t(y_min), t(y_max)],
        "line": { "color": "red", "width": 3, "dash": "dash" },
        "showlegend": false,
        "hovertemplate": format!("Demand: {demand:.0} MW<extra></extra>")
    }));

    if let Some(price) = clearing_price {
        traces.push(json!({
            "type": "scatter",
            "mode": "lines",
            "name": "Clearing Price",
            "x": [0.0, curve.total_capacity],
            "y": [t(price), t(price)],
            "line": { "color": "red", "width": 3, "dash": "dash" },
            "showlegend": false,
            "hovertemplate": format!("Clearing Price: ${price:.2}/MWh<extra></extra>")
        }));
    }

    let layout = json!({
        "title": { "text": "Supply Curve", "x": 0.5 },
        "xaxis": {
            "title": { "text": "Load (MW)" },
            "tickmode": "array",
            "tickvals": capacity_ticks.iter().map(|t| t.value).collect::<Vec<_>>(),
            "ticktext": capacity_ticks.iter().map(|t| t.label.clone()).collect::<Vec<_>>()
        },
        "yaxis": {
            "title": { "text": "Offer Price ($/MWh)" },
            "range": [t(y_min), t(y_max)],
            "tickmode": "array",
            "tickvals": price_ticks.iter().map(|tick| t(tick.value)).collect::<Vec<_>>(),
            "ticktext": price_ticks.iter().map(|tick| tick.label.clone()).collect::<Vec<_>>()
        },
        "bargap": 0,
        "hovermode": "closest",
        "plot_bgcolor": "white",
        "paper_bgcolor": "white",
        "showlegend": true,
        "legend": {
            "orientation": "h",
            "y": -0.15,
            "x": 0.5,
            "xanchor": "center",
            "title": { "text": "Resource Type" }
        }
    });

    PlotData {
        bars,
        price_ticks,
        capacity_ticks,
        demand,
        clearing_price,
        traces: Value::Array(traces),
        layout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supply::{GeneratorRecord, SupplyCurveBuilder};
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    fn curve() -> SupplyCurve {
        SupplyCurveBuilder::default().build(&[
            GeneratorRecord::new("WIND_A", "WIND", "ON", &[(300.0, -10.0)], Some(300.0)),
            GeneratorRecord::new("NUKE", "NUC", "ON", &[(500.0, 5.0)], Some(500.0)),
            GeneratorRecord::new("TINY_1", "SCGT90", "ON", &[(0.1, 30.0)], Some(0.1)),
            GeneratorRecord::new("TINY_2", "CCGT90", "ON", &[(0.3, 31.0)], Some(0.3)),
            GeneratorRecord::new("CC", "CCGT90", "ON", &[(200.0, 45.0)], Some(200.0)),
        ])
    }

    #[test]
    fn narrow_segments_merge_into_one_bar() {
        let curve = curve();
        let bars = group_bars(&curve, 0.01);

        assert_eq!(bars.len(), 3);
        let merged = &bars[2];
        assert_abs_diff_eq!(merged.start, 800.0, epsilon = 1e-9);
        assert_abs_diff_eq!(merged.width, 200.4, epsilon = 1e-9);
        assert_eq!(merged.resource_type, "CCGT90");
        assert_abs_diff_eq!(
            merged.price,
            (0.1 * 30.0 + 0.3 * 31.0 + 200.0 * 45.0) / 200.4,
            epsilon = 1e-9
        );
    }

    #[test]
    fn grouping_conserves_capacity() {
        let curve = curve();
        for fraction in [0.0, 0.0005, 0.01, 0.5, 2.0] {
            let bars = group_bars(&curve, fraction);
            let width: f64 = bars.iter().map(|b| b.width).sum();
            assert_abs_diff_eq!(width, curve.total_capacity, epsilon = 1e-9);
            for pair in bars.windows(2) {
                assert_abs_diff_eq!(pair[0].end, pair[1].start, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn no_grouping_keeps_every_segment() {
        let curve = curve();
        assert_eq!(group_bars(&curve, 0.0).len(), curve.points.len());
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(5.0, 5.0)]
    #[case(-10.0, -10.0)]
    #[case(100.0, 11.0)]
    #[case(-1000.0, -12.0)]
    fn symlog_compresses_outside_threshold(#[case] x: f64, #[case] expected: f64) {
        assert_abs_diff_eq!(symlog(x, 10.0), expected, epsilon = 1e-12);
    }

    #[rstest]
    #[case(0.0, "0")]
    #[case(0.5, "0.5")]
    #[case(-0.34, "-0.3")]
    #[case(42.7, "42")]
    #[case(750.0, "500")]
    #[case(2000.0, "2k")]
    #[case(1500.0, "1.5k")]
    #[case(-5000.0, "-5k")]
    fn price_labels(#[case] x: f64, #[case] expected: &str) {
        assert_eq!(format_price_label(x), expected);
    }

    #[test]
    fn price_axis_includes_negative_ticks_when_needed() {
        let (y_min, y_max, ticks) = price_axis(-20.0, 100.0);
        assert_eq!(y_min, -24.0);
        assert_eq!(y_max, 120.0);
        let values: Vec<f64> = ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![-10.0, -1.0, 0.0, 1.0, 10.0, 25.0, 50.0, 100.0]);

        let (y_min, _, ticks) = price_axis(20.0, 100.0);
        assert_eq!(y_min, 16.0);
        assert_eq!(ticks[0].value, 25.0);
    }

    #[test]
    fn capacity_ticks_every_ten_gigawatts() {
        let labels: Vec<String> = capacity_ticks(25_000.0).into_iter().map(|t| t.label).collect();
        assert_eq!(labels, vec!["0", "10k", "20k", "30k"]);
        assert_eq!(capacity_ticks(0.0).len(), 1);
    }

    #[test]
    fn plot_has_trace_per_type_and_market_lines() {
        let curve = curve();
        let outcome = curve.clear(900.0).unwrap();
        let plot = build_plot(&curve, &outcome, &ChartConfig::default());

        let traces = plot.traces.as_array().unwrap();
        // tiny SCGT90 segment folds into the CCGT90 bar
        assert_eq!(traces.len(), 5);
        assert_eq!(plot.demand, 900.0);
        assert_eq!(plot.clearing_price, Some(45.0));
        assert_eq!(traces[0]["name"], "CCGT90");
        assert_eq!(traces[4]["name"], "Clearing Price");
        assert_eq!(plot.layout["xaxis"]["ticktext"][0], "0");
    }

    #[test]
    fn shortfall_plot_has_no_price_line() {
        let curve = curve();
        let outcome = curve.clear(5000.0).unwrap();
        let plot = build_plot(&curve, &outcome, &ChartConfig::default());

        assert_eq!(plot.clearing_price, None);
        let names: Vec<&str> = plot
            .traces
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|t| t["name"].as_str())
            .collect();
        assert!(names.contains(&"Demand"));
        assert!(!names.contains(&"Clearing Price"));
    }
}
