use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::chart::{self, ChartConfig, PlotData};
use crate::config::AppConfig;
use crate::records::{RecordSource, RecordsError, parse_interval};
use crate::supply::{
    ClearingOutcome, FilterStats, ResourceCategory, SupplyCurve, SupplyCurveBuilder,
};

#[derive(Clone)]
pub struct AppState {
    source: Arc<RecordSource>,
    builder: Arc<SupplyCurveBuilder>,
    chart: ChartConfig,
}

impl AppState {
    pub fn new(source: RecordSource, builder: SupplyCurveBuilder, chart: ChartConfig) -> Self {
        Self {
            source: Arc::new(source),
            builder: Arc::new(builder),
            chart,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, RecordsError> {
        Ok(Self::new(
            config.source.clone().into_source()?,
            SupplyCurveBuilder::new(config.builder.clone()),
            config.chart.clone(),
        ))
    }
}

#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

enum ApiError {
    BadRequest(String),
    NotFound(String),
    Upstream(String),
    Internal(String),
}

impl From<RecordsError> for ApiError {
    fn from(err: RecordsError) -> Self {
        match err {
            RecordsError::InvalidTimestamp(_) => ApiError::BadRequest(err.to_string()),
            other => {
                error!(error = %other, "Failed to fetch offer curves");
                ApiError::Upstream(format!("Failed to fetch offer curves: {other}"))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Upstream(m) => (StatusCode::BAD_GATEWAY, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

#[derive(Deserialize)]
struct CurveQuery {
    /// Interval start, RFC 3339 or `YYYY-MM-DD HH:MM:SS` (latest snapshot when absent)
    interval: Option<String>,
    /// Comma-separated status allow-list
    status: Option<String>,
    /// Demand in MW (default: load factor × total capacity)
    demand: Option<String>,
}

impl CurveQuery {
    fn statuses(&self) -> Option<Vec<&str>> {
        let statuses: Vec<&str> = self
            .status
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        (!statuses.is_empty()).then_some(statuses)
    }

    fn demand(&self) -> Result<Option<f64>, ApiError> {
        self.demand
            .as_deref()
            .map(|raw| {
                raw.trim()
                    .parse::<f64>()
                    .map_err(|_| ApiError::BadRequest(format!("Invalid demand: {raw}")))
            })
            .transpose()
    }
}

async fn load_curve(state: &AppState, query: &CurveQuery) -> Result<SupplyCurve, ApiError> {
    let interval = query.interval.as_deref().map(parse_interval).transpose()?;
    let records = state.source.fetch(interval).await?;

    Ok(match query.statuses() {
        Some(allowed) => state.builder.build_for_statuses(&records, &allowed),
        None => state.builder.build(&records),
    })
}

fn clear_curve(
    state: &AppState,
    curve: &SupplyCurve,
    query: &CurveQuery,
) -> Result<ClearingOutcome, ApiError> {
    let demand = query
        .demand()?
        .unwrap_or_else(|| curve.demand_at_load_factor(state.chart.load_factor));

    curve
        .clear(demand)
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// GET /api/v1/resource-types
/// List resource categories with their chart colors
async fn list_resource_types() -> Json<ApiResponse<Vec<Value>>> {
    let categories = ResourceCategory::ALL
        .iter()
        .map(|c| {
            json!({
                "category": c,
                "label": c.label(),
                "color": c.color(),
            })
        })
        .collect();

    Json(ApiResponse::success(categories))
}

/// GET /api/v1/supply-curve?interval=&status=
async fn get_supply_curve(
    State(state): State<AppState>,
    Query(query): Query<CurveQuery>,
) -> Result<Json<ApiResponse<SupplyCurve>>, ApiError> {
    let curve = load_curve(&state, &query).await?;
    Ok(Json(ApiResponse::success(curve)))
}

#[derive(Serialize)]
struct ClearingResponse {
    outcome: ClearingOutcome,
    stats: FilterStats,
}

/// GET /api/v1/supply-curve/clearing?demand=&interval=&status=
async fn get_clearing(
    State(state): State<AppState>,
    Query(query): Query<CurveQuery>,
) -> Result<Json<ApiResponse<ClearingResponse>>, ApiError> {
    let curve = load_curve(&state, &query).await?;
    let outcome = clear_curve(&state, &curve, &query)?;

    if outcome.is_shortfall() {
        warn!(demand = outcome.demand(), total_capacity = curve.total_capacity, "Demand exceeds supply");
    }

    Ok(Json(ApiResponse::success(ClearingResponse {
        outcome,
        stats: curve.stats,
    })))
}

#[derive(Template)]
#[template(path = "plot.html")]
struct PlotTemplate {
    title: String,
    interval: String,
    total_capacity: String,
    segments: usize,
    demand: String,
    clearing_price: String,
    plot_data: String,
    plot_layout: String,
}

async fn plot_for(state: &AppState, query: &CurveQuery) -> Result<(SupplyCurve, PlotData), ApiError> {
    let curve = load_curve(state, query).await?;

    if curve.is_empty() {
        return Err(ApiError::NotFound("No offer curves available".to_string()));
    }

    let outcome = clear_curve(state, &curve, query)?;
    let plot = chart::build_plot(&curve, &outcome, &state.chart);

    Ok((curve, plot))
}

/// Serialize JSON for embedding in a `<script>` block
fn script_json(value: &Value) -> String {
    value
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

/// Render the standalone Plotly page for a built curve
pub fn render_plot_page(
    title: &str,
    interval: &str,
    curve: &SupplyCurve,
    plot: &PlotData,
) -> Result<String, askama::Error> {
    let mut layout = plot.layout.clone();
    layout["title"]["text"] = json!(title);

    PlotTemplate {
        title: title.to_string(),
        interval: interval.to_string(),
        total_capacity: format!("{:.0}", curve.total_capacity),
        segments: curve.points.len(),
        demand: format!("{:.0}", plot.demand),
        clearing_price: plot
            .clearing_price
            .map(|p| format!("${p:.2}/MWh"))
            .unwrap_or_else(|| "none (shortfall)".to_string()),
        plot_data: script_json(&plot.traces),
        plot_layout: script_json(&layout),
    }
    .render()
}

/// GET /api/v1/supply-curve/plot
/// Interactive Plotly visualization
async fn get_plot(
    State(state): State<AppState>,
    Query(query): Query<CurveQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (curve, plot) = plot_for(&state, &query).await?;
    let interval = query.interval.as_deref().unwrap_or("latest");

    let html = render_plot_page("Supply Curve", interval, &curve, &plot).map_err(|e| {
        error!(error = %e, "Template rendering error");
        ApiError::Internal("Template rendering failed".to_string())
    })?;

    Ok(Html(html))
}

/// GET /api/v1/supply-curve/plot-json
/// Plot data as JSON (for frontend frameworks)
async fn get_plot_json(
    State(state): State<AppState>,
    Query(query): Query<CurveQuery>,
) -> Result<Json<ApiResponse<PlotData>>, ApiError> {
    let (_, plot) = plot_for(&state, &query).await?;
    Ok(Json(ApiResponse::success(plot)))
}

/// GET /health
async fn health() -> &'static str {
    "OK"
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/resource-types", get(list_resource_types))
        .route("/api/v1/supply-curve", get(get_supply_curve))
        .route("/api/v1/supply-curve/clearing", get(get_clearing))
        .route("/api/v1/supply-curve/plot", get(get_plot))
        .route("/api/v1/supply-curve/plot-json", get(get_plot_json))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!(addr = %config.server.bind_addr, "Server running");
    info!("Available endpoints:");
    for endpoint in [
        "GET /health",
        "GET /api/v1/resource-types",
        "GET /api/v1/supply-curve?interval=&status=",
        "GET /api/v1/supply-curve/clearing?demand=&interval=&status=",
        "GET /api/v1/supply-curve/plot?demand=&interval=&status=",
        "GET /api/v1/supply-curve/plot-json?demand=&interval=&status=",
    ] {
        info!("  {endpoint}");
    }

    axum::serve(listener, app).await?;

    Ok(())
}
