// 🌐 Map Server - REST API behind the Leaflet page
// The page owns drawing; every filter change asks for a fresh plan

use crate::age::AgeBucket;
use crate::config::{AppConfig, MapConfig};
use crate::filter::{FilterCriteria, FilterQuery};
use crate::geojson::to_feature_collection;
use crate::render::{RenderOptions, RenderPlan};
use crate::session::{today, BusinessMap};
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Shared application state
///
/// A failed load is kept as the user-facing message so the page can show it.
#[derive(Clone)]
pub struct AppState {
    map: Result<Arc<BusinessMap>, String>,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn loaded(map: BusinessMap, config: AppConfig) -> Self {
        Self {
            map: Ok(Arc::new(map)),
            config: Arc::new(config),
        }
    }

    pub fn failed(message: impl Into<String>, config: AppConfig) -> Self {
        Self {
            map: Err(message.into()),
            config: Arc::new(config),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.map.is_ok()
    }
}

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

// ============================================================================
// Request / response shapes
// ============================================================================

/// Query string of /api/render and /api/geojson
///
/// Everything arrives as text; `cluster` and `color` accept true/false/1/0/on/off.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RenderQuery {
    pub search: Option<String>,
    pub age: Option<String>,
    pub industry: Option<String>,
    pub company_type: Option<String>,
    pub area: Option<String>,
    pub cluster: Option<String>,
    pub color: Option<String>,
    /// Reference date for ages, YYYY-MM-DD (defaults to today)
    pub reference: Option<String>,
}

impl RenderQuery {
    fn into_parts(
        self,
        config: &AppConfig,
    ) -> Result<(FilterCriteria, RenderOptions, NaiveDate), String> {
        let cluster = parse_switch(
            "cluster",
            self.cluster.as_deref(),
            config.map.cluster_by_default,
        )?;
        let color = parse_switch("color", self.color.as_deref(), true)?;
        let reference = match self.reference.as_deref().map(str::trim) {
            None | Some("") => today(),
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| format!("Invalid reference date: {}", raw))?,
        };

        let criteria = FilterCriteria::try_from(FilterQuery {
            search: self.search,
            age: self.age,
            industry: self.industry,
            company_type: self.company_type,
            area: self.area,
        })?;

        Ok((
            criteria,
            RenderOptions {
                cluster,
                color_by_industry: color,
            },
            reference,
        ))
    }
}

fn parse_switch(name: &str, raw: Option<&str>, default: bool) -> Result<bool, String> {
    match raw.map(|s| s.trim().to_lowercase()).as_deref() {
        None | Some("") => Ok(default),
        Some("true") | Some("1") | Some("on") | Some("yes") => Ok(true),
        Some("false") | Some("0") | Some("off") | Some("no") => Ok(false),
        Some(other) => Err(format!("Invalid value for {}: {}", name, other)),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RenderResponse {
    #[serde(flatten)]
    pub plan: RenderPlan,
    pub header: String,
    /// Query string reproducing the current filters
    pub share_query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ColorEntry {
    pub industry: String,
    pub color: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OptionsResponse {
    pub title: String,
    pub age_buckets: Vec<SelectOption>,
    pub industries: Vec<String>,
    pub company_types: Vec<String>,
    pub areas: Vec<String>,
    pub catch_all_industries: Vec<String>,
    pub colors: Vec<ColorEntry>,
    pub default_color: String,
    pub search_debounce_ms: u64,
    pub map: MapConfig,
    pub total: usize,
    pub active: usize,
    pub fingerprint: String,
}

// ============================================================================
// Helpers
// ============================================================================

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::<()>::err(message))).into_response()
}

fn loaded_map(state: &AppState) -> Result<&Arc<BusinessMap>, Response> {
    state
        .map
        .as_ref()
        .map_err(|message| failure(StatusCode::SERVICE_UNAVAILABLE, message.clone()))
}

/// ETag over the dataset fingerprint plus whatever else shapes the body
fn etag(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    let digest = format!("{:x}", hasher.finalize());
    format!("\"{}\"", &digest[..16])
}

/// 304 when the client already holds this representation
fn respond<T: Serialize>(headers: &HeaderMap, tag: String, data: T) -> Response {
    let cached = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == tag)
        .unwrap_or(false);

    if cached {
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, tag)]).into_response();
    }
    (
        StatusCode::OK,
        [(header::ETAG, tag)],
        Json(ApiResponse::ok(data)),
    )
        .into_response()
}

fn plan_for(
    state: &AppState,
    query: RenderQuery,
) -> Result<
    (
        Arc<BusinessMap>,
        FilterCriteria,
        RenderOptions,
        NaiveDate,
        RenderPlan,
    ),
    Response,
> {
    let map = loaded_map(state)?.clone();
    let (criteria, options, reference) = query.into_parts(&state.config).map_err(|e| {
        warn!("Rejected render query: {}", e);
        failure(StatusCode::BAD_REQUEST, e)
    })?;
    let plan = map.render(&criteria, options, reference);
    Ok((map, criteria, options, reference, plan))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let status = if state.is_loaded() { "OK" } else { "DEGRADED" };
    Json(ApiResponse::ok(status))
}

/// GET /api/options - Select options, colors and map settings
async fn get_options(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let map = match loaded_map(&state) {
        Ok(map) => map,
        Err(response) => return response,
    };
    let config = &state.config;
    let options = map.filter_options();
    let dataset = map.dataset();

    let body = OptionsResponse {
        title: config.title.clone(),
        age_buckets: AgeBucket::ALL
            .iter()
            .map(|b| SelectOption {
                value: b.as_str().to_string(),
                label: b.label().to_string(),
            })
            .collect(),
        industries: options.industries.clone(),
        company_types: options.company_types.clone(),
        areas: options.municipalities.clone(),
        catch_all_industries: map.catch_all().to_vec(),
        colors: map
            .colors()
            .iter()
            .map(|(industry, color)| ColorEntry {
                industry: industry.to_string(),
                color: color.to_string(),
            })
            .collect(),
        default_color: map.colors().default_color().to_string(),
        search_debounce_ms: config.search_debounce_ms,
        map: config.map.clone(),
        total: dataset.len(),
        active: dataset.active_count(),
        fingerprint: dataset.fingerprint.clone(),
    };

    let tag = etag(&[&dataset.fingerprint, "options"]);
    respond(&headers, tag, body)
}

/// GET /api/render - Render plan for the given filters
async fn get_render(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RenderQuery>,
) -> Response {
    let (map, criteria, options, reference, plan) = match plan_for(&state, query) {
        Ok(parts) => parts,
        Err(response) => return response,
    };

    let share_query = criteria.to_query_string();
    let reference = reference.to_string();
    let switches = format!("{}{}", options.cluster, options.color_by_industry);
    let tag = etag(&[
        &map.dataset().fingerprint,
        "render",
        &share_query,
        &reference,
        &switches,
    ]);

    let body = RenderResponse {
        header: plan.header(),
        share_query,
        plan,
    };
    respond(&headers, tag, body)
}

/// GET /api/geojson - Same plan as GeoJSON
async fn get_geojson(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RenderQuery>,
) -> Response {
    let (map, criteria, options, reference, plan) = match plan_for(&state, query) {
        Ok(parts) => parts,
        Err(response) => return response,
    };

    let reference = reference.to_string();
    let switches = format!("{}{}", options.cluster, options.color_by_industry);
    let tag = etag(&[
        &map.dataset().fingerprint,
        "geojson",
        &criteria.to_query_string(),
        &reference,
        &switches,
    ]);
    respond(&headers, tag, to_feature_collection(&plan))
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/options", get(get_options))
        .route("/render", get(get_render))
        .route("/geojson", get(get_geojson))
        .with_state(state);

    // Build main router
    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
