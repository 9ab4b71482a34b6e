// Olympic Medal Table - Web Server
// Read-only JSON API over the merged table; the table is built once at startup

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use medal_table::{
    build_medal_table, cumulative_points, CountryRegistry, DataQualityEngine, EngineConfig,
    MedalTable, QualityReport, RankKey, RankingEngine, Season, SourcePaths, TrajectoryRequest,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    table: Arc<MedalTable>,
    registry: Arc<CountryRegistry>,
    audit: Arc<QualityReport>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
        .into_response()
    }
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message.into()),
        }),
    )
        .into_response()
}

#[derive(Deserialize)]
struct TableParams {
    rank: Option<String>,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct TrajectoryParams {
    season: String,
    from: i32,
    to: i32,
    /// Comma-separated nation names
    nations: Option<String>,
    exclude: Option<String>,
}

fn split_nations(list: Option<&str>, registry: &CountryRegistry) -> Vec<String> {
    list.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| registry.canonical_name(n))
        .collect()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> Response {
    ApiResponse::ok("OK")
}

/// GET /api/editions - Edition selector, most recent first
async fn get_editions(State(state): State<AppState>) -> Response {
    ApiResponse::ok(state.table.editions())
}

/// GET /api/table/:year/:season?rank=&limit= - Ranked table for one edition
async fn get_table(
    State(state): State<AppState>,
    Path((year, season)): Path<(i32, String)>,
    Query(params): Query<TableParams>,
) -> Response {
    let season: Season = match season.parse() {
        Ok(season) => season,
        Err(e) => return bad_request(e.to_string()),
    };
    let rank = match params.rank.as_deref().map(str::parse::<RankKey>) {
        None => RankKey::default(),
        Some(Ok(rank)) => rank,
        Some(Err(e)) => return bad_request(e.to_string()),
    };

    let view = RankingEngine::new().top(state.table.edition(year, season), rank, params.limit);
    ApiResponse::ok(view)
}

/// GET /api/trajectory?season&from&to&nations&exclude - Cumulative points
async fn get_trajectory(State(state): State<AppState>, Query(params): Query<TrajectoryParams>) -> Response {
    let season: Season = match params.season.parse() {
        Ok(season) => season,
        Err(e) => return bad_request(e.to_string()),
    };

    let request = TrajectoryRequest::new(season, params.from, params.to)
        .with_nations(split_nations(params.nations.as_deref(), &state.registry))
        .excluding(split_nations(params.exclude.as_deref(), &state.registry));

    match cumulative_points(state.table.records(), &request) {
        Ok(trajectory) => ApiResponse::ok(trajectory),
        Err(e) => bad_request(e.to_string()),
    }
}

/// GET /api/audit - Data quality report computed at startup
async fn get_audit(State(state): State<AppState>) -> Response {
    ApiResponse::ok(state.audit.as_ref().clone())
}

// ============================================================================
// Main Server
// ============================================================================

fn env_path(key: &str, default: &str) -> PathBuf {
    env::var(key).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(default))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("MEDAL_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("🌐 Olympic Medal Table - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = match env::var("MEDAL_CONFIG") {
        Ok(path) => EngineConfig::from_file(path)?,
        Err(_) => EngineConfig::default(),
    };

    let paths = SourcePaths {
        historical: env_path("MEDAL_HISTORICAL", "data/historical.csv"),
        recent: env_path("MEDAL_RECENT", "data/recent.xlsx"),
        hosts: env::var("MEDAL_HOSTS").ok().map(PathBuf::from),
    };

    let output = build_medal_table(&paths, &config).context("failed to build medal table")?;
    println!("✓ {}", output.report.summary());

    let audit = DataQualityEngine::with_host_placeholder(config.host_placeholder.clone())
        .audit(&output.table, &output.registry);
    println!("✓ {}", audit.summary());

    // Create shared state
    let state = AppState {
        table: Arc::new(output.table),
        registry: Arc::new(output.registry),
        audit: Arc::new(audit),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/editions", get(get_editions))
        .route("/table/:year/:season", get(get_table))
        .route("/trajectory", get(get_trajectory))
        .route("/audit", get(get_audit))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = env::var("MEDAL_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    println!("\n🚀 Server running on http://{addr}");
    println!("   API: http://{addr}/api/editions");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
