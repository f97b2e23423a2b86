// Banking Feature Repository - Catalog Server
// Read-only REST API over the feature definitions and the applied catalog

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use bank_feature_repo::catalog::{apply_repo, get_object, list_apply_events, open_catalog, CatalogObject, Event};
use bank_feature_repo::permissions::AccessEntry;
use bank_feature_repo::{init_tracing, validate_repo, FeatureRepo, RepoConfig, ResourceKind};

/// Shared application state
#[derive(Clone)]
struct AppState {
    repo: Arc<FeatureRepo>,
    db: Arc<Mutex<Connection>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

fn failure(status: StatusCode, message: String) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        data: None,
        error: Some(message),
    };
    (status, Json(body)).into_response()
}

fn not_found(kind: ResourceKind, name: &str) -> Response {
    failure(StatusCode::NOT_FOUND, format!("No {} named {}", kind, name))
}

fn lock_db(state: &AppState) -> Result<MutexGuard<'_, Connection>, Response> {
    state.db.lock().map_err(|_| {
        error!("catalog connection mutex poisoned");
        failure(StatusCode::INTERNAL_SERVER_ERROR, "Catalog unavailable".to_string())
    })
}

/// A definition with its catalog row, when it has been applied
#[derive(Serialize)]
struct DefinitionResponse<T> {
    definition: T,
    catalog: Option<CatalogObject>,
}

#[derive(Serialize)]
struct PermissionsResponse {
    group: String,
    access: Vec<AccessEntry>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/entities
async fn get_entities(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.repo.entities.clone()))
}

/// GET /api/data-sources
async fn get_data_sources(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.repo.data_sources.clone()))
}

/// GET /api/feature-views
async fn get_feature_views(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.repo.feature_views.clone()))
}

fn with_catalog<T: Serialize>(state: &AppState, kind: ResourceKind, name: &str, definition: T) -> Response {
    let conn = match lock_db(state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match get_object(&conn, kind, name) {
        Ok(catalog) => (
            StatusCode::OK,
            Json(ApiResponse::ok(DefinitionResponse { definition, catalog })),
        )
            .into_response(),
        Err(e) => {
            error!("Error reading catalog for {} {}: {}", kind, name, e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /api/feature-views/:name - Feature view, or on-demand view, by name
async fn get_feature_view(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    if let Some(view) = state.repo.feature_view(&name) {
        return with_catalog(&state, ResourceKind::FeatureView, &name, view.clone());
    }
    if let Some(view) = state.repo.on_demand_feature_view(&name) {
        return with_catalog(&state, ResourceKind::OnDemandFeatureView, &name, view.clone());
    }
    not_found(ResourceKind::FeatureView, &name)
}

/// GET /api/feature-services
async fn get_feature_services(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.repo.feature_services.clone()))
}

/// GET /api/feature-services/:name
async fn get_feature_service(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.repo.feature_service(&name) {
        Some(service) => with_catalog(&state, ResourceKind::FeatureService, &name, service.clone()),
        None => not_found(ResourceKind::FeatureService, &name),
    }
}

/// GET /api/permissions - Effective access for every group
async fn get_permissions(State(state): State<AppState>) -> impl IntoResponse {
    let set = state.repo.permission_set();
    let response: Vec<PermissionsResponse> = set
        .groups()
        .into_iter()
        .map(|group| PermissionsResponse {
            access: set.access_for_group(&group, state.repo.resources()),
            group,
        })
        .collect();

    Json(ApiResponse::ok(response))
}

/// GET /api/catalog/events - Recent applies
async fn get_catalog_events(State(state): State<AppState>) -> Response {
    let conn = match lock_db(&state) {
        Ok(conn) => conn,
        Err(response) => return response,
    };

    match list_apply_events(&conn, 50) {
        Ok(events) => (StatusCode::OK, Json(ApiResponse::<Vec<Event>>::ok(events))).into_response(),
        Err(e) => {
            error!("Error listing catalog events: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

// ============================================================================
// Main Server
// ============================================================================

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/entities", get(get_entities))
        .route("/data-sources", get(get_data_sources))
        .route("/feature-views", get(get_feature_views))
        .route("/feature-views/:name", get(get_feature_view))
        .route("/feature-services", get(get_feature_services))
        .route("/feature-services/:name", get(get_feature_service))
        .route("/permissions", get(get_permissions))
        .route("/catalog/events", get(get_catalog_events))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("bank_feature_repo=info,catalog_server=info,tower_http=debug")?;

    println!("🌐 Banking Feature Repository - Catalog Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = RepoConfig::load()?;
    let repo = FeatureRepo::banking().with_project(config.project.clone());

    let report = validate_repo(&repo);
    if !report.is_valid() {
        anyhow::bail!("Feature definitions are invalid: {}", report.summary());
    }

    let conn = open_catalog(&config.registry_path)?;
    let summary = apply_repo(&conn, &repo)?;
    println!("✓ Catalog opened: {}", config.registry_path.display());
    println!(
        "✓ Applied {}: {} created, {} updated, {} unchanged",
        repo.project, summary.created, summary.updated, summary.unchanged
    );

    let state = AppState {
        repo: Arc::new(repo),
        db: Arc::new(Mutex::new(conn)),
    };
    let app = build_router(state);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("catalog server listening on {}", addr);
    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/feature-views", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use bank_feature_repo::catalog::setup_catalog;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_state(applied: bool) -> AppState {
        let conn = Connection::open_in_memory().unwrap();
        setup_catalog(&conn).unwrap();
        let repo = FeatureRepo::banking();
        if applied {
            apply_repo(&conn, &repo).unwrap();
        }
        AppState {
            repo: Arc::new(repo),
            db: Arc::new(Mutex::new(conn)),
        }
    }

    async fn get_json(state: AppState, uri: &str) -> (StatusCode, Value) {
        let response = build_router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json(test_state(false), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_lists() {
        let (_, views) = get_json(test_state(false), "/api/feature-views").await;
        assert_eq!(views["data"].as_array().unwrap().len(), 17);

        let (_, entities) = get_json(test_state(false), "/api/entities").await;
        assert_eq!(entities["data"].as_array().unwrap().len(), 4);

        let (_, sources) = get_json(test_state(false), "/api/data-sources").await;
        assert_eq!(sources["data"][0]["name"], "customer_data_source");
    }

    #[tokio::test]
    async fn test_feature_view_with_catalog_version() {
        let (status, body) = get_json(test_state(true), "/api/feature-views/atm_usage_30d").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["definition"]["source"], "atm_usage_data_source");
        assert_eq!(body["data"]["catalog"]["version"], 1);

        let (_, unapplied) = get_json(test_state(false), "/api/feature-views/atm_usage_30d").await;
        assert!(unapplied["data"]["catalog"].is_null());
    }

    #[tokio::test]
    async fn test_on_demand_view_is_served_by_name() {
        let (status, body) = get_json(test_state(true), "/api/feature-views/calculate_simple_risk_score").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["catalog"]["kind"], "on_demand_feature_view");
    }

    #[tokio::test]
    async fn test_unknown_service_is_404() {
        let (status, body) = get_json(test_state(false), "/api/feature-services/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn test_permissions_and_events() {
        let (_, permissions) = get_json(test_state(true), "/api/permissions").await;
        let groups = permissions["data"].as_array().unwrap();
        assert!(groups.iter().any(|g| g["group"] == "data-engineers-group"));

        let (_, events) = get_json(test_state(true), "/api/catalog/events").await;
        assert_eq!(events["data"].as_array().unwrap().len(), 1);
        assert_eq!(events["data"][0]["event_type"], "repo_applied");
    }
}
