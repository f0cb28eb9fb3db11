use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::{ApiConfig, AppConfig, StoreBackend};
use crate::database::{DatabaseManager, MemoryStore, PgStore, Store};
use crate::error::{ApiError, STORE_ERROR_MESSAGE};
use crate::handlers;
use crate::services::AppState;

/// Builds the store selected by `database.backend`
pub async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    let store: Arc<dyn Store> = match config.database.backend {
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database).await?;
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store, data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}

pub fn app(state: AppState, config: &ApiConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(student_routes())
        .merge(class_routes())
        .merge(enrollment_routes())
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(config.max_request_size_bytes))
                .layer(cors_layer(&config.cors_origins)),
        )
        .with_state(state);

    if config.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn student_routes() -> Router<AppState> {
    use handlers::students;

    Router::new()
        .route("/alunos", get(students::collection_get).post(students::collection_post))
        .route("/alunos/export", get(students::export_get))
        .route(
            "/alunos/:id",
            get(students::record_get)
                .put(students::record_put)
                .delete(students::record_delete),
        )
}

fn class_routes() -> Router<AppState> {
    use handlers::classes;

    Router::new()
        .route("/turmas", get(classes::collection_get).post(classes::collection_post))
        .route(
            "/turmas/:id",
            get(classes::record_get)
                .put(classes::record_put)
                .delete(classes::record_delete),
        )
}

fn enrollment_routes() -> Router<AppState> {
    use handlers::enrollments;

    Router::new()
        .route("/matriculas", post(enrollments::enrollment_post))
        .route("/matriculas/:student_id", delete(enrollments::enrollment_delete))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Escola API",
        "version": version,
        "description": "Cadastro de alunos e turmas com matrículas e exportação",
        "endpoints": {
            "alunos": "/alunos[/:id] (GET, POST, PUT, DELETE)",
            "export": "/alunos/export?format=csv|json",
            "turmas": "/turmas[/:id] (GET, POST, PUT, DELETE)",
            "matriculas": "/matriculas (POST), /matriculas/:student_id (DELETE)",
            "health": "/health",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": state.store.backend(),
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiError::service_unavailable(STORE_ERROR_MESSAGE).into_response()
        }
    }
}

/// Binds the configured address and serves until Ctrl-C
pub async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let store = build_store(config).await?;
    let state = AppState::new(store, config.filter.clone());
    let router = app(state, &config.api);

    let addr: SocketAddr = format!("{}:{}", config.api.host, config.api.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Escola API listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
