//! # Server Configuration
//!
//! This module contains the server setup and configuration for the Employee Management API.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::get,
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{Mediator, build_mediator};
use crate::config::AppConfig;
use crate::handlers::{self, departments, employees};
use crate::repositories::{DepartmentRepository, EmployeeRepository};
use crate::telemetry;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub mediator: Arc<Mediator>,
}

impl AppState {
    /// Wires the SeaORM stores and every use-case pipeline over `db`
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Self {
        let shared = Arc::new(db.clone());
        let mediator = build_mediator(
            Arc::new(EmployeeRepository::new(shared.clone())),
            Arc::new(DepartmentRepository::new(shared)),
        );

        Self {
            config: Arc::new(config),
            db,
            mediator: Arc::new(mediator),
        }
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/api/Employee",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route("/api/Employee/{id}", get(employees::get_employee))
        .route(
            "/api/Department",
            get(departments::list_departments).post(departments::create_department),
        )
        .route("/api/Department/{id}", get(departments::get_department))
        .route(
            "/api/Department/{id}/SubDepartments",
            get(departments::get_department_hierarchy),
        )
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(telemetry::trace_id_middleware))
}

/// Builds the CORS layer; no configured origins means any origin is allowed
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(origin = %origin, error = %err, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> Result<()> {
    let addr = config
        .bind_addr()
        .with_context(|| format!("Invalid server address: {}", config.api_bind_addr))?;
    let profile = config.profile.clone();

    let app = create_app(AppState::new(config, db));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::employees::create_employee,
        crate::handlers::employees::list_employees,
        crate::handlers::employees::get_employee,
        crate::handlers::departments::create_department,
        crate::handlers::departments::list_departments,
        crate::handlers::departments::get_department,
        crate::handlers::departments::get_department_hierarchy,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::HealthStatus,
            crate::error::ApiError,
            crate::application::employees::CreateEmployeeRequest,
            crate::application::employees::CreateEmployeeResponse,
            crate::application::employees::EmployeeItem,
            crate::application::employees::EmployeeList,
            crate::application::departments::CreateDepartmentRequest,
            crate::application::departments::CreateDepartmentResponse,
            crate::application::departments::DepartmentItem,
            crate::application::departments::DepartmentList,
            crate::application::departments::DepartmentHierarchyNode,
        )
    ),
    tags(
        (name = "root", description = "Service metadata and health"),
        (name = "employees", description = "Employee management"),
        (name = "departments", description = "Department management and hierarchy"),
    ),
    info(
        title = "Employee Management API",
        description = "API for managing employees and departments",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;

/// App state over an in-memory SQLite database with migrations applied.
///
/// Used by tests that exercise the full router.
pub async fn create_test_app_state() -> Result<AppState> {
    let config = AppConfig {
        profile: "test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        db_max_connections: 1,
        ..Default::default()
    };

    let db = crate::db::init_pool(&config).await?;
    crate::db::run_migrations(&db).await?;
    Ok(AppState::new(config, db))
}
