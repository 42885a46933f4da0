//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the Employee Management API.

pub mod departments;
pub mod employees;

use std::{fmt::Display, str::FromStr};

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Deserializer, de};

use crate::db;
use crate::error::ApiError;
use crate::models::{HealthStatus, ServiceInfo};
use crate::repositories::{MAX_PAGE_SIZE, PageRequest};
use crate::server::AppState;

/// Page size used when only `page` is supplied
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Liveness and database connectivity probe
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are healthy", body = HealthStatus),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "root"
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    db::health_check(&state.db).await.map_err(|err| {
        tracing::warn!(error = %err, "Health check failed");
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Database unavailable",
        )
        .with_retry_after(5)
    })?;

    Ok(Json(HealthStatus::ok()))
}

/// Resolves optional `page`/`pageSize` query values into a page request.
///
/// Returns `None` when neither is given so the full result set is returned.
pub fn page_request(
    page: Option<u64>,
    page_size: Option<u64>,
) -> Result<Option<PageRequest>, ApiError> {
    if page.is_none() && page_size.is_none() {
        return Ok(None);
    }

    let page = page.unwrap_or(1);
    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    if page == 0 {
        return Err(ApiError::bad_request("page must be at least 1"));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ApiError::bad_request(format!(
            "pageSize must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    let request = PageRequest { page, page_size };
    if request.offset().is_none() {
        return Err(ApiError::bad_request("page is too large for the given pageSize"));
    }

    Ok(Some(request))
}

/// Treats a missing or blank query value as absent, otherwise parses it
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(de::Error::custom),
    }
}
