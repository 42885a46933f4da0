//! # Data Models
//!
//! This module contains all the data models used throughout the Employee Management API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod department;
pub mod employee;

pub use department::Entity as Department;
pub use employee::Entity as Employee;

/// Case-folds a value for storage in, or comparison against, a `*_search` column.
///
/// SQLite's `LOWER()` folds ASCII only, so filters never fold in SQL.
pub fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "employee-management".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Health probe response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    /// Overall service status
    pub status: String,
    /// Database connectivity status
    pub database: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            database: "ok".to_string(),
        }
    }
}
