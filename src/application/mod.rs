//! # Application Layer
//!
//! Use cases for employees and departments, the validators that guard them
//! and the [`Mediator`] that routes each request value to its pipeline.

pub mod departments;
pub mod employees;
pub mod mediator;
pub mod validation;

use std::sync::Arc;

use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::repositories::{DepartmentStore, EmployeeStore};

pub use mediator::{Mediator, Pipeline, Request, RequestHandler, RequestValidator};

/// Failures a use case reports to its caller
#[derive(Debug, Error)]
pub enum UseCaseError {
    /// One or more validation rules failed; every message is kept
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0}")]
    NotFound(String),

    /// The parent chain of a department revisits `0`
    #[error("department hierarchy contains a cycle at {0}")]
    HierarchyCycle(Uuid),

    /// The store accepted the write but reported nothing persisted
    #[error("{0}")]
    Persistence(String),

    #[error(transparent)]
    Database(#[from] DbErr),

    /// No pipeline registered for the request type
    #[error("no handler registered for {0}")]
    Unhandled(&'static str),
}

impl UseCaseError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }
}

/// Builds a mediator with every employee and department pipeline registered
pub fn build_mediator(
    employees: Arc<dyn EmployeeStore>,
    departments: Arc<dyn DepartmentStore>,
) -> Mediator {
    let mut mediator = Mediator::new();
    employees::register(&mut mediator, employees.clone(), departments.clone());
    departments::register(&mut mediator, departments, employees);
    mediator
}
