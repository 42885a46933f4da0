//! HTTP client for the Employee Management API
//!
//! Used by front-ends that talk to the service over HTTP. Create calls never
//! fail on a rejected request: they return an [`ApiResponse`] carrying the
//! server's error messages. List calls come in a strict form returning
//! [`ClientError`] and an `*_or_empty` form that logs the failure and yields an
//! empty page instead.

use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::application::departments::{
    CreateDepartmentRequest, DepartmentHierarchyNode, DepartmentList,
};
use crate::application::employees::{CreateEmployeeRequest, EmployeeList};
use crate::handlers::departments::ListDepartmentsQuery;
use crate::handlers::employees::ListEmployeesQuery;

/// Message used when an error body carries nothing readable
pub const FALLBACK_ERROR: &str = "Request failed.";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("API returned {status}: {}", .errors.join("; "))]
    Api { status: u16, errors: Vec<String> },
}

/// Outcome of a create call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub success: bool,
    pub errors: Vec<String>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            errors: Vec::new(),
        }
    }

    pub fn fail(errors: Vec<String>) -> Self {
        Self {
            success: false,
            errors,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    /// Creates a client for the API rooted at `base_url`
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub async fn create_employee(
        &self,
        request: &CreateEmployeeRequest,
    ) -> Result<ApiResponse, ClientError> {
        self.post("api/Employee", request).await
    }

    pub async fn create_department(
        &self,
        request: &CreateDepartmentRequest,
    ) -> Result<ApiResponse, ClientError> {
        self.post("api/Department", request).await
    }

    pub async fn list_employees(
        &self,
        query: &ListEmployeesQuery,
    ) -> Result<EmployeeList, ClientError> {
        self.get("api/Employee", query).await
    }

    /// Like [`Self::list_employees`], but logs any failure and returns an empty list
    pub async fn list_employees_or_empty(&self, query: &ListEmployeesQuery) -> EmployeeList {
        self.list_employees(query).await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Failed to list employees");
            EmployeeList {
                employees: Vec::new(),
                total_count: 0,
            }
        })
    }

    pub async fn list_departments(
        &self,
        query: &ListDepartmentsQuery,
    ) -> Result<DepartmentList, ClientError> {
        self.get("api/Department", query).await
    }

    /// Like [`Self::list_departments`], but logs any failure and returns an empty list
    pub async fn list_departments_or_empty(&self, query: &ListDepartmentsQuery) -> DepartmentList {
        self.list_departments(query).await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Failed to list departments");
            DepartmentList {
                departments: Vec::new(),
                total_count: 0,
            }
        })
    }

    pub async fn department_hierarchy(
        &self,
        department_id: Uuid,
    ) -> Result<Vec<DepartmentHierarchyNode>, ClientError> {
        let path = format!("api/Department/{department_id}/SubDepartments");
        self.get(&path, &()).await
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        let response = self
            .http
            .post(self.base_url.join(path)?)
            .json(body)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(ApiResponse::ok());
        }

        let status = response.status().as_u16();
        let errors = read_errors(response).await;
        tracing::debug!(status, ?errors, path, "API rejected request");
        Ok(ApiResponse::fail(errors))
    }

    async fn get<Q, T>(&self, path: &str, query: &Q) -> Result<T, ClientError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .get(self.base_url.join(path)?)
            .query(query)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response.json().await?);
        }

        let status = response.status().as_u16();
        Err(ClientError::Api {
            status,
            errors: read_errors(response).await,
        })
    }
}

async fn read_errors(response: Response) -> Vec<String> {
    match response.json::<Value>().await {
        Ok(body) => extract_errors(&body),
        Err(_) => vec![FALLBACK_ERROR.to_string()],
    }
}

/// Pulls human-readable messages out of an error body.
///
/// Looks at `details.errors`, then a top-level `errors` list or
/// field-to-messages map, then `message` or `detail`.
pub fn extract_errors(body: &Value) -> Vec<String> {
    if let Some(errors) = body.pointer("/details/errors").and_then(string_list) {
        return errors;
    }

    if let Some(errors) = body.get("errors") {
        let collected = match errors {
            Value::Object(fields) => fields.values().filter_map(string_list).flatten().collect(),
            other => string_list(other).unwrap_or_default(),
        };
        if !collected.is_empty() {
            return collected;
        }
    }

    ["message", "detail"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(|text| vec![text.to_string()])
        .unwrap_or_else(|| vec![FALLBACK_ERROR.to_string()])
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}
