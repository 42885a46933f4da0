//! # Employee API Handlers

use axum::{
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use uuid::Uuid;

use super::{empty_as_none, page_request};
use crate::application::employees::{
    CreateEmployeeRequest, CreateEmployeeResponse, EmployeeItem, EmployeeList,
    GetEmployeeRequest, ListEmployeesRequest,
};
use crate::error::ApiError;
use crate::repositories::EmployeeFilter;
use crate::server::AppState;

/// Query parameters for the employee listing; every filter is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListEmployeesQuery {
    /// Case-insensitive substring of the employee name
    #[serde(default, alias = "Nome", skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    /// Exact CPF
    #[serde(default, alias = "CPF", skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    /// Case-insensitive substring of the RG
    #[serde(default, alias = "RG", skip_serializing_if = "Option::is_none")]
    pub rg: Option<String>,
    #[serde(
        default,
        alias = "DepartmentId",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub department_id: Option<Uuid>,
    /// One-based page number
    #[serde(
        default,
        alias = "Page",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub page: Option<u64>,
    /// Rows per page, at most 100
    #[serde(
        default,
        alias = "PageSize",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_size: Option<u64>,
}

impl ListEmployeesQuery {
    fn into_request(self) -> Result<ListEmployeesRequest, ApiError> {
        Ok(ListEmployeesRequest {
            page: page_request(self.page, self.page_size)?,
            filter: EmployeeFilter {
                name: self.nome,
                cpf: self.cpf,
                rg: self.rg,
                department_id: self.department_id,
            },
        })
    }
}

/// Create an employee
#[utoipa::path(
    post,
    path = "/api/Employee",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = CreateEmployeeResponse, headers(
            ("Location", description = "URL of the created employee")
        )),
        (status = 400, description = "Malformed request body", body = ApiError),
        (status = 422, description = "Validation failed", body = ApiError),
        (status = 500, description = "Persistence failure", body = ApiError)
    ),
    tag = "employees"
)]
pub async fn create_employee(
    State(state): State<AppState>,
    payload: Result<Json<CreateEmployeeRequest>, JsonRejection>,
) -> Result<
    (
        StatusCode,
        [(header::HeaderName, String); 1],
        Json<CreateEmployeeResponse>,
    ),
    ApiError,
> {
    let Json(request) = payload?;
    let created = state.mediator.send(request).await?;
    let location = format!("/api/Employee/{}", created.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

/// List employees matching the supplied filters
#[utoipa::path(
    get,
    path = "/api/Employee",
    params(ListEmployeesQuery),
    responses(
        (status = 200, description = "Matching employees", body = EmployeeList),
        (status = 400, description = "Invalid query parameters", body = ApiError)
    ),
    tag = "employees"
)]
pub async fn list_employees(
    State(state): State<AppState>,
    query: Result<Query<ListEmployeesQuery>, QueryRejection>,
) -> Result<Json<EmployeeList>, ApiError> {
    let Query(query) = query?;
    let list = state.mediator.send(query.into_request()?).await?;
    Ok(Json(list))
}

/// Get one employee by id
#[utoipa::path(
    get,
    path = "/api/Employee/{id}",
    params(
        ("id" = Uuid, Path, description = "Employee id")
    ),
    responses(
        (status = 200, description = "Employee found", body = EmployeeItem),
        (status = 404, description = "Employee not found", body = ApiError)
    ),
    tag = "employees"
)]
pub async fn get_employee(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<EmployeeItem>, ApiError> {
    let Path(id) = id?;
    let employee = state.mediator.send(GetEmployeeRequest { id }).await?;
    Ok(Json(employee))
}
