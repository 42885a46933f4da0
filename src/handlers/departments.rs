//! # Department API Handlers

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
use crate::application::departments::{
    CreateDepartmentRequest, CreateDepartmentResponse, DepartmentHierarchyNode, DepartmentItem,
    DepartmentList, GetDepartmentHierarchyRequest, GetDepartmentRequest, ListDepartmentsRequest,
};
use crate::error::ApiError;
use crate::repositories::DepartmentFilter;
use crate::server::AppState;

/// Query parameters for the department listing; every filter is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListDepartmentsQuery {
    /// Case-insensitive substring of the department name
    #[serde(default, alias = "Nome", skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    /// Case-insensitive substring of the manager's name
    #[serde(default, alias = "ManagerName", skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,
    /// Case-insensitive substring of the parent department's name
    #[serde(
        default,
        alias = "ParentDepartmentName",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_department_name: Option<String>,
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

impl ListDepartmentsQuery {
    fn into_request(self) -> Result<ListDepartmentsRequest, ApiError> {
        Ok(ListDepartmentsRequest {
            page: page_request(self.page, self.page_size)?,
            filter: DepartmentFilter {
                name: self.nome,
                manager_name: self.manager_name,
                parent_department_name: self.parent_department_name,
            },
        })
    }
}

/// Create a department
#[utoipa::path(
    post,
    path = "/api/Department",
    request_body = CreateDepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = CreateDepartmentResponse, headers(
            ("Location", description = "URL of the created department")
        )),
        (status = 400, description = "Malformed request body", body = ApiError),
        (status = 422, description = "Validation failed", body = ApiError),
        (status = 500, description = "Persistence failure", body = ApiError)
    ),
    tag = "departments"
)]
pub async fn create_department(
    State(state): State<AppState>,
    payload: Result<Json<CreateDepartmentRequest>, JsonRejection>,
) -> Result<
    (
        StatusCode,
        [(header::HeaderName, String); 1],
        Json<CreateDepartmentResponse>,
    ),
    ApiError,
> {
    let Json(request) = payload?;
    let created = state.mediator.send(request).await?;
    let location = format!("/api/Department/{}", created.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

/// List departments matching the supplied filters
#[utoipa::path(
    get,
    path = "/api/Department",
    params(ListDepartmentsQuery),
    responses(
        (status = 200, description = "Matching departments", body = DepartmentList),
        (status = 400, description = "Invalid query parameters", body = ApiError)
    ),
    tag = "departments"
)]
pub async fn list_departments(
    State(state): State<AppState>,
    query: Result<Query<ListDepartmentsQuery>, QueryRejection>,
) -> Result<Json<DepartmentList>, ApiError> {
    let Query(query) = query?;
    let list = state.mediator.send(query.into_request()?).await?;
    Ok(Json(list))
}

/// Get one department by id
#[utoipa::path(
    get,
    path = "/api/Department/{id}",
    params(
        ("id" = Uuid, Path, description = "Department id")
    ),
    responses(
        (status = 200, description = "Department found", body = DepartmentItem),
        (status = 404, description = "Department not found", body = ApiError)
    ),
    tag = "departments"
)]
pub async fn get_department(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<DepartmentItem>, ApiError> {
    let Path(id) = id?;
    let department = state.mediator.send(GetDepartmentRequest { id }).await?;
    Ok(Json(department))
}

/// The department followed by its chain of ancestors, nested child first
#[utoipa::path(
    get,
    path = "/api/Department/{id}/SubDepartments",
    params(
        ("id" = Uuid, Path, description = "Department id")
    ),
    responses(
        (status = 200, description = "Single-element list holding the nested chain", body = [DepartmentHierarchyNode]),
        (status = 404, description = "Department not found", body = ApiError),
        (status = 409, description = "Parent chain contains a cycle", body = ApiError)
    ),
    tag = "departments"
)]
pub async fn get_department_hierarchy(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<DepartmentHierarchyNode>>, ApiError> {
    let Path(department_id) = id?;
    let chain = state
        .mediator
        .send(GetDepartmentHierarchyRequest { department_id })
        .await?;
    Ok(Json(chain))
}
