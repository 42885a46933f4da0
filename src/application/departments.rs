//! Department use cases: create, filtered list, read by id and the
//! parent-chain hierarchy

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::UseCaseError;
use super::mediator::{Mediator, Pipeline, Request, RequestHandler, RequestValidator};
use super::validation::Violations;
use crate::models::department;
use crate::repositories::{
    DepartmentFilter, DepartmentStore, EmployeeStore, PageRequest, distinct_ids,
    is_unique_violation,
};

pub const DEPARTMENT_NAME_TAKEN: &str = "A department with this name already exists.";
pub const DEPARTMENT_NOT_FOUND: &str = "Department not found.";
const SAVE_FAILED: &str = "Failed to save the department.";

/// Body of `POST /api/Department`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentRequest {
    #[serde(default, alias = "Nome")]
    pub nome: String,
    #[serde(default, alias = "ManagerId")]
    pub manager_id: Option<Uuid>,
    #[serde(default, alias = "ParentDepartmentId")]
    pub parent_department_id: Option<Uuid>,
}

impl Request for CreateDepartmentRequest {
    type Response = CreateDepartmentResponse;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentResponse {
    pub id: Uuid,
    pub nome: String,
    pub manager_id: Option<Uuid>,
    pub parent_department_id: Option<Uuid>,
}

/// One row of the department listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentItem {
    pub id: Uuid,
    pub nome: String,
    pub manager_name: Option<String>,
    pub parent_department_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentList {
    pub departments: Vec<DepartmentItem>,
    pub total_count: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ListDepartmentsRequest {
    pub filter: DepartmentFilter,
    pub page: Option<PageRequest>,
}

impl Request for ListDepartmentsRequest {
    type Response = DepartmentList;
}

#[derive(Debug, Clone, Copy)]
pub struct GetDepartmentRequest {
    pub id: Uuid,
}

impl Request for GetDepartmentRequest {
    type Response = DepartmentItem;
}

/// A department and, nested inside it, the chain of its ancestors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DepartmentHierarchyNode {
    pub nome: String,
    #[schema(no_recursion)]
    pub parent: Option<Box<DepartmentHierarchyNode>>,
}

#[derive(Debug, Clone, Copy)]
pub struct GetDepartmentHierarchyRequest {
    pub department_id: Uuid,
}

impl Request for GetDepartmentHierarchyRequest {
    type Response = Vec<DepartmentHierarchyNode>;
}

/// Registers the department pipelines on `mediator`
pub fn register(
    mediator: &mut Mediator,
    departments: Arc<dyn DepartmentStore>,
    employees: Arc<dyn EmployeeStore>,
) {
    mediator
        .register(
            Pipeline::new(CreateDepartmentHandler {
                departments: departments.clone(),
            })
            .with_validator(CreateDepartmentValidator {
                departments: departments.clone(),
                employees: employees.clone(),
            }),
        )
        .register(Pipeline::new(ListDepartmentsHandler {
            departments: departments.clone(),
            employees: employees.clone(),
        }))
        .register(Pipeline::new(GetDepartmentHandler {
            departments: departments.clone(),
            employees,
        }))
        .register(Pipeline::new(GetDepartmentHierarchyHandler { departments }));
}

pub struct CreateDepartmentValidator {
    departments: Arc<dyn DepartmentStore>,
    employees: Arc<dyn EmployeeStore>,
}

#[async_trait]
impl RequestValidator<CreateDepartmentRequest> for CreateDepartmentValidator {
    async fn validate(
        &self,
        request: &CreateDepartmentRequest,
    ) -> Result<Vec<String>, UseCaseError> {
        let mut violations = Violations::new();

        if violations.text("Nome", &request.nome, 2, 200) {
            violations.check(
                self.departments
                    .get_by_name(request.nome.trim())
                    .await?
                    .is_some(),
                DEPARTMENT_NAME_TAKEN,
            );
        }

        if let Some(manager_id) = violations.optional_id(request.manager_id, "Manager is invalid.")
        {
            violations.check(
                self.employees.get_by_id(manager_id).await?.is_none(),
                "Manager is not registered.",
            );
        }

        if let Some(parent_id) = violations.optional_id(
            request.parent_department_id,
            "Parent department is invalid.",
        ) {
            violations.check(
                self.departments.get_by_id(parent_id).await?.is_none(),
                "Parent department is not registered.",
            );
        }

        Ok(violations.into_inner())
    }
}

pub struct CreateDepartmentHandler {
    departments: Arc<dyn DepartmentStore>,
}

#[async_trait]
impl RequestHandler<CreateDepartmentRequest> for CreateDepartmentHandler {
    async fn handle(
        &self,
        request: CreateDepartmentRequest,
    ) -> Result<CreateDepartmentResponse, UseCaseError> {
        let department = department::Model::new(
            request.nome.trim().to_string(),
            request.manager_id,
            request.parent_department_id,
        );

        match self.departments.add(department.clone()).await {
            Ok(0) => {
                tracing::error!(department_id = %department.id, "Department insert affected no rows");
                Err(UseCaseError::Persistence(SAVE_FAILED.to_string()))
            }
            Ok(_) => {
                tracing::info!(department_id = %department.id, "Department created");
                Ok(CreateDepartmentResponse {
                    id: department.id,
                    nome: department.name,
                    manager_id: department.manager_id,
                    parent_department_id: department.parent_department_id,
                })
            }
            Err(err) if is_unique_violation(&err) => {
                Err(UseCaseError::validation(DEPARTMENT_NAME_TAKEN))
            }
            Err(err) => Err(err.into()),
        }
    }
}

pub struct ListDepartmentsHandler {
    departments: Arc<dyn DepartmentStore>,
    employees: Arc<dyn EmployeeStore>,
}

#[async_trait]
impl RequestHandler<ListDepartmentsRequest> for ListDepartmentsHandler {
    async fn handle(
        &self,
        request: ListDepartmentsRequest,
    ) -> Result<DepartmentList, UseCaseError> {
        let listing = self.departments.list(&request.filter, request.page).await?;
        let names = RelatedNames::load(
            self.departments.as_ref(),
            self.employees.as_ref(),
            &listing.items,
        )
        .await?;

        Ok(DepartmentList {
            departments: listing
                .items
                .into_iter()
                .map(|d| names.to_item(d))
                .collect(),
            total_count: listing.total_count,
        })
    }
}

pub struct GetDepartmentHandler {
    departments: Arc<dyn DepartmentStore>,
    employees: Arc<dyn EmployeeStore>,
}

#[async_trait]
impl RequestHandler<GetDepartmentRequest> for GetDepartmentHandler {
    async fn handle(&self, request: GetDepartmentRequest) -> Result<DepartmentItem, UseCaseError> {
        let department = self
            .departments
            .get_by_id(request.id)
            .await?
            .ok_or_else(|| UseCaseError::NotFound(DEPARTMENT_NOT_FOUND.to_string()))?;

        let names = RelatedNames::load(
            self.departments.as_ref(),
            self.employees.as_ref(),
            std::slice::from_ref(&department),
        )
        .await?;
        Ok(names.to_item(department))
    }
}

pub struct GetDepartmentHierarchyHandler {
    departments: Arc<dyn DepartmentStore>,
}

#[async_trait]
impl RequestHandler<GetDepartmentHierarchyRequest> for GetDepartmentHierarchyHandler {
    async fn handle(
        &self,
        request: GetDepartmentHierarchyRequest,
    ) -> Result<Vec<DepartmentHierarchyNode>, UseCaseError> {
        let start = self
            .departments
            .get_by_id(request.department_id)
            .await?
            .ok_or_else(|| UseCaseError::NotFound(DEPARTMENT_NOT_FOUND.to_string()))?;

        let mut visited = HashSet::from([start.id]);
        let mut names = vec![start.name];
        let mut next = start.parent_department_id;

        while let Some(parent_id) = next {
            if !visited.insert(parent_id) {
                tracing::warn!(
                    department_id = %request.department_id,
                    repeated_id = %parent_id,
                    "Department hierarchy contains a cycle"
                );
                return Err(UseCaseError::HierarchyCycle(parent_id));
            }

            match self.departments.get_by_id(parent_id).await? {
                Some(parent) => {
                    names.push(parent.name);
                    next = parent.parent_department_id;
                }
                None => {
                    tracing::warn!(
                        department_id = %request.department_id,
                        missing_parent_id = %parent_id,
                        "Parent department missing, hierarchy truncated"
                    );
                    next = None;
                }
            }
        }

        Ok(nest_chain(names).into_iter().collect())
    }
}

/// Folds names ordered child-first into nested nodes, the first name outermost
pub fn nest_chain(names: Vec<String>) -> Option<DepartmentHierarchyNode> {
    names.into_iter().rev().fold(None, |parent, nome| {
        Some(DepartmentHierarchyNode {
            nome,
            parent: parent.map(Box::new),
        })
    })
}

/// Manager and parent names for a batch of departments, one `IN` query each
struct RelatedNames {
    managers: HashMap<Uuid, String>,
    parents: HashMap<Uuid, String>,
}

impl RelatedNames {
    async fn load(
        departments: &dyn DepartmentStore,
        employees: &dyn EmployeeStore,
        rows: &[department::Model],
    ) -> Result<Self, UseCaseError> {
        let manager_ids = distinct_ids(rows.iter().filter_map(|d| d.manager_id));
        let parent_ids = distinct_ids(rows.iter().filter_map(|d| d.parent_department_id));

        let managers = employees
            .get_by_ids(&manager_ids)
            .await?
            .into_iter()
            .map(|e| (e.id, e.name))
            .collect();
        let parents = departments
            .get_by_ids(&parent_ids)
            .await?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect();

        Ok(Self { managers, parents })
    }

    fn to_item(&self, department: department::Model) -> DepartmentItem {
        DepartmentItem {
            manager_name: department
                .manager_id
                .and_then(|id| self.managers.get(&id).cloned()),
            parent_department_name: department
                .parent_department_id
                .and_then(|id| self.parents.get(&id).cloned()),
            id: department.id,
            nome: department.name,
        }
    }
}
