//! Employee use cases: create, filtered list and read by id

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::mediator::{Mediator, Pipeline, Request, RequestHandler, RequestValidator};
use super::validation::{Violations, is_valid_cpf_format};
use super::UseCaseError;
use crate::models::employee;
use crate::repositories::{
    DepartmentStore, EmployeeFilter, EmployeeStore, PageRequest, distinct_ids, is_unique_violation,
};

pub const CPF_ALREADY_REGISTERED: &str = "CPF is already registered.";
pub const EMPLOYEE_NOT_FOUND: &str = "Employee not found.";
const SAVE_FAILED: &str = "Failed to save the employee.";

/// Body of `POST /api/Employee`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    #[serde(default, alias = "Nome")]
    pub nome: String,
    #[serde(default, alias = "CPF")]
    pub cpf: String,
    #[serde(default, alias = "RG")]
    pub rg: Option<String>,
    #[serde(default, alias = "DepartmentId")]
    pub department_id: Uuid,
}

impl Request for CreateEmployeeRequest {
    type Response = CreateEmployeeResponse;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeResponse {
    pub id: Uuid,
    pub nome: String,
    pub cpf: String,
    pub rg: Option<String>,
    pub department_id: Uuid,
}

/// One row of the employee listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeItem {
    pub id: Uuid,
    pub nome: String,
    pub cpf: String,
    pub rg: Option<String>,
    pub department_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeList {
    pub employees: Vec<EmployeeItem>,
    pub total_count: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ListEmployeesRequest {
    pub filter: EmployeeFilter,
    pub page: Option<PageRequest>,
}

impl Request for ListEmployeesRequest {
    type Response = EmployeeList;
}

#[derive(Debug, Clone, Copy)]
pub struct GetEmployeeRequest {
    pub id: Uuid,
}

impl Request for GetEmployeeRequest {
    type Response = EmployeeItem;
}

/// Registers the employee pipelines on `mediator`
pub fn register(
    mediator: &mut Mediator,
    employees: Arc<dyn EmployeeStore>,
    departments: Arc<dyn DepartmentStore>,
) {
    mediator
        .register(
            Pipeline::new(CreateEmployeeHandler {
                employees: employees.clone(),
            })
            .with_validator(CreateEmployeeValidator {
                employees: employees.clone(),
                departments: departments.clone(),
            }),
        )
        .register(Pipeline::new(ListEmployeesHandler {
            employees: employees.clone(),
            departments: departments.clone(),
        }))
        .register(Pipeline::new(GetEmployeeHandler {
            employees,
            departments,
        }));
}

pub struct CreateEmployeeValidator {
    employees: Arc<dyn EmployeeStore>,
    departments: Arc<dyn DepartmentStore>,
}

#[async_trait]
impl RequestValidator<CreateEmployeeRequest> for CreateEmployeeValidator {
    async fn validate(&self, request: &CreateEmployeeRequest) -> Result<Vec<String>, UseCaseError> {
        let mut violations = Violations::new();

        violations.text("Nome", &request.nome, 2, 50);

        let cpf = request.cpf.trim();
        if cpf.is_empty() {
            violations.push("CPF is required.");
        } else {
            violations.check(!is_valid_cpf_format(cpf), "CPF is invalid.");
            violations.check(
                self.employees.get_by_cpf(cpf).await?.is_some(),
                CPF_ALREADY_REGISTERED,
            );
        }

        if let Some(rg) = request.rg.as_deref() {
            violations.check(
                rg.trim().chars().count() > 20,
                "RG must be at most 20 characters.",
            );
        }

        if request.department_id.is_nil() {
            violations.push("DepartmentId is required.");
        } else {
            violations.check(
                self.departments
                    .get_by_id(request.department_id)
                    .await?
                    .is_none(),
                "Department is not registered.",
            );
        }

        Ok(violations.into_inner())
    }
}

pub struct CreateEmployeeHandler {
    employees: Arc<dyn EmployeeStore>,
}

#[async_trait]
impl RequestHandler<CreateEmployeeRequest> for CreateEmployeeHandler {
    async fn handle(
        &self,
        request: CreateEmployeeRequest,
    ) -> Result<CreateEmployeeResponse, UseCaseError> {
        let employee = employee::Model::new(
            request.nome.trim().to_string(),
            request.cpf.trim().to_string(),
            request
                .rg
                .map(|rg| rg.trim().to_string())
                .filter(|rg| !rg.is_empty()),
            request.department_id,
        );

        match self.employees.add(employee.clone()).await {
            Ok(0) => {
                tracing::error!(employee_id = %employee.id, "Employee insert affected no rows");
                Err(UseCaseError::Persistence(SAVE_FAILED.to_string()))
            }
            Ok(_) => {
                tracing::info!(
                    employee_id = %employee.id,
                    department_id = %employee.department_id,
                    "Employee created"
                );
                Ok(CreateEmployeeResponse {
                    id: employee.id,
                    nome: employee.name,
                    cpf: employee.cpf,
                    rg: employee.rg,
                    department_id: employee.department_id,
                })
            }
            Err(err) if is_unique_violation(&err) => {
                Err(UseCaseError::validation(CPF_ALREADY_REGISTERED))
            }
            Err(err) => Err(err.into()),
        }
    }
}

pub struct ListEmployeesHandler {
    employees: Arc<dyn EmployeeStore>,
    departments: Arc<dyn DepartmentStore>,
}

#[async_trait]
impl RequestHandler<ListEmployeesRequest> for ListEmployeesHandler {
    async fn handle(&self, request: ListEmployeesRequest) -> Result<EmployeeList, UseCaseError> {
        let listing = self.employees.list(&request.filter, request.page).await?;
        let names = department_names(
            self.departments.as_ref(),
            listing.items.iter().map(|e| e.department_id),
        )
        .await?;

        Ok(EmployeeList {
            employees: listing
                .items
                .into_iter()
                .map(|e| to_item(e, &names))
                .collect(),
            total_count: listing.total_count,
        })
    }
}

pub struct GetEmployeeHandler {
    employees: Arc<dyn EmployeeStore>,
    departments: Arc<dyn DepartmentStore>,
}

#[async_trait]
impl RequestHandler<GetEmployeeRequest> for GetEmployeeHandler {
    async fn handle(&self, request: GetEmployeeRequest) -> Result<EmployeeItem, UseCaseError> {
        let employee = self
            .employees
            .get_by_id(request.id)
            .await?
            .ok_or_else(|| UseCaseError::NotFound(EMPLOYEE_NOT_FOUND.to_string()))?;

        let names =
            department_names(self.departments.as_ref(), [employee.department_id]).await?;
        Ok(to_item(employee, &names))
    }
}

async fn department_names(
    departments: &dyn DepartmentStore,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, String>, UseCaseError> {
    let ids = distinct_ids(ids);
    Ok(departments
        .get_by_ids(&ids)
        .await?
        .into_iter()
        .map(|d| (d.id, d.name))
        .collect())
}

fn to_item(employee: employee::Model, department_names: &HashMap<Uuid, String>) -> EmployeeItem {
    EmployeeItem {
        department_name: department_names.get(&employee.department_id).cloned(),
        id: employee.id,
        nome: employee.name,
        cpf: employee.cpf,
        rg: employee.rg,
    }
}
