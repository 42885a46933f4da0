//! Tests for the HTTP client, against wiremock and against the real router.

mod test_utils;

use employee_management::application::departments::CreateDepartmentRequest;
use employee_management::application::employees::CreateEmployeeRequest;
use employee_management::client::{ApiClient, ClientError, FALLBACK_ERROR};
use employee_management::handlers::departments::ListDepartmentsQuery;
use employee_management::handlers::employees::ListEmployeesQuery;
use serde_json::json;
use test_utils::start_test_server;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn create_employee_surfaces_validation_errors() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Employee"))
        .and(body_partial_json(json!({ "nome": "Ana", "cpf": "bad" })))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "code": "VALIDATION_FAILED",
            "message": "One or more validation errors occurred.",
            "details": { "errors": ["CPF is invalid.", "DepartmentId is required."] }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&mock_server.uri()).unwrap();
    let response = client
        .create_employee(&CreateEmployeeRequest {
            nome: "Ana".to_string(),
            cpf: "bad".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(
        response.errors,
        vec!["CPF is invalid.", "DepartmentId is required."]
    );
}

#[tokio::test]
async fn create_department_falls_back_on_unreadable_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/Department"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&mock_server.uri()).unwrap();
    let response = client
        .create_department(&CreateDepartmentRequest {
            nome: "Ops".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(response.errors, vec![FALLBACK_ERROR]);
}

#[tokio::test]
async fn list_employees_sends_filters_as_query() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Employee"))
        .and(query_param("nome", "ana"))
        .and(query_param("pageSize", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "employees": [{
                "id": Uuid::nil(),
                "nome": "Ana Souza",
                "cpf": "123.456.789-09",
                "rg": null,
                "departmentName": "Engineering"
            }],
            "totalCount": 1
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&mock_server.uri()).unwrap();
    let list = client
        .list_employees(&ListEmployeesQuery {
            nome: Some("ana".to_string()),
            page_size: Some(5),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(list.total_count, 1);
    assert_eq!(list.employees[0].department_name.as_deref(), Some("Engineering"));
}

#[tokio::test]
async fn list_departments_error_is_typed_or_empty() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/Department"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "VALIDATION_FAILED",
            "message": "page must be at least 1"
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(&mock_server.uri()).unwrap();
    let query = ListDepartmentsQuery {
        page: Some(0),
        ..Default::default()
    };

    let err = client.list_departments(&query).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Api { status: 400, ref errors } if errors == &vec!["page must be at least 1".to_string()]
    ));

    let empty = client.list_departments_or_empty(&query).await;
    assert!(empty.departments.is_empty());
    assert_eq!(empty.total_count, 0);
}

#[tokio::test]
async fn list_employees_or_empty_survives_unreachable_server() {
    let client = ApiClient::new("http://127.0.0.1:9").unwrap();

    let list = client
        .list_employees_or_empty(&ListEmployeesQuery::default())
        .await;

    assert!(list.employees.is_empty());
    assert_eq!(list.total_count, 0);
}

#[tokio::test]
async fn round_trip_against_running_service() {
    let server = start_test_server().await;
    let client = ApiClient::new(&server.base_url).unwrap();

    let created = client
        .create_department(&CreateDepartmentRequest {
            nome: "Headquarters".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(created.success, "{:?}", created.errors);

    let departments = client
        .list_departments(&ListDepartmentsQuery {
            nome: Some("head".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(departments.total_count, 1);
    let hq = &departments.departments[0];

    let duplicate = client
        .create_department(&CreateDepartmentRequest {
            nome: "Headquarters".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(
        duplicate.errors,
        vec!["A department with this name already exists."]
    );

    let hired = client
        .create_employee(&CreateEmployeeRequest {
            nome: "Rita Dias".to_string(),
            cpf: "555.666.777-88".to_string(),
            rg: None,
            department_id: hq.id,
        })
        .await
        .unwrap();
    assert!(hired.success, "{:?}", hired.errors);

    let employees = client
        .list_employees(&ListEmployeesQuery {
            department_id: Some(hq.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(employees.employees[0].nome, "Rita Dias");

    let chain = client.department_hierarchy(hq.id).await.unwrap();
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].nome, "Headquarters");
    assert!(chain[0].parent.is_none());
}
