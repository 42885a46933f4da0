//! HTTP tests for the /api/Department endpoints and the hierarchy walk.

mod test_utils;

use serde_json::{Value, json};
use test_utils::start_test_server;
use uuid::Uuid;

fn errors_of(body: &Value) -> Vec<String> {
    body["details"]["errors"]
        .as_array()
        .expect("validation body lists errors")
        .iter()
        .map(|e| e.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_create_department_returns_created() {
    let server = start_test_server().await;

    let response = server
        .post("/api/Department", json!({ "nome": " Operations " }))
        .await;

    assert_eq!(response.status(), 201);
    assert!(response.headers().contains_key("location"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["nome"], "Operations");
    assert_eq!(body["managerId"], Value::Null);
    assert_eq!(body["parentDepartmentId"], Value::Null);
}

#[tokio::test]
async fn test_create_department_with_manager_and_parent() {
    let server = start_test_server().await;
    let parent = server.create_department("Operations", None, None).await;
    let manager = server
        .create_employee("Carla Mendes", "222.333.444-55", parent)
        .await;

    let child = server
        .create_department("Logistics", Some(manager), Some(parent))
        .await;

    let fetched: Value = server
        .get(&format!("/api/Department/{child}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["nome"], "Logistics");
    assert_eq!(fetched["managerName"], "Carla Mendes");
    assert_eq!(fetched["parentDepartmentName"], "Operations");
}

#[tokio::test]
async fn test_create_department_reports_invalid_references() {
    let server = start_test_server().await;

    let response = server
        .post(
            "/api/Department",
            json!({
                "nome": "X",
                "managerId": Uuid::nil(),
                "parentDepartmentId": Uuid::new_v4(),
            }),
        )
        .await;

    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        errors_of(&body),
        vec![
            "Nome must be at least 2 characters.",
            "Manager is invalid.",
            "Parent department is not registered.",
        ]
    );
}

#[tokio::test]
async fn test_create_department_rejects_duplicate_name() {
    let server = start_test_server().await;
    server.create_department("Finance", None, None).await;

    let response = server
        .post("/api/Department", json!({ "Nome": "Finance" }))
        .await;

    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        errors_of(&body),
        vec!["A department with this name already exists."]
    );
}

#[tokio::test]
async fn test_list_departments_filters_by_related_names() {
    let server = start_test_server().await;
    let company = server.create_department("Company", None, None).await;
    let manager = server
        .create_employee("Paula Ramos", "300.000.000-01", company)
        .await;
    server
        .create_department("Research", Some(manager), Some(company))
        .await;
    server
        .create_department("Support", None, Some(company))
        .await;

    let all: Value = server.get("/api/Department").await.json().await.unwrap();
    assert_eq!(all["totalCount"], 3);

    let by_manager: Value = server
        .get("/api/Department?managerName=paula")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(by_manager["totalCount"], 1);
    assert_eq!(by_manager["departments"][0]["nome"], "Research");
    assert_eq!(by_manager["departments"][0]["managerName"], "Paula Ramos");

    let by_parent: Value = server
        .get("/api/Department?parentDepartmentName=COMP")
        .await
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = by_parent["departments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["nome"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Research", "Support"]);

    let paged: Value = server
        .get("/api/Department?pageSize=1&page=3")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(paged["totalCount"], 3);
    assert_eq!(paged["departments"][0]["nome"], "Support");
}

#[tokio::test]
async fn test_get_department_not_found() {
    let server = start_test_server().await;

    let response = server
        .get(&format!("/api/Department/{}", Uuid::new_v4()))
        .await;

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Department not found.");
}

#[tokio::test]
async fn test_hierarchy_nests_ancestors_outward() {
    let server = start_test_server().await;
    let company = server.create_department("Company", None, None).await;
    let division = server
        .create_department("Division", None, Some(company))
        .await;
    let team = server.create_department("Team", None, Some(division)).await;

    let response = server
        .get(&format!("/api/Department/{team}/SubDepartments"))
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!([{
            "nome": "Team",
            "parent": {
                "nome": "Division",
                "parent": { "nome": "Company", "parent": null }
            }
        }])
    );
}

#[tokio::test]
async fn test_hierarchy_of_root_department_has_no_parent() {
    let server = start_test_server().await;
    let root = server.create_department("Board", None, None).await;

    let body: Value = server
        .get(&format!("/api/Department/{root}/SubDepartments"))
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!([{ "nome": "Board", "parent": null }]));
}

#[tokio::test]
async fn test_hierarchy_of_unknown_department_is_not_found() {
    let server = start_test_server().await;

    let response = server
        .get(&format!("/api/Department/{}/SubDepartments", Uuid::new_v4()))
        .await;

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_hierarchy_cycle_is_conflict() {
    let server = start_test_server().await;
    let alpha = server.create_department("Alpha", None, None).await;
    let beta = server.create_department("Beta", None, Some(alpha)).await;
    server.set_parent(alpha, Some(beta)).await.unwrap();

    let response = server
        .get(&format!("/api/Department/{beta}/SubDepartments"))
        .await;

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "HIERARCHY_CYCLE");
    assert_eq!(body["details"]["departmentId"], beta.to_string());
}
