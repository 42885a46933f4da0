//! Test utilities for HTTP-level testing.
//!
//! Starts the full router on a random local port over an in-memory SQLite
//! database with every migration applied.

#![allow(dead_code)]

use anyhow::Result;
use employee_management::server::{create_app, create_test_app_state};
use reqwest::{Client, Response};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use uuid::Uuid;

use employee_management::models::department;

/// A running server plus a handle on its database
pub struct TestServer {
    pub base_url: String,
    pub db: DatabaseConnection,
    pub client: Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post(&self, path: &str, body: Value) -> Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Creates a department through the API and returns its id
    pub async fn create_department(
        &self,
        nome: &str,
        manager_id: Option<Uuid>,
        parent_department_id: Option<Uuid>,
    ) -> Uuid {
        let response = self
            .post(
                "/api/Department",
                json!({
                    "nome": nome,
                    "managerId": manager_id,
                    "parentDepartmentId": parent_department_id,
                }),
            )
            .await;
        assert_eq!(response.status(), 201, "department {nome} should be created");
        created_id(response).await
    }

    /// Creates an employee through the API and returns its id
    pub async fn create_employee(&self, nome: &str, cpf: &str, department_id: Uuid) -> Uuid {
        let response = self
            .post(
                "/api/Employee",
                json!({ "nome": nome, "cpf": cpf, "departmentId": department_id }),
            )
            .await;
        assert_eq!(response.status(), 201, "employee {nome} should be created");
        created_id(response).await
    }

    /// Points a department at a new parent directly in the database
    pub async fn set_parent(&self, department_id: Uuid, parent: Option<Uuid>) -> Result<()> {
        let existing = department::Entity::find_by_id(department_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow::anyhow!("department {department_id} missing"))?;

        let mut active: department::ActiveModel = existing.into();
        active.parent_department_id = Set(parent);
        active.update(&self.db).await?;
        Ok(())
    }
}

async fn created_id(response: Response) -> Uuid {
    let body: Value = response.json().await.expect("Failed to parse JSON");
    body["id"]
        .as_str()
        .and_then(|id| id.parse().ok())
        .expect("created resource carries an id")
}

/// Starts the application on 127.0.0.1 with a fresh database
pub async fn start_test_server() -> TestServer {
    let state = create_test_app_state()
        .await
        .expect("Failed to build test app state");
    let db = state.db.clone();
    let app = create_app(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{addr}"),
        db,
        client: Client::new(),
    }
}
