#![allow(dead_code)]

use secrecy::Secret;
use serde_json::{json, Value};
use service_core::config::{Config as CoreConfig, Environment};
use std::sync::Arc;
use student_service::config::{MongoConfig, StoreBackend, StoreConfig, StudentConfig};
use student_service::services::{MongoDb, StudentRepository};
use student_service::startup::Application;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub repository: Arc<dyn StudentRepository>,
    pub client: reqwest::Client,
    mongo: Option<(MongoDb, String)>,
}

pub fn test_config(backend: StoreBackend, db_name: &str) -> StudentConfig {
    StudentConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            environment: Environment::Dev,
        },
        mongodb: MongoConfig {
            uri: Secret::new(
                std::env::var("TEST_MONGODB_URI")
                    .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            ),
            database: db_name.to_string(),
        },
        store: StoreConfig { backend },
    }
}

impl TestApp {
    /// Spawn the service on a random port with the in-memory store.
    pub async fn spawn() -> Self {
        let config = test_config(StoreBackend::Memory, "unused");
        Self::spawn_with(config, None).await
    }

    /// Spawn the service against a throwaway MongoDB database.
    pub async fn spawn_with_mongo() -> Self {
        let db_name = format!("student_test_{}", Uuid::new_v4());
        let config = test_config(StoreBackend::MongoDb, &db_name);

        let db = MongoDb::connect(
            &std::env::var("TEST_MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            &db_name,
        )
        .await
        .expect("Failed to connect to MongoDB");

        Self::spawn_with(config, Some((db, db_name))).await
    }

    async fn spawn_with(config: StudentConfig, mongo: Option<(MongoDb, String)>) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let repository = app.repository();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            repository,
            client,
            mongo,
        }
    }

    pub async fn create_student(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/students", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Create a student and return its id, asserting the 201.
    pub async fn create_student_id(&self, name: &str, age: i32, city: &str, country: &str) -> String {
        let response = self
            .create_student(&student_body(name, age, city, country))
            .await;
        assert_eq!(response.status().as_u16(), 201);

        let body: Value = response.json().await.expect("Failed to parse JSON");
        body["id"].as_str().expect("id in response").to_string()
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn patch_student(&self, id: &str, body: &Value) -> reqwest::Response {
        self.client
            .patch(format!("{}/students/{}", self.address, id))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete_student(&self, id: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}/students/{}", self.address, id))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub fn database_name(&self) -> Option<&str> {
        self.mongo.as_ref().map(|(_, name)| name.as_str())
    }

    /// Drop the MongoDB test database, if one was created.
    pub async fn cleanup(&self) {
        if let Some((db, db_name)) = &self.mongo {
            let _ = db.client().database(db_name).drop(None).await;
        }
    }
}

pub fn student_body(name: &str, age: i32, city: &str, country: &str) -> Value {
    json!({
        "name": name,
        "age": age,
        "address": { "city": city, "country": country }
    })
}
