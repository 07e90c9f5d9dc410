#![allow(dead_code)]

pub mod memory;

use std::net::SocketAddr;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use buildtrack::config::{Config, RegistrationMode};

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: &str,
    ) -> (Value, StatusCode) {
        let body = json!({ "email": email, "password": password, "name": name, "role": role });
        self.post(&self.url("/api/auth/register"), None, &body).await
    }

    pub async fn login(&self, email: &str, password: &str) -> (Value, StatusCode) {
        let body = json!({ "email": email, "password": password });
        self.post(&self.url("/api/auth/login"), None, &body).await
    }

    /// Register a user with `role`, log in, and return (token, user id).
    pub async fn user_with_role(&self, email: &str, role: &str) -> (String, Uuid) {
        let (body, status) = self.register(email, "password123", "Test User", role).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

        let (body, status) = self.login(email, "password123").await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        let token = body["token"].as_str().unwrap().to_string();

        let user = buildtrack::db::users::find_by_email(&self.pool, email)
            .await
            .unwrap()
            .expect("registered user missing");
        (token, user.id)
    }

    /// Make an authenticated GET request.
    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated POST request with JSON body.
    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        self.post(&self.url(path), Some(token), body).await
    }

    async fn post(&self, url: &str, token: Option<&str>, body: &Value) -> (Value, StatusCode) {
        let mut req = self.client.post(url).json(body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Insert an access event directly, with an explicit (possibly backdated)
    /// RFC 3339 timestamp.
    pub async fn insert_access(
        &self,
        user_id: Uuid,
        resource: &str,
        resource_id: Option<&str>,
        action: &str,
        occurred_at: &str,
    ) {
        let occurred_at = chrono::DateTime::parse_from_rfc3339(occurred_at)
            .expect("bad test timestamp")
            .with_timezone(&chrono::Utc);
        sqlx::query(
            "INSERT INTO access_events (id, user_id, resource, resource_id, action, occurred_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(resource)
        .bind(resource_id)
        .bind(action)
        .bind(occurred_at)
        .execute(&self.pool)
        .await
        .expect("insert access event failed");
    }

    pub async fn create_project(&self, name: &str) -> Uuid {
        let project = buildtrack::db::projects::create(
            &self.pool,
            &buildtrack::db::projects::NewProject {
                name,
                address: "Av. Juarez 123",
                lat: 20.67,
                lng: -103.34,
                status: buildtrack::models::ProjectStatus::InProgress,
                start_date: chrono::Utc::now(),
                client: "Municipio",
            },
        )
        .await
        .expect("create project failed");
        project.id
    }
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!("buildtrack_test_{}", Uuid::now_v7().simple());

    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        jwt_secret: "test-jwt-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        registration: RegistrationMode::Open,
        max_body_size: 1_048_576,
        report_timeout: Duration::from_secs(30),
        log_level: "warn".to_string(),
    };

    let (app, _state) = buildtrack::build_app(pool.clone(), config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        pool,
        client: Client::new(),
        db_name,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
