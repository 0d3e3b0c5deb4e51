use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::json;
use tempfile::TempDir;

use garagekeep::{
    app::build_app,
    config::{AppConfig, JwtConfig},
    mailer::Mailer,
    state::AppState,
};

/// Mailer that records every verification link instead of sending anything,
/// so tests can pull tokens out of "delivered" mail.
#[derive(Default)]
pub struct CapturingMailer {
    pub links: Mutex<Vec<String>>,
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send_verification(
        &self,
        _recipient: &str,
        _username: &str,
        link: &str,
    ) -> anyhow::Result<()> {
        self.links.lock().unwrap().push(link.to_string());
        Ok(())
    }
}

// Allow dead_code for utilities used by other test files
#[allow(dead_code)]
pub struct TestContext {
    pub server: TestServer,
    pub state: AppState,
    pub mailer: Arc<CapturingMailer>,
    // Dropped last; keeps the store and uploads on disk for the test's life.
    pub data: TempDir,
}

#[allow(dead_code)]
impl TestContext {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_verification_enabled() -> Self {
        Self::with_config(|config| config.email_verification_enabled = true).await
    }

    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let data = tempfile::tempdir().expect("create temp data dir");
        let mut config = AppConfig {
            data_dir: data.path().join("data"),
            uploads_dir: data.path().join("uploads"),
            jwt: JwtConfig {
                secret: "test-secret-key-for-testing-only".into(),
                issuer: "garagekeep-test".into(),
                audience: "garagekeep-test-users".into(),
                ttl_minutes: 15,
                refresh_ttl_minutes: 60,
            },
            email_verification_enabled: false,
            signups_disabled: false,
            public_base_url: "http://localhost:8080".into(),
            totp_issuer: "GarageKeep".into(),
        };
        adjust(&mut config);

        std::fs::create_dir_all(&config.data_dir).expect("create data dir");
        std::fs::create_dir_all(&config.uploads_dir).expect("create uploads dir");

        let db = AppState::connect(&config)
            .await
            .expect("connect test database");
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .expect("run migrations");

        let mailer = Arc::new(CapturingMailer::default());
        let state = AppState::from_parts(db, Arc::new(config), mailer.clone());
        let server = TestServer::new(build_app(state.clone())).expect("create test server");

        Self {
            server,
            state,
            mailer,
            data,
        }
    }

    /// Register an account and log it in, returning the access token.
    pub async fn register_and_login(&self, username: &str, password: &str) -> String {
        self.server
            .post("/api/auth/register")
            .json(&json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": password,
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = self
            .server
            .post("/api/auth/login")
            .json(&json!({ "username": username, "password": password }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["access_token"].as_str().expect("access token").to_string()
    }

    /// Create a vehicle for the given session, returning its id.
    pub async fn create_vehicle(&self, token: &str) -> i64 {
        let response = self
            .server
            .post("/api/vehicles")
            .authorization_bearer(token)
            .json(&json!({
                "year": 2019,
                "make": "Honda",
                "model": "Civic",
                "odometer": 10_000,
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        body["id"].as_i64().expect("vehicle id")
    }
}

#[allow(dead_code)]
pub fn test_password() -> &'static str {
    "Str0ngPass"
}
