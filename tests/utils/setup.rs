use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use job_board::{build_router, AppConfig, AppState, MemoryStore};

use super::mocks::CapturingMailer;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mailer: Arc<CapturingMailer>,
}

pub struct TestAppBuilder {
    config: AppConfig,
    sample_catalog: bool,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig {
                jwt_secret: "integration-test-secret".to_string(),
                app_base_url: "https://jobs.test".to_string(),
                ..AppConfig::default()
            },
            sample_catalog: false,
        }
    }

    pub fn with_sample_catalog(mut self) -> Self {
        self.sample_catalog = true;
        self
    }

    pub fn build(self) -> TestApp {
        let store = if self.sample_catalog {
            MemoryStore::with_sample_catalog()
        } else {
            MemoryStore::new()
        };
        let mailer = Arc::new(CapturingMailer::new());
        let state = AppState::in_memory(self.config, Arc::new(store), mailer.clone());
        TestApp {
            router: build_router(state.clone()),
            state,
            mailer,
        }
    }
}

impl TestApp {
    /// Sends one request and returns the status with the parsed JSON body
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}
