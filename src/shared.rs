use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::auth::repository::{
    InMemoryTokenBlacklistRepository, MySqlTokenBlacklistRepository, TokenBlacklistRepository,
};
use crate::auth::TokenConfig;
use crate::catalog::repository::{CatalogRepository, InMemoryCatalogRepository, MySqlCatalogRepository};
use crate::companies::repository::{
    CompanyRepository, InMemoryCompanyRepository, MySqlCompanyRepository,
};
use crate::config::AppConfig;
use crate::invites::repository::{InMemoryInviteRepository, InviteRepository, MySqlInviteRepository};
use crate::jobs::repository::{InMemoryJobRepository, JobRepository, MySqlJobRepository};
use crate::mail::Mailer;
use crate::memory::MemoryStore;
use crate::recruiters::repository::{
    InMemoryRecruiterRepository, MySqlRecruiterRepository, RecruiterRepository,
};
use crate::users::repository::{InMemoryUserRepository, MySqlUserRepository, UserRepository};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub token_config: TokenConfig,
    pub blacklist_repository: Arc<dyn TokenBlacklistRepository + Send + Sync>,
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub recruiter_repository: Arc<dyn RecruiterRepository + Send + Sync>,
    pub company_repository: Arc<dyn CompanyRepository + Send + Sync>,
    pub job_repository: Arc<dyn JobRepository + Send + Sync>,
    pub catalog_repository: Arc<dyn CatalogRepository + Send + Sync>,
    pub invite_repository: Arc<dyn InviteRepository + Send + Sync>,
    pub mailer: Arc<dyn Mailer + Send + Sync>,
}

impl AppState {
    /// State backed by MySQL repositories sharing one connection pool
    pub fn mysql(config: AppConfig, pool: MySqlPool, mailer: Arc<dyn Mailer + Send + Sync>) -> Self {
        let token_config = TokenConfig::new(&config.jwt_secret, config.jwt_expiration_hours);
        Self {
            config: Arc::new(config),
            token_config,
            blacklist_repository: Arc::new(MySqlTokenBlacklistRepository::new(pool.clone())),
            user_repository: Arc::new(MySqlUserRepository::new(pool.clone())),
            recruiter_repository: Arc::new(MySqlRecruiterRepository::new(pool.clone())),
            company_repository: Arc::new(MySqlCompanyRepository::new(pool.clone())),
            job_repository: Arc::new(MySqlJobRepository::new(pool.clone())),
            catalog_repository: Arc::new(MySqlCatalogRepository::new(pool.clone())),
            invite_repository: Arc::new(MySqlInviteRepository::new(pool)),
            mailer,
        }
    }

    /// State backed by the in-process store, for development without a database
    pub fn in_memory(
        config: AppConfig,
        store: Arc<MemoryStore>,
        mailer: Arc<dyn Mailer + Send + Sync>,
    ) -> Self {
        let token_config = TokenConfig::new(&config.jwt_secret, config.jwt_expiration_hours);
        Self {
            config: Arc::new(config),
            token_config,
            blacklist_repository: Arc::new(InMemoryTokenBlacklistRepository::new(store.clone())),
            user_repository: Arc::new(InMemoryUserRepository::new(store.clone())),
            recruiter_repository: Arc::new(InMemoryRecruiterRepository::new(store.clone())),
            company_repository: Arc::new(InMemoryCompanyRepository::new(store.clone())),
            job_repository: Arc::new(InMemoryJobRepository::new(store.clone())),
            catalog_repository: Arc::new(InMemoryCatalogRepository::new(store.clone())),
            invite_repository: Arc::new(InMemoryInviteRepository::new(store)),
            mailer,
        }
    }
}

/// Body of endpoints that only report what happened
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::JwtError(_) => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Database error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_string(),
                )
            }
            AppError::Mail(msg) => {
                error!(error = %msg, "Mail delivery failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send invite email".to_string(),
                )
            }
            AppError::Internal(msg) => {
                error!(error = %msg, "Internal error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Record already exists".to_string())
            }
            _ => AppError::DatabaseError(err.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// `Json` extractor whose rejections use the `{"error": ...}` body
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
