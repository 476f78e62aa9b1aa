use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::UserProfile,
    service::UserService,
    types::{AuthResponse, LoginRequest, ProfileUpdateRequest, RegisterRequest},
};
use crate::auth::{AuthClaims, BearerToken};
use crate::jobs::models::JobModel;
use crate::shared::{AppError, AppJson, AppState, MessageResponse};

fn service(state: &AppState) -> UserService {
    UserService::new(
        Arc::clone(&state.user_repository),
        state.token_config.clone(),
    )
}

/// POST /api/users/register
#[instrument(name = "register_user", skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let response = service(&state).register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/users/login
#[instrument(name = "login_user", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = service(&state).login(request).await?;
    Ok(Json(response))
}

/// POST /api/users/logout
#[instrument(name = "logout_user", skip(state, claims, token))]
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Extension(token): Extension<BearerToken>,
) -> Result<Json<MessageResponse>, AppError> {
    service(&state)
        .logout(Arc::clone(&state.blacklist_repository), &claims, &token.0)
        .await?;
    Ok(Json(MessageResponse::new("Logged out successfully")))
}

/// GET /api/users/profile/:id
#[instrument(name = "get_user_profile", skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = service(&state).get_profile(id).await?;
    Ok(Json(profile))
}

/// PUT /api/users/updateUserProfile/:id
#[instrument(name = "update_user_profile", skip(state, claims, request))]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(id): Path<i64>,
    AppJson(request): AppJson<ProfileUpdateRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    service(&state).update_profile(&claims, id, request).await?;
    Ok(Json(MessageResponse::new("Profile updated successfully")))
}

/// GET /api/users/saveJobs
#[instrument(name = "list_saved_jobs", skip(state, claims))]
pub async fn saved_jobs(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
) -> Result<Json<Vec<JobModel>>, AppError> {
    let jobs = service(&state).saved_jobs(&claims).await?;
    info!(count = jobs.len(), "Saved jobs listed");
    Ok(Json(jobs))
}

/// POST /api/users/saveJobs/:id
#[instrument(name = "save_job", skip(state, claims))]
pub async fn save_job(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(job_id): Path<i64>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    service(&state).save_job(&claims, job_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Job saved successfully")),
    ))
}

/// DELETE /api/users/savedJobs/:id
#[instrument(name = "unsave_job", skip(state, claims))]
pub async fn unsave_job(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(job_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    service(&state).unsave_job(&claims, job_id).await?;
    Ok(Json(MessageResponse::new("Job removed from saved jobs")))
}
