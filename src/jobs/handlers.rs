use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::JobModel,
    service::JobService,
    types::{
        ApplicationCreated, ApplicationQuery, ApplicationRequest, ApplicationResponses,
        ApplicationsByJob, CreateJobRequest, DynamicFormCreated, DynamicFormRequest,
        FilterRequest, FilterResponse, FormQuery, JobCreatedResponse, JobDetail, JobFormResponse,
        JobIdQuery, JobSummary,
    },
};
use crate::auth::AuthClaims;
use crate::shared::{AppError, AppJson, AppState, MessageResponse};

fn service(state: &AppState) -> JobService {
    JobService::new(
        Arc::clone(&state.job_repository),
        Arc::clone(&state.company_repository),
    )
}

/// POST /api/jobs/createJob
#[instrument(name = "create_job", skip(state, claims, request))]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    AppJson(request): AppJson<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobCreatedResponse>), AppError> {
    let response = service(&state).create_job(&claims, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/jobs/getAllJobs
#[instrument(name = "get_all_jobs", skip(state))]
pub async fn get_all_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobSummary>>, AppError> {
    let jobs = service(&state).list_jobs().await?;
    info!(count = jobs.len(), "Jobs listed");
    Ok(Json(jobs))
}

/// GET /api/jobs/getJobById?id=
#[instrument(name = "get_job_by_id", skip(state))]
pub async fn get_job_by_id(
    State(state): State<AppState>,
    Query(query): Query<JobIdQuery>,
) -> Result<Json<JobDetail>, AppError> {
    Ok(Json(service(&state).job_detail(query.id).await?))
}

/// POST /api/jobs/all
///
/// Paged listing. `total` counts every matching job, not just this page.
#[instrument(name = "filter_jobs", skip(state, request))]
pub async fn filter_jobs(
    State(state): State<AppState>,
    request: Option<Json<FilterRequest>>,
) -> Result<Json<FilterResponse<JobModel>>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    Ok(Json(service(&state).filter_jobs(request).await?))
}

/// PUT /api/jobs/updatejob/:id
#[instrument(name = "update_job", skip(state, claims, body))]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(id): Path<i64>,
    AppJson(body): AppJson<Map<String, Value>>,
) -> Result<Json<JobModel>, AppError> {
    Ok(Json(service(&state).update_job(&claims, id, body).await?))
}

/// DELETE /api/jobs/deletejobs/:id
#[instrument(name = "delete_job", skip(state, claims))]
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    service(&state).delete_job(&claims, id).await?;
    Ok(Json(MessageResponse::new("Deleted")))
}

/// POST /api/jobs/createDynamicForm
#[instrument(name = "create_dynamic_form", skip(state, claims, request))]
pub async fn create_dynamic_form(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    AppJson(request): AppJson<DynamicFormRequest>,
) -> Result<(StatusCode, Json<DynamicFormCreated>), AppError> {
    let response = service(&state).create_form(&claims, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/jobs/getJobDynamicForm?job_id=
#[instrument(name = "get_job_dynamic_form", skip(state))]
pub async fn get_job_dynamic_form(
    State(state): State<AppState>,
    Query(query): Query<FormQuery>,
) -> Result<Json<JobFormResponse>, AppError> {
    Ok(Json(service(&state).job_form(query.job_id).await?))
}

/// POST /api/jobs/createAndSubmitApplication
#[instrument(name = "submit_application", skip(state, request))]
pub async fn create_and_submit_application(
    State(state): State<AppState>,
    AppJson(request): AppJson<ApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationCreated>), AppError> {
    let response = service(&state).submit_application(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/jobs/getApplicationResponses?application_id=
#[instrument(name = "get_application_responses", skip(state))]
pub async fn get_application_responses(
    State(state): State<AppState>,
    Query(query): Query<ApplicationQuery>,
) -> Result<Json<ApplicationResponses>, AppError> {
    Ok(Json(
        service(&state)
            .application_responses(query.application_id)
            .await?,
    ))
}

/// GET /api/jobs/getApplicationsByJob?job_id=
#[instrument(name = "get_applications_by_job", skip(state, claims))]
pub async fn get_applications_by_job(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Query(query): Query<FormQuery>,
) -> Result<Json<ApplicationsByJob>, AppError> {
    Ok(Json(
        service(&state)
            .applications_by_job(&claims, query.job_id)
            .await?,
    ))
}
