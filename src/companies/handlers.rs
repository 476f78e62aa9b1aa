use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::models::CompanyModel;
use crate::jobs::models::JobModel;
use crate::shared::{AppError, AppState};

const DEFAULT_COMPANY_LIMIT: u32 = 5;
const MAX_COMPANY_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyQuery {
    pub company_id: Option<i64>,
}

/// GET /api/companies/getAllCompanies
#[instrument(name = "list_companies", skip(state))]
pub async fn list_companies(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CompanyModel>>, AppError> {
    let limit = query
        .limit
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_COMPANY_LIMIT)
        .min(MAX_COMPANY_LIMIT);
    let companies = state.company_repository.list_companies(limit).await?;
    info!(count = companies.len(), "Companies listed");
    Ok(Json(companies))
}

/// GET /api/companies/getCompanyById?companyId=
#[instrument(name = "get_company", skip(state))]
pub async fn get_company(
    State(state): State<AppState>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<CompanyModel>, AppError> {
    let id = query
        .company_id
        .ok_or_else(|| AppError::BadRequest("companyId is required".to_string()))?;
    let company = state
        .company_repository
        .get_company(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".to_string()))?;
    Ok(Json(company))
}

/// GET /api/companies/getCompanyOpenings?companyId=
#[instrument(name = "company_openings", skip(state))]
pub async fn company_openings(
    State(state): State<AppState>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<Vec<JobModel>>, AppError> {
    let jobs = state
        .company_repository
        .list_openings(query.company_id)
        .await?;
    Ok(Json(jobs))
}
