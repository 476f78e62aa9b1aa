use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::models::{slug_to_name, Category, CategoryJob, Industry, Qualification, Subcategory};
use crate::shared::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
}

/// GET /api/categories
#[instrument(name = "list_categories", skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.catalog_repository.list_categories().await?))
}

/// GET /api/categories/:slug?city=
#[instrument(name = "jobs_by_category", skip(state))]
pub async fn jobs_by_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<CityQuery>,
) -> Result<Json<Vec<CategoryJob>>, AppError> {
    let name = slug_to_name(&slug);
    let city = query.city.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let jobs = state
        .catalog_repository
        .jobs_by_category(&name, city)
        .await?;
    info!(category = %name, count = jobs.len(), "Category jobs listed");
    Ok(Json(jobs))
}

/// GET /api/industries
#[instrument(name = "list_industries", skip(state))]
pub async fn list_industries(
    State(state): State<AppState>,
) -> Result<Json<Vec<Industry>>, AppError> {
    Ok(Json(state.catalog_repository.list_industries().await?))
}

/// GET /api/industries/:industry_id/categories
#[instrument(name = "industry_categories", skip(state))]
pub async fn industry_categories(
    State(state): State<AppState>,
    Path(industry_id): Path<i64>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(
        state
            .catalog_repository
            .categories_by_industry(industry_id)
            .await?,
    ))
}

/// GET /api/industries/categories/:category_id/subcategories
#[instrument(name = "category_subcategories", skip(state))]
pub async fn category_subcategories(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> Result<Json<Vec<Subcategory>>, AppError> {
    Ok(Json(
        state
            .catalog_repository
            .subcategories_by_category(category_id)
            .await?,
    ))
}

/// GET /api/qualifications
#[instrument(name = "list_qualifications", skip(state))]
pub async fn list_qualifications(
    State(state): State<AppState>,
) -> Result<Json<Vec<Qualification>>, AppError> {
    Ok(Json(state.catalog_repository.list_qualifications().await?))
}

/// GET /api/qualifications/:id/subcategories
#[instrument(name = "qualification_subcategories", skip(state))]
pub async fn qualification_subcategories(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Qualification>>, AppError> {
    state
        .catalog_repository
        .qualification_subcategories(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Qualification category not found".to_string()))
}
