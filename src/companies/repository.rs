use async_trait::async_trait;
use sqlx::MySqlPool;
use std::sync::Arc;
use tracing::instrument;

use super::models::CompanyModel;
use crate::jobs::models::JobModel;
use crate::memory::MemoryStore;
use crate::shared::AppError;

/// Read side of companies; profile writes go through the recruiter repository
#[async_trait]
pub trait CompanyRepository {
    async fn list_companies(&self, limit: u32) -> Result<Vec<CompanyModel>, AppError>;
    async fn get_company(&self, id: i64) -> Result<Option<CompanyModel>, AppError>;
    /// Jobs newest first, optionally limited to one company
    async fn list_openings(&self, company_id: Option<i64>) -> Result<Vec<JobModel>, AppError>;
}

pub struct InMemoryCompanyRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryCompanyRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CompanyRepository for InMemoryCompanyRepository {
    async fn list_companies(&self, limit: u32) -> Result<Vec<CompanyModel>, AppError> {
        let tables = self.store.tables()?;
        Ok(tables
            .companies
            .values()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_company(&self, id: i64) -> Result<Option<CompanyModel>, AppError> {
        let tables = self.store.tables()?;
        Ok(tables.companies.get(&id).cloned())
    }

    async fn list_openings(&self, company_id: Option<i64>) -> Result<Vec<JobModel>, AppError> {
        let tables = self.store.tables()?;
        let mut jobs: Vec<JobModel> = tables
            .jobs
            .values()
            .filter(|job| company_id.map_or(true, |id| job.company_id == id))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(jobs)
    }
}

pub struct MySqlCompanyRepository {
    pool: MySqlPool,
}

impl MySqlCompanyRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepository for MySqlCompanyRepository {
    #[instrument(skip(self))]
    async fn list_companies(&self, limit: u32) -> Result<Vec<CompanyModel>, AppError> {
        let companies =
            sqlx::query_as::<_, CompanyModel>("SELECT * FROM companies ORDER BY id LIMIT ?")
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;
        Ok(companies)
    }

    #[instrument(skip(self))]
    async fn get_company(&self, id: i64) -> Result<Option<CompanyModel>, AppError> {
        let company = sqlx::query_as::<_, CompanyModel>("SELECT * FROM companies WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(company)
    }

    #[instrument(skip(self))]
    async fn list_openings(&self, company_id: Option<i64>) -> Result<Vec<JobModel>, AppError> {
        let jobs = match company_id {
            Some(id) => {
                sqlx::query_as::<_, JobModel>(
                    "SELECT * FROM jobs WHERE company_id = ? ORDER BY created_at DESC, id DESC",
                )
                .bind(id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, JobModel>("SELECT * FROM jobs ORDER BY created_at DESC, id DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(jobs)
    }
}
