use async_trait::async_trait;
use sqlx::MySqlPool;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::models::{NewRecruiter, RecruiterModel, RecruiterUpdate};
use crate::companies::models::{CompanyDraft, CompanyModel, CompanyRef};
use crate::memory::MemoryStore;
use crate::shared::AppError;

/// Repository trait for recruiter accounts and the company each one owns
#[async_trait]
pub trait RecruiterRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<RecruiterModel>, AppError>;
    async fn get_recruiter(&self, id: i64) -> Result<Option<RecruiterModel>, AppError>;
    async fn create_recruiter(&self, recruiter: NewRecruiter) -> Result<i64, AppError>;
    /// `false` when the recruiter does not exist
    async fn update_recruiter(&self, id: i64, update: &RecruiterUpdate) -> Result<bool, AppError>;
    async fn email_taken_by_other(&self, email: &str, id: i64) -> Result<bool, AppError>;
    /// Creates or updates the company created by `recruiter_id` and links the
    /// recruiter to it, atomically
    async fn upsert_company(
        &self,
        recruiter_id: i64,
        draft: CompanyDraft,
    ) -> Result<CompanyModel, AppError>;
    async fn company_created_by(&self, recruiter_id: i64)
        -> Result<Option<CompanyModel>, AppError>;
    /// Companies reachable through the recruiter's `company_id`
    async fn linked_companies(&self, recruiter_id: i64) -> Result<Vec<CompanyRef>, AppError>;
}

pub struct InMemoryRecruiterRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryRecruiterRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RecruiterRepository for InMemoryRecruiterRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<RecruiterModel>, AppError> {
        let tables = self.store.tables()?;
        Ok(tables.recruiters.values().find(|r| r.email == email).cloned())
    }

    async fn get_recruiter(&self, id: i64) -> Result<Option<RecruiterModel>, AppError> {
        let tables = self.store.tables()?;
        Ok(tables.recruiters.get(&id).cloned())
    }

    #[instrument(skip(self, recruiter))]
    async fn create_recruiter(&self, recruiter: NewRecruiter) -> Result<i64, AppError> {
        let mut tables = self.store.tables()?;
        if tables.recruiters.values().any(|r| r.email == recruiter.email) {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }
        let id = tables.next_id();
        tables.recruiters.insert(id, recruiter.into_model(id));
        debug!(recruiter_id = id, "Recruiter stored in memory");
        Ok(id)
    }

    async fn update_recruiter(&self, id: i64, update: &RecruiterUpdate) -> Result<bool, AppError> {
        let mut tables = self.store.tables()?;
        let Some(recruiter) = tables.recruiters.get_mut(&id) else {
            return Ok(false);
        };
        recruiter.name = update.name.clone();
        recruiter.designation = Some(update.designation.clone());
        if let Some(email) = &update.email {
            recruiter.email = email.clone();
        }
        if let Some(hash) = &update.password_hash {
            recruiter.password = hash.clone();
        }
        Ok(true)
    }

    async fn email_taken_by_other(&self, email: &str, id: i64) -> Result<bool, AppError> {
        let tables = self.store.tables()?;
        Ok(tables
            .recruiters
            .values()
            .any(|r| r.email == email && r.id != id))
    }

    #[instrument(skip(self, draft))]
    async fn upsert_company(
        &self,
        recruiter_id: i64,
        draft: CompanyDraft,
    ) -> Result<CompanyModel, AppError> {
        let mut tables = self.store.tables()?;
        if !tables.recruiters.contains_key(&recruiter_id) {
            return Err(AppError::NotFound("Recruiter not found".to_string()));
        }

        let existing = tables
            .companies
            .values()
            .find(|c| c.created_by == recruiter_id)
            .map(|c| c.id);
        let company = match existing {
            Some(id) => {
                let company = tables
                    .companies
                    .get_mut(&id)
                    .ok_or_else(|| AppError::Internal("company vanished".to_string()))?;
                company.apply(draft);
                company.clone()
            }
            None => {
                let id = tables.next_id();
                let company = CompanyModel::from_draft(id, recruiter_id, draft);
                tables.companies.insert(id, company.clone());
                company
            }
        };

        if let Some(recruiter) = tables.recruiters.get_mut(&recruiter_id) {
            recruiter.company_id = Some(company.id);
        }
        Ok(company)
    }

    async fn company_created_by(
        &self,
        recruiter_id: i64,
    ) -> Result<Option<CompanyModel>, AppError> {
        let tables = self.store.tables()?;
        Ok(tables
            .companies
            .values()
            .find(|c| c.created_by == recruiter_id)
            .cloned())
    }

    async fn linked_companies(&self, recruiter_id: i64) -> Result<Vec<CompanyRef>, AppError> {
        let tables = self.store.tables()?;
        Ok(tables
            .recruiters
            .get(&recruiter_id)
            .and_then(|r| r.company_id)
            .and_then(|id| tables.companies.get(&id))
            .map(|c| CompanyRef {
                id: c.id,
                name: c.name.clone(),
            })
            .into_iter()
            .collect())
    }
}

/// MySQL implementation of RecruiterRepository
pub struct MySqlRecruiterRepository {
    pool: MySqlPool,
}

impl MySqlRecruiterRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecruiterRepository for MySqlRecruiterRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<RecruiterModel>, AppError> {
        let recruiter =
            sqlx::query_as::<_, RecruiterModel>("SELECT * FROM recruiters WHERE email = ? LIMIT 1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(recruiter)
    }

    async fn get_recruiter(&self, id: i64) -> Result<Option<RecruiterModel>, AppError> {
        let recruiter = sqlx::query_as::<_, RecruiterModel>("SELECT * FROM recruiters WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(recruiter)
    }

    #[instrument(skip(self, recruiter))]
    async fn create_recruiter(&self, recruiter: NewRecruiter) -> Result<i64, AppError> {
        let result = sqlx::query(
            "INSERT INTO recruiters (name, email, password, designation, role, company_id, is_verified)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&recruiter.name)
        .bind(&recruiter.email)
        .bind(&recruiter.password_hash)
        .bind(&recruiter.designation)
        .bind(&recruiter.role)
        .bind(recruiter.company_id)
        .bind(recruiter.is_verified)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert recruiter");
            AppError::from(e)
        })?;
        Ok(result.last_insert_id() as i64)
    }

    #[instrument(skip(self, update))]
    async fn update_recruiter(&self, id: i64, update: &RecruiterUpdate) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let exists: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM recruiters WHERE id = ? FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Ok(false);
        }

        sqlx::query(
            "UPDATE recruiters SET name = ?, designation = ?,
                email = COALESCE(?, email), password = COALESCE(?, password)
             WHERE id = ?",
        )
        .bind(&update.name)
        .bind(&update.designation)
        .bind(&update.email)
        .bind(&update.password_hash)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn email_taken_by_other(&self, email: &str, id: i64) -> Result<bool, AppError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM recruiters WHERE email = ? AND id != ? LIMIT 1")
                .bind(email)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    #[instrument(skip(self, draft))]
    async fn upsert_company(
        &self,
        recruiter_id: i64,
        draft: CompanyDraft,
    ) -> Result<CompanyModel, AppError> {
        let mut tx = self.pool.begin().await?;

        let recruiter: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM recruiters WHERE id = ? FOR UPDATE")
                .bind(recruiter_id)
                .fetch_optional(&mut *tx)
                .await?;
        if recruiter.is_none() {
            return Err(AppError::NotFound("Recruiter not found".to_string()));
        }

        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM companies WHERE created_by = ? LIMIT 1 FOR UPDATE")
                .bind(recruiter_id)
                .fetch_optional(&mut *tx)
                .await?;

        let company_id = match existing {
            Some((id,)) => {
                sqlx::query(
                    "UPDATE companies SET name = ?, description = ?, website = ?,
                        logo_url = COALESCE(?, logo_url), banner_url = COALESCE(?, banner_url),
                        video_url = ?, location = ?, pincode = ?, state = ?, industry = ?,
                        size = ?, established_year = ?
                     WHERE id = ?",
                )
                .bind(&draft.name)
                .bind(&draft.description)
                .bind(&draft.website)
                .bind(&draft.logo_url)
                .bind(&draft.banner_url)
                .bind(&draft.video_url)
                .bind(&draft.location)
                .bind(&draft.pincode)
                .bind(&draft.state)
                .bind(&draft.industry)
                .bind(&draft.size)
                .bind(draft.established_year)
                .bind(id)
                .execute(&mut *tx)
                .await?;
                id
            }
            None => {
                let result = sqlx::query(
                    "INSERT INTO companies (created_by, name, description, website, logo_url,
                        banner_url, video_url, location, pincode, state, industry, size,
                        established_year)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(recruiter_id)
                .bind(&draft.name)
                .bind(&draft.description)
                .bind(&draft.website)
                .bind(&draft.logo_url)
                .bind(&draft.banner_url)
                .bind(&draft.video_url)
                .bind(&draft.location)
                .bind(&draft.pincode)
                .bind(&draft.state)
                .bind(&draft.industry)
                .bind(&draft.size)
                .bind(draft.established_year)
                .execute(&mut *tx)
                .await?;
                result.last_insert_id() as i64
            }
        };

        sqlx::query("UPDATE recruiters SET company_id = ? WHERE id = ?")
            .bind(company_id)
            .bind(recruiter_id)
            .execute(&mut *tx)
            .await?;

        let company = sqlx::query_as::<_, CompanyModel>("SELECT * FROM companies WHERE id = ?")
            .bind(company_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(company_id, recruiter_id, "Company profile saved");
        Ok(company)
    }

    async fn company_created_by(
        &self,
        recruiter_id: i64,
    ) -> Result<Option<CompanyModel>, AppError> {
        let company = sqlx::query_as::<_, CompanyModel>(
            "SELECT * FROM companies WHERE created_by = ? LIMIT 1",
        )
        .bind(recruiter_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(company)
    }

    async fn linked_companies(&self, recruiter_id: i64) -> Result<Vec<CompanyRef>, AppError> {
        let companies = sqlx::query_as::<_, CompanyRef>(
            "SELECT c.id, c.name FROM recruiters r
             JOIN companies c ON r.company_id = c.id
             WHERE r.id = ?",
        )
        .bind(recruiter_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(companies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_recruiter(email: &str) -> NewRecruiter {
        NewRecruiter {
            name: "Rita".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            designation: Some("HR".to_string()),
            role: "recruiter".to_string(),
            company_id: None,
            is_verified: false,
        }
    }

    #[tokio::test]
    async fn test_upsert_company_links_recruiter_once() {
        let repo = InMemoryRecruiterRepository::new(Arc::new(MemoryStore::new()));
        let id = repo
            .create_recruiter(new_recruiter("rita@acme.io"))
            .await
            .unwrap();

        let first = repo
            .upsert_company(
                id,
                CompanyDraft {
                    name: "Acme".to_string(),
                    ..CompanyDraft::default()
                },
            )
            .await
            .unwrap();
        let second = repo
            .upsert_company(
                id,
                CompanyDraft {
                    name: "Acme Labs".to_string(),
                    ..CompanyDraft::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "Acme Labs");
        let recruiter = repo.get_recruiter(id).await.unwrap().unwrap();
        assert_eq!(recruiter.company_id, Some(first.id));
        assert_eq!(
            repo.linked_companies(id).await.unwrap(),
            vec![CompanyRef {
                id: first.id,
                name: "Acme Labs".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_upsert_company_unknown_recruiter() {
        let repo = InMemoryRecruiterRepository::new(Arc::new(MemoryStore::new()));
        let result = repo.upsert_company(77, CompanyDraft::default()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_email_taken_by_other() {
        let repo = InMemoryRecruiterRepository::new(Arc::new(MemoryStore::new()));
        let a = repo.create_recruiter(new_recruiter("a@acme.io")).await.unwrap();
        repo.create_recruiter(new_recruiter("b@acme.io")).await.unwrap();

        assert!(repo.email_taken_by_other("b@acme.io", a).await.unwrap());
        assert!(!repo.email_taken_by_other("a@acme.io", a).await.unwrap());
    }
}
