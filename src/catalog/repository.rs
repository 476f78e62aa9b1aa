use async_trait::async_trait;
use sqlx::MySqlPool;
use std::sync::Arc;
use tracing::instrument;

use super::models::{Category, CategoryJob, Industry, Qualification, Subcategory};
use crate::memory::MemoryStore;
use crate::shared::AppError;

/// Read-only lookup tables used by the job forms and browse pages
#[async_trait]
pub trait CatalogRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;
    /// Jobs whose category name matches case-insensitively, optionally by city
    async fn jobs_by_category(
        &self,
        category_name: &str,
        city: Option<&str>,
    ) -> Result<Vec<CategoryJob>, AppError>;
    async fn list_industries(&self) -> Result<Vec<Industry>, AppError>;
    async fn categories_by_industry(&self, industry_id: i64) -> Result<Vec<Category>, AppError>;
    async fn subcategories_by_category(&self, category_id: i64)
        -> Result<Vec<Subcategory>, AppError>;
    async fn list_qualifications(&self) -> Result<Vec<Qualification>, AppError>;
    /// `None` when the qualification id is unknown
    async fn qualification_subcategories(
        &self,
        id: i64,
    ) -> Result<Option<Vec<Qualification>>, AppError>;
}

pub struct InMemoryCatalogRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryCatalogRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let tables = self.store.tables()?;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn jobs_by_category(
        &self,
        category_name: &str,
        city: Option<&str>,
    ) -> Result<Vec<CategoryJob>, AppError> {
        let tables = self.store.tables()?;
        let city = city.map(str::to_lowercase);
        Ok(tables
            .jobs
            .values()
            .filter_map(|job| {
                let category = tables.categories.get(&job.category_id?)?;
                if !category.name.eq_ignore_ascii_case(category_name) {
                    return None;
                }
                if let Some(city) = &city {
                    let location = job.location.as_deref()?.to_lowercase();
                    if !location.contains(city.as_str()) {
                        return None;
                    }
                }
                Some(CategoryJob {
                    id: job.id,
                    title: job.title.clone(),
                    location: job.location.clone(),
                    salary_min: job.salary_min,
                    salary_max: job.salary_max,
                    employment_type: job.employment_type.clone(),
                    description: job.description.clone(),
                    category: category.name.clone(),
                })
            })
            .collect())
    }

    async fn list_industries(&self) -> Result<Vec<Industry>, AppError> {
        let tables = self.store.tables()?;
        let mut industries: Vec<Industry> = tables.industries.values().cloned().collect();
        industries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(industries)
    }

    async fn categories_by_industry(&self, industry_id: i64) -> Result<Vec<Category>, AppError> {
        let tables = self.store.tables()?;
        let mut categories: Vec<Category> = tables
            .categories
            .values()
            .filter(|c| c.industry_id == industry_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn subcategories_by_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<Subcategory>, AppError> {
        let tables = self.store.tables()?;
        let mut subcategories: Vec<Subcategory> = tables
            .subcategories
            .values()
            .filter(|s| s.category_id == category_id)
            .cloned()
            .collect();
        subcategories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subcategories)
    }

    async fn list_qualifications(&self) -> Result<Vec<Qualification>, AppError> {
        let tables = self.store.tables()?;
        let mut qualifications: Vec<Qualification> =
            tables.qualifications.values().cloned().collect();
        // NULL sorts first, as in MySQL
        qualifications.sort_by(|a, b| {
            (&a.category, &a.subcategory).cmp(&(&b.category, &b.subcategory))
        });
        Ok(qualifications)
    }

    async fn qualification_subcategories(
        &self,
        id: i64,
    ) -> Result<Option<Vec<Qualification>>, AppError> {
        let tables = self.store.tables()?;
        let Some(parent) = tables.qualifications.get(&id) else {
            return Ok(None);
        };
        let mut rows: Vec<Qualification> = tables
            .qualifications
            .values()
            .filter(|q| q.category == parent.category && q.subcategory.is_some())
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.subcategory.cmp(&b.subcategory));
        Ok(Some(rows))
    }
}

pub struct MySqlCatalogRepository {
    pool: MySqlPool,
}

impl MySqlCatalogRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for MySqlCatalogRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT id, industry_id, name FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn jobs_by_category(
        &self,
        category_name: &str,
        city: Option<&str>,
    ) -> Result<Vec<CategoryJob>, AppError> {
        let base = "SELECT j.id, j.title, j.location, j.salary_min, j.salary_max,
                j.employment_type, j.description, c.name AS category
             FROM jobs j
             JOIN categories c ON j.category_id = c.id
             WHERE LOWER(c.name) = LOWER(?)";

        let rows = match city {
            Some(city) => {
                sqlx::query_as::<_, CategoryJob>(&format!(
                    "{} AND LOWER(j.location) LIKE LOWER(?)",
                    base
                ))
                .bind(category_name)
                .bind(format!("%{}%", city))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, CategoryJob>(base)
                    .bind(category_name)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn list_industries(&self) -> Result<Vec<Industry>, AppError> {
        let rows = sqlx::query_as::<_, Industry>("SELECT id, name FROM industries ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn categories_by_industry(&self, industry_id: i64) -> Result<Vec<Category>, AppError> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT id, industry_id, name FROM categories WHERE industry_id = ? ORDER BY name",
        )
        .bind(industry_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn subcategories_by_category(
        &self,
        category_id: i64,
    ) -> Result<Vec<Subcategory>, AppError> {
        let rows = sqlx::query_as::<_, Subcategory>(
            "SELECT id, category_id, name FROM subcategories WHERE category_id = ? ORDER BY name",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_qualifications(&self) -> Result<Vec<Qualification>, AppError> {
        let rows = sqlx::query_as::<_, Qualification>(
            "SELECT id, category, subcategory FROM qualifications ORDER BY category, subcategory",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn qualification_subcategories(
        &self,
        id: i64,
    ) -> Result<Option<Vec<Qualification>>, AppError> {
        let parent: Option<(String,)> =
            sqlx::query_as("SELECT category FROM qualifications WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        let Some((category,)) = parent else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, Qualification>(
            "SELECT id, category, subcategory FROM qualifications
             WHERE category = ? AND subcategory IS NOT NULL
             ORDER BY subcategory",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(Some(rows))
    }
}
