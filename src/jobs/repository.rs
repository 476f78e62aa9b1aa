use async_trait::async_trait;
use chrono::Utc;
use sqlx::{types::Json, MySql, MySqlPool, QueryBuilder};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::models::{
    ApplicationModel, ApplicationResponseModel, FormFieldModel, JobModel, JobPatch,
    JobWithCompany, LabelledResponse, NewFormField, NewJob, NewResponse, PatchValue,
};
use super::patch::apply_patch;
use super::types::{JobFilter, SortKey};
use crate::memory::{MemoryStore, Tables};
use crate::shared::AppError;

/// Repository trait for postings, their application forms and submitted applications
#[async_trait]
pub trait JobRepository {
    async fn create_job(&self, job: NewJob) -> Result<i64, AppError>;
    async fn get_job(&self, id: i64) -> Result<Option<JobModel>, AppError>;
    /// Every job with its company and industry names, newest first
    async fn list_with_company(&self) -> Result<Vec<JobWithCompany>, AppError>;
    async fn get_with_company(&self, id: i64) -> Result<Option<JobWithCompany>, AppError>;
    /// One page of jobs plus the number of jobs matching the filter
    async fn filter_jobs(&self, filter: &JobFilter) -> Result<(Vec<JobModel>, i64), AppError>;
    /// Applies the patch and returns the refreshed row; `None` when the job is gone
    async fn update_job(&self, id: i64, patch: &JobPatch) -> Result<Option<JobModel>, AppError>;
    async fn delete_job(&self, id: i64) -> Result<bool, AppError>;
    /// Inserts all fields or none; returns their ids in input order
    async fn create_form_fields(
        &self,
        job_id: i64,
        fields: &[NewFormField],
    ) -> Result<Vec<i64>, AppError>;
    async fn form_fields(&self, job_id: i64) -> Result<Vec<FormFieldModel>, AppError>;
    /// Stores an application and its responses atomically
    async fn create_application(
        &self,
        job_id: i64,
        candidate_id: Option<i64>,
        responses: &[NewResponse],
    ) -> Result<i64, AppError>;
    async fn application_responses(
        &self,
        application_id: i64,
    ) -> Result<Vec<LabelledResponse>, AppError>;
    async fn applications_for_job(
        &self,
        job_id: i64,
    ) -> Result<(Vec<ApplicationModel>, Vec<LabelledResponse>), AppError>;
}

pub struct InMemoryJobRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryJobRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    fn joined(tables: &Tables, job: &JobModel) -> JobWithCompany {
        let company = tables.companies.get(&job.company_id);
        JobWithCompany {
            job: job.clone(),
            company: company.map(|c| c.name.clone()),
            logo: company.and_then(|c| c.logo_url.clone()),
            category: job
                .industry_id
                .and_then(|id| tables.industries.get(&id))
                .map(|i| i.name.clone()),
        }
    }

    fn labelled<'a>(
        tables: &'a Tables,
        filter: impl Fn(&ApplicationResponseModel) -> bool + 'a,
    ) -> impl Iterator<Item = LabelledResponse> + 'a {
        tables
            .application_responses
            .values()
            .filter(move |r| filter(r))
            .filter_map(move |r| {
                let field = tables.form_fields.get(&r.field_id)?;
                Some(LabelledResponse {
                    application_id: r.application_id,
                    field_label: field.field_label.clone(),
                    field_type: field.field_type.clone(),
                    field_value: r.field_value.clone(),
                })
            })
    }
}

fn newest_first(a: &JobModel, b: &JobModel) -> std::cmp::Ordering {
    (b.created_at, b.id).cmp(&(a.created_at, a.id))
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    #[instrument(skip(self, job))]
    async fn create_job(&self, job: NewJob) -> Result<i64, AppError> {
        let mut tables = self.store.tables()?;
        let id = tables.next_id();
        tables.jobs.insert(id, job.into_model(id));
        debug!(job_id = id, "Job stored in memory");
        Ok(id)
    }

    async fn get_job(&self, id: i64) -> Result<Option<JobModel>, AppError> {
        let tables = self.store.tables()?;
        Ok(tables.jobs.get(&id).cloned())
    }

    async fn list_with_company(&self) -> Result<Vec<JobWithCompany>, AppError> {
        let tables = self.store.tables()?;
        let mut jobs: Vec<&JobModel> = tables.jobs.values().collect();
        jobs.sort_by(|a, b| newest_first(a, b));
        Ok(jobs
            .into_iter()
            .map(|job| Self::joined(&tables, job))
            .collect())
    }

    async fn get_with_company(&self, id: i64) -> Result<Option<JobWithCompany>, AppError> {
        let tables = self.store.tables()?;
        Ok(tables.jobs.get(&id).map(|job| Self::joined(&tables, job)))
    }

    async fn filter_jobs(&self, filter: &JobFilter) -> Result<(Vec<JobModel>, i64), AppError> {
        let tables = self.store.tables()?;
        let mut jobs: Vec<JobModel> = tables
            .jobs
            .values()
            .filter(|job| filter.company_id.map_or(true, |id| job.company_id == id))
            .cloned()
            .collect();

        jobs.sort_by(|a, b| {
            let ordering = match filter.sort {
                SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
                SortKey::Title => a.title.cmp(&b.title),
                SortKey::SalaryMin => a.salary_min.cmp(&b.salary_min),
                SortKey::SalaryMax => a.salary_max.cmp(&b.salary_max),
                SortKey::ExperienceMin => a.experience_min.cmp(&b.experience_min),
                SortKey::ExperienceMax => a.experience_max.cmp(&b.experience_max),
            }
            .then(a.id.cmp(&b.id));
            if filter.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });

        let total = jobs.len() as i64;
        let page = jobs
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.per_page as usize)
            .collect();
        Ok((page, total))
    }

    async fn update_job(&self, id: i64, patch: &JobPatch) -> Result<Option<JobModel>, AppError> {
        let mut tables = self.store.tables()?;
        let Some(job) = tables.jobs.get_mut(&id) else {
            return Ok(None);
        };
        apply_patch(job, patch);
        job.updated_at = Utc::now();
        Ok(Some(job.clone()))
    }

    async fn delete_job(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.store.tables()?;
        if tables.jobs.remove(&id).is_none() {
            return Ok(false);
        }
        // Mirror ON DELETE CASCADE
        tables.saved_jobs.retain(|(_, job)| *job != id);
        tables.form_fields.retain(|_, f| f.job_id != id);
        tables.applications.retain(|_, a| a.job_id != id);
        tables.application_responses.retain(|_, r| r.job_id != id);
        Ok(true)
    }

    async fn create_form_fields(
        &self,
        job_id: i64,
        fields: &[NewFormField],
    ) -> Result<Vec<i64>, AppError> {
        let mut tables = self.store.tables()?;
        if !tables.jobs.contains_key(&job_id) {
            return Err(AppError::NotFound("Job not found".to_string()));
        }
        let mut ids = Vec::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            let id = tables.next_id();
            tables.form_fields.insert(
                id,
                FormFieldModel {
                    id,
                    job_id,
                    field_label: field.field_label.clone(),
                    field_type: field.field_type.clone(),
                    is_required: field.is_required,
                    field_options: Some(Json(field.field_options.clone())),
                    is_multi: field.is_multi,
                    order_no: index as i32 + 1,
                },
            );
            ids.push(id);
        }
        Ok(ids)
    }

    async fn form_fields(&self, job_id: i64) -> Result<Vec<FormFieldModel>, AppError> {
        let tables = self.store.tables()?;
        let mut fields: Vec<FormFieldModel> = tables
            .form_fields
            .values()
            .filter(|f| f.job_id == job_id)
            .cloned()
            .collect();
        fields.sort_by_key(|f| (f.order_no, f.id));
        Ok(fields)
    }

    async fn create_application(
        &self,
        job_id: i64,
        candidate_id: Option<i64>,
        responses: &[NewResponse],
    ) -> Result<i64, AppError> {
        let mut tables = self.store.tables()?;
        if !tables.jobs.contains_key(&job_id) {
            return Err(AppError::NotFound("Job not found".to_string()));
        }
        let application_id = tables.next_id();
        tables.applications.insert(
            application_id,
            ApplicationModel {
                id: application_id,
                job_id,
                candidate_id,
                applied_at: Utc::now(),
            },
        );
        for response in responses {
            let id = tables.next_id();
            tables.application_responses.insert(
                id,
                ApplicationResponseModel {
                    id,
                    application_id,
                    job_id,
                    field_id: response.field_id,
                    field_value: response.field_value.clone(),
                },
            );
        }
        Ok(application_id)
    }

    async fn application_responses(
        &self,
        application_id: i64,
    ) -> Result<Vec<LabelledResponse>, AppError> {
        let tables = self.store.tables()?;
        Ok(Self::labelled(&tables, move |r| r.application_id == application_id).collect())
    }

    async fn applications_for_job(
        &self,
        job_id: i64,
    ) -> Result<(Vec<ApplicationModel>, Vec<LabelledResponse>), AppError> {
        let tables = self.store.tables()?;
        let applications = tables
            .applications
            .values()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect();
        let responses = Self::labelled(&tables, move |r| r.job_id == job_id).collect();
        Ok((applications, responses))
    }
}

/// MySQL implementation of JobRepository
pub struct MySqlJobRepository {
    pool: MySqlPool,
}

impl MySqlJobRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const JOB_WITH_COMPANY: &str = "SELECT j.*, c.name AS company, c.logo_url AS logo, i.name AS category
     FROM jobs j
     LEFT JOIN companies c ON j.company_id = c.id
     LEFT JOIN industries i ON j.industry_id = i.id";

const LABELLED_RESPONSES: &str = "SELECT r.application_id, f.field_label, f.field_type, r.field_value
     FROM job_application_responses r
     JOIN job_form_fields f ON r.field_id = f.id";

#[async_trait]
impl JobRepository for MySqlJobRepository {
    #[instrument(skip(self, job))]
    async fn create_job(&self, job: NewJob) -> Result<i64, AppError> {
        let result = sqlx::query(
            "INSERT INTO jobs (company_id, title, role, function_area, location, employment_type,
                experience_min, experience_max, salary_min, salary_max, hide_salary, vacancies,
                education, industry, industry_id, category_id, subcategory_id, responsibilities,
                qualifications, description, skills, labels, questions, walkin_details,
                qualification_category_id, qualification_subcategory_id, deadline, company_name,
                created_by)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(job.company_id)
        .bind(&job.title)
        .bind(&job.role)
        .bind(&job.function_area)
        .bind(&job.location)
        .bind(&job.employment_type)
        .bind(job.experience_min)
        .bind(job.experience_max)
        .bind(job.salary_min)
        .bind(job.salary_max)
        .bind(job.hide_salary)
        .bind(job.vacancies)
        .bind(&job.education)
        .bind(&job.industry)
        .bind(job.industry_id)
        .bind(job.category_id)
        .bind(job.subcategory_id)
        .bind(&job.responsibilities)
        .bind(&job.qualifications)
        .bind(&job.description)
        .bind(Json(&job.skills))
        .bind(Json(&job.labels))
        .bind(Json(&job.questions))
        .bind((!job.walkin_details.is_null()).then(|| Json(&job.walkin_details)))
        .bind(job.qualification_category_id)
        .bind(job.qualification_subcategory_id)
        .bind(job.deadline)
        .bind(&job.company_name)
        .bind(job.created_by)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert job");
            AppError::from(e)
        })?;

        let id = result.last_insert_id() as i64;
        debug!(job_id = id, "Job stored in database");
        Ok(id)
    }

    async fn get_job(&self, id: i64) -> Result<Option<JobModel>, AppError> {
        let job = sqlx::query_as::<_, JobModel>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    #[instrument(skip(self))]
    async fn list_with_company(&self) -> Result<Vec<JobWithCompany>, AppError> {
        let jobs = sqlx::query_as::<_, JobWithCompany>(&format!(
            "{} ORDER BY j.created_at DESC, j.id DESC",
            JOB_WITH_COMPANY
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    async fn get_with_company(&self, id: i64) -> Result<Option<JobWithCompany>, AppError> {
        let job = sqlx::query_as::<_, JobWithCompany>(&format!("{} WHERE j.id = ?", JOB_WITH_COMPANY))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    #[instrument(skip(self))]
    async fn filter_jobs(&self, filter: &JobFilter) -> Result<(Vec<JobModel>, i64), AppError> {
        let mut count = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM jobs");
        if let Some(company_id) = filter.company_id {
            count.push(" WHERE company_id = ").push_bind(company_id);
        }
        let (total,): (i64,) = count.build_query_as().fetch_one(&self.pool).await?;

        let direction = if filter.ascending { "ASC" } else { "DESC" };
        let mut query = QueryBuilder::<MySql>::new("SELECT * FROM jobs");
        if let Some(company_id) = filter.company_id {
            query.push(" WHERE company_id = ").push_bind(company_id);
        }
        query
            .push(format!(
                " ORDER BY {} {}, id {} LIMIT ",
                filter.sort.column(),
                direction,
                direction
            ))
            .push_bind(filter.per_page)
            .push(" OFFSET ")
            .push_bind(filter.offset());

        let jobs = query
            .build_query_as::<JobModel>()
            .fetch_all(&self.pool)
            .await?;
        Ok((jobs, total))
    }

    #[instrument(skip(self, patch))]
    async fn update_job(&self, id: i64, patch: &JobPatch) -> Result<Option<JobModel>, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut builder = QueryBuilder::<MySql>::new("UPDATE jobs SET ");
        let mut assignments = builder.separated(", ");
        for (column, value) in patch {
            assignments.push(format!("{} = ", column));
            match value {
                PatchValue::Text(v) => assignments.push_bind_unseparated(v.clone()),
                PatchValue::Int(v) => assignments.push_bind_unseparated(*v),
                PatchValue::Bool(v) => assignments.push_bind_unseparated(*v),
                PatchValue::Date(v) => assignments.push_bind_unseparated(*v),
                PatchValue::Json(v) => assignments.push_bind_unseparated(Json(v.clone())),
            };
        }
        assignments.push("updated_at = NOW()");
        builder.push(" WHERE id = ").push_bind(id);
        builder.build().execute(&mut *tx).await?;

        let job = sqlx::query_as::<_, JobModel>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(job)
    }

    #[instrument(skip(self))]
    async fn delete_job(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, fields))]
    async fn create_form_fields(
        &self,
        job_id: i64,
        fields: &[NewFormField],
    ) -> Result<Vec<i64>, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(fields.len());

        for (index, field) in fields.iter().enumerate() {
            let result = sqlx::query(
                "INSERT INTO job_form_fields
                    (job_id, field_label, field_type, is_required, field_options, is_multi, order_no)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(job_id)
            .bind(&field.field_label)
            .bind(&field.field_type)
            .bind(field.is_required)
            .bind(Json(&field.field_options))
            .bind(field.is_multi)
            .bind(index as i32 + 1)
            .execute(&mut *tx)
            .await?;
            ids.push(result.last_insert_id() as i64);
        }

        tx.commit().await?;
        Ok(ids)
    }

    async fn form_fields(&self, job_id: i64) -> Result<Vec<FormFieldModel>, AppError> {
        let fields = sqlx::query_as::<_, FormFieldModel>(
            "SELECT * FROM job_form_fields WHERE job_id = ? ORDER BY order_no ASC, id ASC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(fields)
    }

    #[instrument(skip(self, responses))]
    async fn create_application(
        &self,
        job_id: i64,
        candidate_id: Option<i64>,
        responses: &[NewResponse],
    ) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO job_applications (job_id, candidate_id, applied_at) VALUES (?, ?, NOW())",
        )
        .bind(job_id)
        .bind(candidate_id)
        .execute(&mut *tx)
        .await?;
        let application_id = result.last_insert_id() as i64;

        for response in responses {
            sqlx::query(
                "INSERT INTO job_application_responses (application_id, job_id, field_id, field_value)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(application_id)
            .bind(job_id)
            .bind(response.field_id)
            .bind(&response.field_value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(application_id, "Application stored");
        Ok(application_id)
    }

    async fn application_responses(
        &self,
        application_id: i64,
    ) -> Result<Vec<LabelledResponse>, AppError> {
        let rows = sqlx::query_as::<_, LabelledResponse>(&format!(
            "{} WHERE r.application_id = ? ORDER BY f.order_no, r.id",
            LABELLED_RESPONSES
        ))
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn applications_for_job(
        &self,
        job_id: i64,
    ) -> Result<(Vec<ApplicationModel>, Vec<LabelledResponse>), AppError> {
        let applications = sqlx::query_as::<_, ApplicationModel>(
            "SELECT id, job_id, candidate_id, applied_at FROM job_applications
             WHERE job_id = ? ORDER BY applied_at, id",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        let responses = sqlx::query_as::<_, LabelledResponse>(&format!(
            "{} WHERE r.job_id = ? ORDER BY r.application_id, f.order_no, r.id",
            LABELLED_RESPONSES
        ))
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok((applications, responses))
    }
}
