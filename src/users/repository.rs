use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySql, MySqlPool, Transaction};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::models::{
    ProfileUpdate, UserEducation, UserExperience, UserLanguage, UserModel, UserProfile,
    UserProject,
};
use crate::jobs::models::JobModel;
use crate::memory::MemoryStore;
use crate::shared::AppError;

/// Repository trait for candidate accounts, their profiles and saved jobs
#[async_trait]
pub trait UserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;
    async fn create_user(&self, name: &str, email: &str, password_hash: &str)
        -> Result<i64, AppError>;
    async fn touch_last_login(&self, id: i64) -> Result<(), AppError>;
    async fn get_profile(&self, id: i64) -> Result<Option<UserProfile>, AppError>;
    /// Replaces the profile atomically; `false` when the user does not exist
    async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<bool, AppError>;
    async fn list_saved_jobs(&self, user_id: i64) -> Result<Vec<JobModel>, AppError>;
    /// `false` when the job does not exist; saving twice is not an error
    async fn save_job(&self, user_id: i64, job_id: i64) -> Result<bool, AppError>;
    /// `false` when the job was not saved
    async fn unsave_job(&self, user_id: i64, job_id: i64) -> Result<bool, AppError>;
}

pub struct InMemoryUserRepository {
    store: Arc<MemoryStore>,
}

impl InMemoryUserRepository {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let tables = self.store.tables()?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    #[instrument(skip(self, password_hash))]
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, AppError> {
        let mut tables = self.store.tables()?;
        if tables.users.values().any(|u| u.email == email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        let id = tables.next_id();
        tables
            .users
            .insert(id, UserModel::new(id, name, email, password_hash));
        debug!(user_id = id, "User stored in memory");
        Ok(id)
    }

    async fn touch_last_login(&self, id: i64) -> Result<(), AppError> {
        let mut tables = self.store.tables()?;
        if let Some(user) = tables.users.get_mut(&id) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }

    async fn get_profile(&self, id: i64) -> Result<Option<UserProfile>, AppError> {
        let tables = self.store.tables()?;
        let Some(user) = tables.users.get(&id).cloned() else {
            return Ok(None);
        };
        Ok(Some(UserProfile {
            user,
            languages: tables.user_languages.get(&id).cloned().unwrap_or_default(),
            projects: tables.user_projects.get(&id).cloned().unwrap_or_default(),
            education: tables.user_education.get(&id).cloned().unwrap_or_default(),
            experience: tables.user_experience.get(&id).cloned().unwrap_or_default(),
        }))
    }

    #[instrument(skip(self, update))]
    async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<bool, AppError> {
        let mut tables = self.store.tables()?;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(false);
        };
        user.apply(&update.fields);
        tables.user_languages.insert(id, update.languages.clone());
        tables.user_projects.insert(id, update.projects.clone());
        tables.user_education.insert(id, update.education.clone());
        tables.user_experience.insert(id, update.experience.clone());
        Ok(true)
    }

    async fn list_saved_jobs(&self, user_id: i64) -> Result<Vec<JobModel>, AppError> {
        let tables = self.store.tables()?;
        Ok(tables
            .saved_jobs
            .iter()
            .rev()
            .filter(|(user, _)| *user == user_id)
            .filter_map(|(_, job)| tables.jobs.get(job).cloned())
            .collect())
    }

    async fn save_job(&self, user_id: i64, job_id: i64) -> Result<bool, AppError> {
        let mut tables = self.store.tables()?;
        if !tables.jobs.contains_key(&job_id) {
            return Ok(false);
        }
        if !tables.saved_jobs.contains(&(user_id, job_id)) {
            tables.saved_jobs.push((user_id, job_id));
        }
        Ok(true)
    }

    async fn unsave_job(&self, user_id: i64, job_id: i64) -> Result<bool, AppError> {
        let mut tables = self.store.tables()?;
        let before = tables.saved_jobs.len();
        tables
            .saved_jobs
            .retain(|entry| *entry != (user_id, job_id));
        Ok(tables.saved_jobs.len() < before)
    }
}

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn replace_children(
        tx: &mut Transaction<'_, MySql>,
        id: i64,
        update: &ProfileUpdate,
    ) -> Result<(), AppError> {
        for table in [
            "user_languages",
            "user_projects",
            "user_education",
            "user_experience",
        ] {
            sqlx::query(&format!("DELETE FROM {} WHERE user_id = ?", table))
                .bind(id)
                .execute(&mut **tx)
                .await?;
        }

        for language in &update.languages {
            sqlx::query(
                "INSERT INTO user_languages (user_id, language, proficiency) VALUES (?, ?, ?)",
            )
            .bind(id)
            .bind(&language.language)
            .bind(&language.proficiency)
            .execute(&mut **tx)
            .await?;
        }

        for project in &update.projects {
            sqlx::query(
                "INSERT INTO user_projects (user_id, project_title, associated_with, client,
                    project_status, start_year, start_month, end_year, end_month, description,
                    project_location, project_site, employment_nature, team_size, role,
                    role_description, skills_used)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(&project.project_title)
            .bind(&project.associated_with)
            .bind(&project.client)
            .bind(&project.project_status)
            .bind(project.start_year)
            .bind(project.start_month)
            .bind(project.end_year)
            .bind(project.end_month)
            .bind(&project.description)
            .bind(&project.project_location)
            .bind(&project.project_site)
            .bind(&project.employment_nature)
            .bind(project.team_size)
            .bind(&project.role)
            .bind(&project.role_description)
            .bind(&project.skills_used)
            .execute(&mut **tx)
            .await?;
        }

        for education in &update.education {
            sqlx::query(
                "INSERT INTO user_education (user_id, degree, institution, field_of_study,
                    start_year, end_year, grade)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(&education.degree)
            .bind(&education.institution)
            .bind(&education.field_of_study)
            .bind(education.start_year)
            .bind(education.end_year)
            .bind(&education.grade)
            .execute(&mut **tx)
            .await?;
        }

        for experience in &update.experience {
            sqlx::query(
                "INSERT INTO user_experience (user_id, company_name, designation,
                    employment_type, start_year, end_year, is_current, description)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(&experience.company_name)
            .bind(&experience.designation)
            .bind(&experience.employment_type)
            .bind(experience.start_year)
            .bind(experience.end_year)
            .bind(experience.is_current)
            .bind(&experience.description)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let user = sqlx::query_as::<_, UserModel>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    #[instrument(skip(self, password_hash))]
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, AppError> {
        let result = sqlx::query("INSERT INTO users (name, email, password) VALUES (?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to insert user");
                AppError::from(e)
            })?;

        let id = result.last_insert_id() as i64;
        debug!(user_id = id, "User stored in database");
        Ok(id)
    }

    async fn touch_last_login(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_profile(&self, id: i64) -> Result<Option<UserProfile>, AppError> {
        let Some(user) = sqlx::query_as::<_, UserModel>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let languages = sqlx::query_as::<_, UserLanguage>(
            "SELECT language, proficiency FROM user_languages WHERE user_id = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let projects = sqlx::query_as::<_, UserProject>(
            "SELECT project_title, associated_with, client, project_status, start_year,
                start_month, end_year, end_month, description, project_location, project_site,
                employment_nature, team_size, role, role_description, skills_used
             FROM user_projects WHERE user_id = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let education = sqlx::query_as::<_, UserEducation>(
            "SELECT degree, institution, field_of_study, start_year, end_year, grade
             FROM user_education WHERE user_id = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let experience = sqlx::query_as::<_, UserExperience>(
            "SELECT company_name, designation, employment_type, start_year, end_year,
                is_current, description
             FROM user_experience WHERE user_id = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(UserProfile {
            user,
            languages,
            projects,
            education,
            experience,
        }))
    }

    #[instrument(skip(self, update))]
    async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE id = ? FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(false);
        }

        let fields = &update.fields;
        sqlx::query(
            "UPDATE users SET name = COALESCE(?, name), phone = ?, address = ?,
                date_of_birth = ?, gender = ?, profile_picture = ?, resume = ?,
                resume_headline = ?, career_profile = ?, certifications = ?, skills = ?,
                education = ?, experience = ?, job_preferences = ?, notification_settings = ?
             WHERE id = ?",
        )
        .bind(&fields.name)
        .bind(&fields.phone)
        .bind(&fields.address)
        .bind(fields.date_of_birth)
        .bind(&fields.gender)
        .bind(&fields.profile_picture)
        .bind(&fields.resume)
        .bind(&fields.resume_headline)
        .bind(&fields.career_profile)
        .bind(&fields.certifications)
        .bind(&fields.skills)
        .bind(&fields.education)
        .bind(&fields.experience)
        .bind(&fields.job_preferences)
        .bind(&fields.notification_settings)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        Self::replace_children(&mut tx, id, update).await?;

        tx.commit().await?;
        debug!(user_id = id, "Profile replaced");
        Ok(true)
    }

    async fn list_saved_jobs(&self, user_id: i64) -> Result<Vec<JobModel>, AppError> {
        let jobs = sqlx::query_as::<_, JobModel>(
            "SELECT j.* FROM saved_jobs s
             JOIN jobs j ON j.id = s.job_id
             WHERE s.user_id = ?
             ORDER BY s.saved_at DESC, j.id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    #[instrument(skip(self))]
    async fn save_job(&self, user_id: i64, job_id: i64) -> Result<bool, AppError> {
        let job: Option<(i64,)> = sqlx::query_as("SELECT id FROM jobs WHERE id = ?")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;
        if job.is_none() {
            return Ok(false);
        }

        sqlx::query("INSERT IGNORE INTO saved_jobs (user_id, job_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn unsave_job(&self, user_id: i64, job_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM saved_jobs WHERE user_id = ? AND job_id = ?")
            .bind(user_id)
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
