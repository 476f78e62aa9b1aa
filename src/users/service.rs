use chrono::{TimeZone, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{ProfileUpdate, UserProfile},
    repository::UserRepository,
    types::{
        AuthResponse, EducationInput, ExperienceInput, LanguageInput, LoginRequest,
        ProfileUpdateRequest, ProjectInput, RegisterRequest, UserSummary,
    },
};
use crate::auth::{
    hash_password, hash_token, repository::TokenBlacklistRepository, verify_password, AuthClaims,
    Role, TokenConfig,
};
use crate::jobs::models::JobModel;
use crate::shared::AppError;
use crate::validation;

/// Service for candidate accounts
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>, token_config: TokenConfig) -> Self {
        Self {
            repository,
            token_config,
        }
    }

    #[instrument(skip(self, request))]
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AppError> {
        let name = validation::required(request.name.as_deref(), "Name is required")?;
        let email =
            validation::required_email(request.email.as_deref(), "A valid email is required")?;
        let password = validation::password(request.password.as_deref())?;

        if self.repository.find_by_email(&email).await?.is_some() {
            warn!("Registration attempted with an existing email");
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let hash = hash_password(&password)?;
        let id = self.repository.create_user(&name, &email, &hash).await?;
        let token = self.token_config.create_token(
            id,
            Some(email.clone()),
            Role::Candidate.as_ref(),
            None,
        )?;

        info!(user_id = id, "Candidate registered");

        Ok(AuthResponse {
            message: "User registered successfully".to_string(),
            user: UserSummary {
                id,
                name: Some(name),
                email,
            },
            token,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AppError> {
        let (Some(email), Some(password)) = (
            request.email.as_deref().map(str::trim).filter(|e| !e.is_empty()),
            request.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::BadRequest(
                "Email and password are required".to_string(),
            ));
        };

        let user = self
            .repository
            .find_by_email(email)
            .await?
            .filter(|user| verify_password(password, &user.password))
            .ok_or_else(|| {
                warn!("Candidate login failed");
                AppError::Unauthorized("Invalid email or password".to_string())
            })?;

        self.repository.touch_last_login(user.id).await?;
        let token = self.token_config.create_token(
            user.id,
            Some(user.email.clone()),
            Role::Candidate.as_ref(),
            None,
        )?;

        info!(user_id = user.id, "Candidate logged in");

        Ok(AuthResponse {
            message: "Login successful".to_string(),
            user: UserSummary {
                id: user.id,
                name: None,
                email: user.email,
            },
            token,
        })
    }

    /// Blacklists the presented token until it would have expired anyway
    #[instrument(skip(self, blacklist, claims, token))]
    pub async fn logout(
        &self,
        blacklist: Arc<dyn TokenBlacklistRepository + Send + Sync>,
        claims: &AuthClaims,
        token: &str,
    ) -> Result<(), AppError> {
        let expires_at = Utc
            .timestamp_opt(claims.exp as i64, 0)
            .single()
            .unwrap_or_else(Utc::now);
        blacklist.revoke(&hash_token(token), expires_at).await?;
        info!(sub = claims.sub, "Token revoked on logout");
        Ok(())
    }

    pub async fn get_profile(&self, id: i64) -> Result<UserProfile, AppError> {
        self.repository
            .get_profile(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    #[instrument(skip(self, claims, request))]
    pub async fn update_profile(
        &self,
        claims: &AuthClaims,
        id: i64,
        request: ProfileUpdateRequest,
    ) -> Result<(), AppError> {
        if !claims.is_candidate() || claims.sub != id {
            warn!(sub = claims.sub, target = id, "Profile update for another account");
            return Err(AppError::Forbidden(
                "You can only update your own profile".to_string(),
            ));
        }

        let update = ProfileUpdate {
            fields: request.profile.into(),
            languages: request
                .languages
                .into_iter()
                .filter_map(LanguageInput::into_model)
                .collect(),
            projects: request
                .projects
                .into_iter()
                .filter_map(ProjectInput::into_model)
                .collect(),
            education: request
                .education
                .into_iter()
                .filter_map(EducationInput::into_model)
                .collect(),
            experience: request
                .experience
                .into_iter()
                .filter_map(ExperienceInput::into_model)
                .collect(),
        };

        if !self.repository.update_profile(id, &update).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        info!(user_id = id, "Profile updated");
        Ok(())
    }

    /// Saved jobs belong to candidate ids; recruiter ids live in another table
    fn candidate_id(claims: &AuthClaims) -> Result<i64, AppError> {
        if !claims.is_candidate() {
            warn!(sub = claims.sub, role = %claims.role, "Saved jobs requested by a non-candidate");
            return Err(AppError::Forbidden(
                "Candidate account required".to_string(),
            ));
        }
        Ok(claims.sub)
    }

    pub async fn saved_jobs(&self, claims: &AuthClaims) -> Result<Vec<JobModel>, AppError> {
        self.repository
            .list_saved_jobs(Self::candidate_id(claims)?)
            .await
    }

    pub async fn save_job(&self, claims: &AuthClaims, job_id: i64) -> Result<(), AppError> {
        if !self
            .repository
            .save_job(Self::candidate_id(claims)?, job_id)
            .await?
        {
            return Err(AppError::NotFound("Job not found".to_string()));
        }
        Ok(())
    }

    pub async fn unsave_job(&self, claims: &AuthClaims, job_id: i64) -> Result<(), AppError> {
        if !self
            .repository
            .unsave_job(Self::candidate_id(claims)?, job_id)
            .await?
        {
            return Err(AppError::NotFound("Saved job not found".to_string()));
        }
        Ok(())
    }
}
