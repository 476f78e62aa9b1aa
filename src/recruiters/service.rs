use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{NewRecruiter, RecruiterModel, RecruiterUpdate},
    repository::RecruiterRepository,
    types::{
        CompanyRequest, CompanySavedResponse, LoggedInRecruiter, LoginRequest, LoginResponse,
        RecruiterCompanyResponse, RecruiterProfile, RecruiterSummary, RegisterRequest,
        RegisterResponse, RegisteredRecruiter, UpdateRequest,
    },
};
use crate::auth::{hash_password, verify_password, AuthClaims, Role, TokenConfig};
use crate::companies::{models::CompanyDraft, models::CompanyRef, repository::CompanyRepository};
use crate::shared::AppError;
use crate::validation::{self, non_blank, COMPANY_SIZES};

/// Service for recruiter accounts and company profiles
pub struct RecruiterService {
    repository: Arc<dyn RecruiterRepository + Send + Sync>,
    companies: Arc<dyn CompanyRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl RecruiterService {
    pub fn new(
        repository: Arc<dyn RecruiterRepository + Send + Sync>,
        companies: Arc<dyn CompanyRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            repository,
            companies,
            token_config,
        }
    }

    fn token_for(&self, recruiter: &RecruiterModel) -> Result<String, AppError> {
        self.token_config.create_token(
            recruiter.id,
            Some(recruiter.email.clone()),
            &recruiter.role,
            recruiter.company_id,
        )
    }

    /// Recruiter endpoints are closed to candidate tokens
    fn recruiter_id(claims: &AuthClaims) -> Result<i64, AppError> {
        if claims.is_candidate() {
            return Err(AppError::Forbidden(
                "Recruiter account required".to_string(),
            ));
        }
        Ok(claims.sub)
    }

    #[instrument(skip(self, request))]
    pub async fn register(&self, request: RegisterRequest) -> Result<RegisterResponse, AppError> {
        let name = validation::required(request.name.as_deref(), "Name is required")?;
        let email =
            validation::required_email(request.email.as_deref(), "Valid email is required")?;
        let password = validation::password(request.password.as_deref())?;
        let designation =
            validation::required(request.designation.as_deref(), "Designation is required")?;

        if self.repository.find_by_email(&email).await?.is_some() {
            warn!("Recruiter registration with an existing email");
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let id = self
            .repository
            .create_recruiter(NewRecruiter {
                name,
                email,
                password_hash: hash_password(&password)?,
                designation: Some(designation),
                role: Role::Recruiter.to_string(),
                company_id: None,
                is_verified: false,
            })
            .await?;

        let recruiter = self
            .repository
            .get_recruiter(id)
            .await?
            .ok_or_else(|| AppError::Internal("recruiter missing after insert".to_string()))?;
        let token = self.token_for(&recruiter)?;

        info!(recruiter_id = id, "Recruiter registered");

        Ok(RegisterResponse {
            message: "Recruiter registered successfully".to_string(),
            user: RegisteredRecruiter {
                id,
                name: recruiter.name,
                email: recruiter.email,
                designation: recruiter.designation,
            },
            token,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let (Some(email), Some(password)) = (
            request.email.as_deref().map(str::trim).filter(|e| !e.is_empty()),
            request.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::BadRequest(
                "Email and password are required".to_string(),
            ));
        };

        let recruiter = self
            .repository
            .find_by_email(email)
            .await?
            .filter(|r| verify_password(password, &r.password))
            .ok_or_else(|| {
                warn!("Recruiter login failed");
                AppError::Unauthorized("Invalid credentials".to_string())
            })?;

        let company = match recruiter.company_id {
            Some(id) => self.companies.get_company(id).await?,
            None => None,
        };
        let token = self.token_for(&recruiter)?;

        info!(recruiter_id = recruiter.id, "Recruiter logged in");

        Ok(LoginResponse {
            token,
            user: LoggedInRecruiter {
                id: recruiter.id,
                name: recruiter.name,
                email: recruiter.email,
                role: recruiter.role,
                company_id: recruiter.company_id,
            },
            company,
        })
    }

    #[instrument(skip(self, claims, request))]
    pub async fn save_company(
        &self,
        claims: &AuthClaims,
        request: CompanyRequest,
    ) -> Result<CompanySavedResponse, AppError> {
        let recruiter_id = Self::recruiter_id(claims)?;
        let draft = Self::validate_company(request)?;

        let company = self.repository.upsert_company(recruiter_id, draft).await?;
        let recruiter = self
            .repository
            .get_recruiter(recruiter_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Recruiter not found".to_string()))?;
        let token = self.token_for(&recruiter)?;

        info!(company_id = company.id, recruiter_id, "Company details saved");

        Ok(CompanySavedResponse {
            message: "Company details saved successfully".to_string(),
            company_id: company.id,
            company,
            token,
        })
    }

    fn validate_company(request: CompanyRequest) -> Result<CompanyDraft, AppError> {
        let name = validation::required(request.name.as_deref(), "Company name is required")?;
        let website = non_blank(request.website);
        if website.as_deref().is_some_and(|w| !validation::is_http_url(w)) {
            return Err(AppError::BadRequest(
                "Valid website URL is required".to_string(),
            ));
        }
        let video_url = non_blank(request.video_url);
        if video_url.as_deref().is_some_and(|v| !validation::is_http_url(v)) {
            return Err(AppError::BadRequest(
                "Valid video URL is required".to_string(),
            ));
        }
        let size = non_blank(request.size);
        if size.as_deref().is_some_and(|s| !COMPANY_SIZES.contains(&s)) {
            return Err(AppError::BadRequest("Invalid company size".to_string()));
        }

        Ok(CompanyDraft {
            name,
            description: non_blank(request.description),
            website,
            logo_url: non_blank(request.logo_url),
            banner_url: non_blank(request.banner_url),
            video_url,
            location: non_blank(request.location),
            pincode: non_blank(request.pincode),
            state: non_blank(request.state),
            industry: non_blank(request.industry),
            size,
            established_year: request.established_year,
        })
    }

    pub async fn profile(&self, id: i64) -> Result<RecruiterProfile, AppError> {
        let recruiter = self
            .repository
            .get_recruiter(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(RecruiterProfile {
            name: recruiter.name,
            email: recruiter.email,
            designation: recruiter.designation,
        })
    }

    #[instrument(skip(self, claims, request))]
    pub async fn update(&self, claims: &AuthClaims, request: UpdateRequest) -> Result<(), AppError> {
        let id = Self::recruiter_id(claims)?;
        let name = validation::required(request.name.as_deref(), "Name is required")?;
        let designation =
            validation::required(request.designation.as_deref(), "Designation is required")?;

        let email = match non_blank(request.email) {
            Some(email) => {
                let email = validation::required_email(Some(&email), "Valid email is required")?;
                if self.repository.email_taken_by_other(&email, id).await? {
                    return Err(AppError::Conflict("Email already exists".to_string()));
                }
                Some(email)
            }
            None => None,
        };

        let password_hash = match request.password.filter(|p| !p.is_empty()) {
            Some(password) => Some(hash_password(&validation::password(Some(&password))?)?),
            None => None,
        };

        let updated = self
            .repository
            .update_recruiter(
                id,
                &RecruiterUpdate {
                    name,
                    designation,
                    email,
                    password_hash,
                },
            )
            .await?;
        if !updated {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        info!(recruiter_id = id, "Recruiter details updated");
        Ok(())
    }

    pub async fn company_of(&self, id: i64) -> Result<RecruiterCompanyResponse, AppError> {
        let recruiter = self
            .repository
            .get_recruiter(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Recruiter not found".to_string()))?;
        let company = self.repository.company_created_by(id).await?;

        Ok(RecruiterCompanyResponse {
            recruiter: RecruiterSummary {
                id: recruiter.id,
                name: recruiter.name,
                email: recruiter.email,
                designation: recruiter.designation,
                company_id: recruiter.company_id,
            },
            company,
        })
    }

    pub async fn companies_of(&self, id: i64) -> Result<Vec<CompanyRef>, AppError> {
        let companies = self.repository.linked_companies(id).await?;
        if companies.is_empty() {
            return Err(AppError::NotFound(
                "No companies found for this recruiter".to_string(),
            ));
        }
        Ok(companies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn company(name: &str) -> CompanyRequest {
        CompanyRequest {
            name: Some(name.to_string()),
            ..CompanyRequest::default()
        }
    }

    #[rstest]
    #[case(CompanyRequest::default(), "Company name is required")]
    #[case(CompanyRequest { website: Some("acme.io".into()), ..company("Acme") }, "Valid website URL is required")]
    #[case(CompanyRequest { video_url: Some("ftp://x".into()), ..company("Acme") }, "Valid video URL is required")]
    #[case(CompanyRequest { size: Some("5000+".into()), ..company("Acme") }, "Invalid company size")]
    fn test_validate_company_rejects(#[case] request: CompanyRequest, #[case] expected: &str) {
        match RecruiterService::validate_company(request) {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, expected),
            other => panic!("expected bad request, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_company_blank_optionals_become_none() {
        let draft = RecruiterService::validate_company(CompanyRequest {
            website: Some("".to_string()),
            size: Some("11-50".to_string()),
            ..company("  Acme  ")
        })
        .unwrap();
        assert_eq!(draft.name, "Acme");
        assert_eq!(draft.website, None);
        assert_eq!(draft.size.as_deref(), Some("11-50"));
    }
}
