use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::{NewInvite, OpenInvite},
    repository::InviteRepository,
    types::{
        AcceptRequest, CompanyInvitesResponse, InviteDetails, InviteRegisterRequest,
        InviteRegisterResponse, InviteSentResponse, SendInviteRequest,
    },
};
use crate::auth::{generate_token, hash_password, hash_token, AuthClaims, Role, TokenConfig};
use crate::companies::repository::CompanyRepository;
use crate::config::AppConfig;
use crate::mail::{InviteEmail, Mailer};
use crate::recruiters::{models::NewRecruiter, repository::RecruiterRepository};
use crate::shared::AppError;
use crate::validation::{self, is_blank, is_valid_email};

const INVALID_TOKEN: &str = "Invalid, used, or expired token";

/// Service for inviting people into a company and redeeming those invites
pub struct InviteService {
    invites: Arc<dyn InviteRepository + Send + Sync>,
    recruiters: Arc<dyn RecruiterRepository + Send + Sync>,
    companies: Arc<dyn CompanyRepository + Send + Sync>,
    mailer: Arc<dyn Mailer + Send + Sync>,
    token_config: TokenConfig,
    config: Arc<AppConfig>,
}

impl InviteService {
    pub fn new(
        invites: Arc<dyn InviteRepository + Send + Sync>,
        recruiters: Arc<dyn RecruiterRepository + Send + Sync>,
        companies: Arc<dyn CompanyRepository + Send + Sync>,
        mailer: Arc<dyn Mailer + Send + Sync>,
        token_config: TokenConfig,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            invites,
            recruiters,
            companies,
            mailer,
            token_config,
            config,
        }
    }

    /// Hashes the presented token and looks up the open invite it belongs to
    async fn open_invite(&self, token: Option<&str>) -> Result<OpenInvite, AppError> {
        let token = match token.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AppError::BadRequest("Token is required".to_string())),
        };
        self.invites
            .find_open(&hash_token(token))
            .await?
            .ok_or_else(|| AppError::BadRequest(INVALID_TOKEN.to_string()))
    }

    fn company_of(claims: &AuthClaims) -> Result<i64, AppError> {
        claims
            .company_id
            .ok_or_else(|| AppError::Unauthorized("Company not found".to_string()))
    }

    #[instrument(skip(self, claims, request))]
    pub async fn send_invite(
        &self,
        claims: &AuthClaims,
        request: SendInviteRequest,
    ) -> Result<InviteSentResponse, AppError> {
        let email = request
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| is_valid_email(e))
            .ok_or_else(|| AppError::BadRequest("Invalid email address".to_string()))?
            .to_string();
        let role = request
            .role
            .as_deref()
            .and_then(|r| r.parse::<Role>().ok())
            .filter(|r| r.is_invitable())
            .ok_or_else(|| AppError::BadRequest("Invalid role".to_string()))?;

        if !claims.role().is_some_and(Role::can_invite) {
            warn!(caller = claims.sub, role = %claims.role, "Invite attempt without permission");
            return Err(AppError::Forbidden(
                "Only owners or admins can create invites".to_string(),
            ));
        }

        let company = match claims.company_id {
            Some(id) => self.companies.get_company(id).await?,
            None => None,
        }
        .ok_or_else(|| AppError::NotFound("Company not found".to_string()))?;

        let token = generate_token();
        let expires_at = Utc::now() + Duration::days(self.config.invite_expiration_days);
        let invite_id = self
            .invites
            .create_invite(NewInvite {
                company_id: company.id,
                email: email.clone(),
                token_hash: hash_token(&token),
                role: role.to_string(),
                expires_at,
                created_by: claims.sub,
            })
            .await?;

        let message = InviteEmail {
            to: email,
            company_name: company.name,
            role: role.to_string(),
            link: self.config.invite_link(&token),
            expires_at,
        };
        if let Err(e) = self.mailer.send_invite(&message).await {
            // An invite nobody received can never be redeemed
            self.invites.delete_invite(invite_id).await?;
            return Err(e);
        }

        info!(invite_id, company_id = company.id, role = %role, "Invite sent");

        Ok(InviteSentResponse {
            message: "Invite created and email sent successfully".to_string(),
            invite_id,
        })
    }

    pub async fn validate(&self, token: Option<&str>) -> Result<InviteDetails, AppError> {
        let invite = self.open_invite(token).await?;
        Ok(InviteDetails {
            email: invite.email,
            company_name: invite.company_name,
            role: invite.role,
            company_id: invite.company_id,
        })
    }

    #[instrument(skip(self, claims, request))]
    pub async fn accept(&self, claims: &AuthClaims, request: AcceptRequest) -> Result<(), AppError> {
        let invite = self.open_invite(request.token.as_deref()).await?;

        if claims.is_candidate() {
            return Err(AppError::Forbidden(
                "Recruiter account required".to_string(),
            ));
        }
        let for_caller = claims
            .email
            .as_deref()
            .is_some_and(|e| e.trim().eq_ignore_ascii_case(invite.email.trim()));
        if !for_caller {
            return Err(AppError::Forbidden(
                "Invite is not for this email".to_string(),
            ));
        }

        if !self.invites.accept(&invite, claims.sub).await? {
            warn!(invite_id = invite.id, "Invite consumed concurrently");
            return Err(AppError::BadRequest(INVALID_TOKEN.to_string()));
        }

        info!(invite_id = invite.id, recruiter_id = claims.sub, "Invite accepted");
        Ok(())
    }

    #[instrument(skip(self, request))]
    pub async fn register(
        &self,
        request: InviteRegisterRequest,
    ) -> Result<InviteRegisterResponse, AppError> {
        if is_blank(request.token.as_deref())
            || is_blank(request.name.as_deref())
            || request.password.as_deref().map_or(true, str::is_empty)
        {
            return Err(AppError::BadRequest(
                "Token, name, and password are required".to_string(),
            ));
        }
        let password = validation::password(request.password.as_deref())?;
        let invite = self.open_invite(request.token.as_deref()).await?;

        if self.recruiters.find_by_email(&invite.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let recruiter_id = self
            .invites
            .register(
                &invite,
                NewRecruiter {
                    name: request.name.unwrap_or_default().trim().to_string(),
                    email: invite.email.clone(),
                    password_hash: hash_password(&password)?,
                    designation: validation::non_blank(request.designation),
                    role: invite.role.clone(),
                    company_id: Some(invite.company_id),
                    is_verified: true,
                },
            )
            .await?
            .ok_or_else(|| AppError::BadRequest(INVALID_TOKEN.to_string()))?;

        let auth_token = self.token_config.create_token(
            recruiter_id,
            Some(invite.email.clone()),
            &invite.role,
            Some(invite.company_id),
        )?;

        info!(invite_id = invite.id, recruiter_id, "Recruiter registered through invite");

        Ok(InviteRegisterResponse {
            message: "Registration successful".to_string(),
            auth_token,
        })
    }

    pub async fn company_invites(
        &self,
        claims: &AuthClaims,
    ) -> Result<CompanyInvitesResponse, AppError> {
        let company_id = Self::company_of(claims)?;
        let invites = self.invites.list_for_company(company_id).await?;
        Ok(CompanyInvitesResponse {
            message: "Invites fetched successfully".to_string(),
            count: invites.len(),
            invites,
        })
    }

    #[instrument(skip(self, claims))]
    pub async fn delete_invite(&self, claims: &AuthClaims, invite_id: i64) -> Result<(), AppError> {
        let company_id = Self::company_of(claims)?;
        if !self
            .invites
            .delete_with_recruiter(invite_id, company_id, claims.sub)
            .await?
        {
            return Err(AppError::NotFound(
                "Invite not found or unauthorized".to_string(),
            ));
        }
        info!(invite_id, company_id, "Invite deleted");
        Ok(())
    }
}
