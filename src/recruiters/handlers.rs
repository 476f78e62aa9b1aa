use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{
    service::RecruiterService,
    types::{
        CompanyRequest, CompanySavedResponse, LoginRequest, LoginResponse,
        RecruiterCompanyResponse, RecruiterProfile, RegisterRequest, RegisterResponse,
        UpdateRequest,
    },
};
use crate::auth::AuthClaims;
use crate::companies::models::CompanyRef;
use crate::shared::{AppError, AppJson, AppState, MessageResponse};

fn service(state: &AppState) -> RecruiterService {
    RecruiterService::new(
        Arc::clone(&state.recruiter_repository),
        Arc::clone(&state.company_repository),
        state.token_config.clone(),
    )
}

/// POST /api/recruiters/register
#[instrument(name = "register_recruiter", skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let response = service(&state).register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/recruiters/login
#[instrument(name = "login_recruiter", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(service(&state).login(request).await?))
}

/// POST /api/recruiters/company
///
/// Creates the caller's company on first use and updates it afterwards.
/// The returned token carries the company id.
#[instrument(name = "save_company", skip(state, claims, request))]
pub async fn save_company(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    AppJson(request): AppJson<CompanyRequest>,
) -> Result<Json<CompanySavedResponse>, AppError> {
    Ok(Json(service(&state).save_company(&claims, request).await?))
}

/// GET /api/recruiters/:user_id
#[instrument(name = "get_recruiter", skip(state))]
pub async fn get_recruiter(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<RecruiterProfile>, AppError> {
    Ok(Json(service(&state).profile(user_id).await?))
}

/// PATCH /api/recruiters/update-user
#[instrument(name = "update_recruiter", skip(state, claims, request))]
pub async fn update_recruiter(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    AppJson(request): AppJson<UpdateRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    service(&state).update(&claims, request).await?;
    Ok(Json(MessageResponse::new("Recruiters details updated")))
}

/// GET /api/recruiters/:user_id/company
#[instrument(name = "recruiter_company", skip(state))]
pub async fn recruiter_company(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<RecruiterCompanyResponse>, AppError> {
    Ok(Json(service(&state).company_of(user_id).await?))
}

/// GET /api/recruiters/:user_id/companies
#[instrument(name = "recruiter_companies", skip(state))]
pub async fn recruiter_companies(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<CompanyRef>>, AppError> {
    Ok(Json(service(&state).companies_of(user_id).await?))
}

#[cfg(test)]
mod tests {
    use crate::build_router;
    use crate::shared::test_utils::{bearer, send, AppStateBuilder};
    use axum::{http::StatusCode, Router};
    use serde_json::{json, Value};

    async fn register(app: Router, email: &str) -> Value {
        let (status, body) = send(
            app,
            "POST",
            "/api/recruiters/register",
            None,
            Some(json!({
                "name": "Rita Recruiter",
                "email": email,
                "password": "secret1",
                "designation": "Talent Lead"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn test_register_validation_order() {
        let app = build_router(AppStateBuilder::new().build());
        let cases = vec![
            (json!({}), "Name is required"),
            (json!({"name": "Rita"}), "Valid email is required"),
            (
                json!({"name": "Rita", "email": "rita@acme.io", "password": "123"}),
                "Password must be at least 6 characters",
            ),
            (
                json!({"name": "Rita", "email": "rita@acme.io", "password": "secret1"}),
                "Designation is required",
            ),
        ];

        for (body, expected) in cases {
            let (status, response) =
                send(app.clone(), "POST", "/api/recruiters/register", None, Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response["error"], expected);
        }
    }

    #[tokio::test]
    async fn test_register_duplicate_and_login() {
        let app = build_router(AppStateBuilder::new().build());
        let body = register(app.clone(), "rita@acme.io").await;
        assert_eq!(body["user"]["designation"], "Talent Lead");

        let (status, _) = send(
            app.clone(),
            "POST",
            "/api/recruiters/register",
            None,
            Some(json!({
                "name": "Rita", "email": "rita@acme.io",
                "password": "secret1", "designation": "HR"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            app.clone(),
            "POST",
            "/api/recruiters/login",
            None,
            Some(json!({"email": "rita@acme.io", "password": "nope-nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            app,
            "POST",
            "/api/recruiters/login",
            None,
            Some(json!({"email": "rita@acme.io", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["role"], "recruiter");
        assert!(body["company"].is_null());
    }

    #[tokio::test]
    async fn test_company_upsert_issues_token_with_company() {
        let state = AppStateBuilder::new().build();
        let app = build_router(state.clone());
        let body = register(app.clone(), "rita@acme.io").await;
        let id = body["user"]["id"].as_i64().unwrap();
        let auth = format!("Bearer {}", body["token"].as_str().unwrap());

        let (status, body) = send(
            app.clone(),
            "POST",
            "/api/recruiters/company",
            Some(&auth),
            Some(json!({"name": "Acme", "website": "https://acme.io", "size": "11-50",
                        "logo_url": "/uploads/logos/acme.png"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let company_id = body["companyId"].as_i64().unwrap();
        let claims = state
            .token_config
            .validate_token(body["token"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.company_id, Some(company_id));

        // Second save updates the same row and keeps the logo
        let (_, body) = send(
            app.clone(),
            "POST",
            "/api/recruiters/company",
            Some(&auth),
            Some(json!({"name": "Acme Labs"})),
        )
        .await;
        assert_eq!(body["companyId"].as_i64(), Some(company_id));
        assert_eq!(body["company"]["logo_url"], "/uploads/logos/acme.png");

        let (status, body) = send(
            app.clone(),
            "GET",
            &format!("/api/recruiters/{}/company", id),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["company"]["name"], "Acme Labs");

        let (status, body) = send(
            app,
            "GET",
            &format!("/api/recruiters/{}/companies", id),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"].as_i64(), Some(company_id));
    }

    #[tokio::test]
    async fn test_company_rejects_bad_size() {
        let state = AppStateBuilder::new().build();
        let app = build_router(state.clone());
        let body = register(app.clone(), "rita@acme.io").await;
        let auth = format!("Bearer {}", body["token"].as_str().unwrap());

        let (status, body) = send(
            app,
            "POST",
            "/api/recruiters/company",
            Some(&auth),
            Some(json!({"name": "Acme", "size": "huge"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid company size");
    }

    #[tokio::test]
    async fn test_candidates_cannot_save_companies() {
        let state = AppStateBuilder::new().build();
        let auth = bearer(&state, 3, "cand@example.com", "candidate", None);
        let (status, _) = send(
            build_router(state),
            "POST",
            "/api/recruiters/company",
            Some(&auth),
            Some(json!({"name": "Acme"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_update_recruiter() {
        let app = build_router(AppStateBuilder::new().build());
        let rita = register(app.clone(), "rita@acme.io").await;
        register(app.clone(), "sam@acme.io").await;
        let auth = format!("Bearer {}", rita["token"].as_str().unwrap());
        let id = rita["user"]["id"].as_i64().unwrap();

        let (status, _) = send(
            app.clone(),
            "PATCH",
            "/api/recruiters/update-user",
            Some(&auth),
            Some(json!({"name": "Rita R", "designation": "Head of Talent", "email": "sam@acme.io"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            app.clone(),
            "PATCH",
            "/api/recruiters/update-user",
            Some(&auth),
            Some(json!({"name": "Rita R", "designation": "Head of Talent"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(app, "GET", &format!("/api/recruiters/{}", id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["designation"], "Head of Talent");
        assert_eq!(body["email"], "rita@acme.io");
    }

    #[tokio::test]
    async fn test_unknown_recruiter_lookups() {
        let app = build_router(AppStateBuilder::new().build());
        for uri in ["/api/recruiters/999", "/api/recruiters/999/company", "/api/recruiters/999/companies"] {
            let (status, _) = send(app.clone(), "GET", uri, None, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        }
    }
}
