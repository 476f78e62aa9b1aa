use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{
    service::InviteService,
    types::{
        AcceptRequest, CompanyInvitesResponse, InviteDetails, InviteRegisterRequest,
        InviteRegisterResponse, InviteSentResponse, SendInviteRequest, TokenQuery,
    },
};
use crate::auth::AuthClaims;
use crate::shared::{AppError, AppJson, AppState, MessageResponse};

fn service(state: &AppState) -> InviteService {
    InviteService::new(
        Arc::clone(&state.invite_repository),
        Arc::clone(&state.recruiter_repository),
        Arc::clone(&state.company_repository),
        Arc::clone(&state.mailer),
        state.token_config.clone(),
        Arc::clone(&state.config),
    )
}

/// POST /api/invites/send-invite
///
/// The raw token only ever leaves the server inside the invite email.
#[instrument(name = "send_invite", skip(state, claims, request))]
pub async fn send_invite(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    AppJson(request): AppJson<SendInviteRequest>,
) -> Result<(StatusCode, Json<InviteSentResponse>), AppError> {
    let response = service(&state).send_invite(&claims, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/invites/validate?token=
#[instrument(name = "validate_invite", skip(state, query))]
pub async fn validate_invite(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<InviteDetails>, AppError> {
    Ok(Json(service(&state).validate(query.token.as_deref()).await?))
}

/// POST /api/invites/accept
#[instrument(name = "accept_invite", skip(state, claims, request))]
pub async fn accept_invite(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    AppJson(request): AppJson<AcceptRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    service(&state).accept(&claims, request).await?;
    Ok(Json(MessageResponse::new("Invite accepted successfully")))
}

/// POST /api/invites/register
#[instrument(name = "register_with_invite", skip(state, request))]
pub async fn register_with_invite(
    State(state): State<AppState>,
    AppJson(request): AppJson<InviteRegisterRequest>,
) -> Result<(StatusCode, Json<InviteRegisterResponse>), AppError> {
    let response = service(&state).register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/invites/RecruiterInvites
#[instrument(name = "company_invites", skip(state, claims))]
pub async fn company_invites(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
) -> Result<Json<CompanyInvitesResponse>, AppError> {
    Ok(Json(service(&state).company_invites(&claims).await?))
}

/// DELETE /api/invites/deleteInvites/:invite_id
#[instrument(name = "delete_invite", skip(state, claims))]
pub async fn delete_invite(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(invite_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    service(&state).delete_invite(&claims, invite_id).await?;
    Ok(Json(MessageResponse::new(
        "Invite and associated recruiter deleted successfully",
    )))
}

#[cfg(test)]
mod tests {
    use crate::build_router;
    use crate::companies::models::{CompanyDraft, CompanyModel};
    use crate::memory::MemoryStore;
    use crate::recruiters::models::NewRecruiter;
    use crate::shared::test_utils::{bearer, send, AppStateBuilder, RecordingMailer};
    use crate::shared::AppState;
    use axum::{http::StatusCode, Router};
    use serde_json::json;
    use std::sync::Arc;

    struct Fixture {
        app: Router,
        state: AppState,
        store: Arc<MemoryStore>,
        mailer: Arc<RecordingMailer>,
        company_id: i64,
        owner_id: i64,
        owner: String,
    }

    fn fixture_with(mailer: RecordingMailer) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let (owner_id, company_id) = {
            let mut tables = store.tables().unwrap();
            let owner_id = tables.next_id();
            let company_id = tables.next_id();
            let owner = NewRecruiter {
                name: "Olivia Owner".to_string(),
                email: "olivia@acme.test".to_string(),
                password_hash: "unused".to_string(),
                designation: Some("Founder".to_string()),
                role: "owner".to_string(),
                company_id: Some(company_id),
                is_verified: true,
            };
            tables.recruiters.insert(owner_id, owner.into_model(owner_id));
            let draft = CompanyDraft {
                name: "Acme".to_string(),
                ..CompanyDraft::default()
            };
            tables
                .companies
                .insert(company_id, CompanyModel::from_draft(company_id, owner_id, draft));
            (owner_id, company_id)
        };
        let mailer = Arc::new(mailer);
        let state = AppStateBuilder::new()
            .with_store(store.clone())
            .with_mailer(mailer.clone())
            .build();
        let owner = bearer(&state, owner_id, "olivia@acme.test", "owner", Some(company_id));
        Fixture {
            app: build_router(state.clone()),
            state,
            store,
            mailer,
            company_id,
            owner_id,
            owner,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingMailer::default())
    }

    async fn invite(f: &Fixture, email: &str, role: &str) -> String {
        let (status, body) = send(
            f.app.clone(),
            "POST",
            "/api/invites/send-invite",
            Some(&f.owner),
            Some(json!({"email": email, "role": role})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body.get("token").is_none());
        f.mailer.last_token().unwrap()
    }

    #[tokio::test]
    async fn test_send_invite_validation() {
        let f = fixture();
        let cases = [
            (json!({"email": "not-an-email", "role": "viewer"}), StatusCode::BAD_REQUEST),
            (json!({"email": "a@b.co", "role": "owner"}), StatusCode::BAD_REQUEST),
            (json!({"email": "a@b.co"}), StatusCode::BAD_REQUEST),
        ];
        for (body, expected) in cases {
            let (status, _) = send(
                f.app.clone(),
                "POST",
                "/api/invites/send-invite",
                Some(&f.owner),
                Some(body),
            )
            .await;
            assert_eq!(status, expected);
        }

        let viewer = bearer(&f.state, 99, "v@acme.test", "viewer", Some(f.company_id));
        let (status, _) = send(
            f.app.clone(),
            "POST",
            "/api/invites/send-invite",
            Some(&viewer),
            Some(json!({"email": "a@b.co", "role": "viewer"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let homeless = bearer(&f.state, 98, "h@acme.test", "recruiter", None);
        let (status, _) = send(
            f.app,
            "POST",
            "/api/invites/send-invite",
            Some(&homeless),
            Some(json!({"email": "a@b.co", "role": "viewer"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(f.mailer.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_mail_removes_invite() {
        let f = fixture_with(RecordingMailer::failing());
        let (status, body) = send(
            f.app,
            "POST",
            "/api/invites/send-invite",
            Some(&f.owner),
            Some(json!({"email": "new@acme.test", "role": "viewer"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to send invite email");
        assert!(f.store.tables().unwrap().invites.is_empty());
    }

    #[tokio::test]
    async fn test_validate_and_register() {
        let f = fixture();
        let token = invite(&f, "newbie@acme.test", "recruiter").await;

        let (status, body) = send(
            f.app.clone(),
            "GET",
            &format!("/api/invites/validate?token={}", token),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "newbie@acme.test");
        assert_eq!(body["company_name"], "Acme");
        assert_eq!(body["company_id"], f.company_id);

        let (status, body) = send(
            f.app.clone(),
            "GET",
            "/api/invites/validate?token=deadbeef",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid, used, or expired token");

        let (status, body) = send(
            f.app.clone(),
            "POST",
            "/api/invites/register",
            None,
            Some(json!({"token": token, "name": "Nina Newbie", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let claims = f
            .state
            .token_config
            .validate_token(body["authToken"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.role, "recruiter");
        assert_eq!(claims.company_id, Some(f.company_id));
        {
            let tables = f.store.tables().unwrap();
            let recruiter = &tables.recruiters[&claims.sub];
            assert!(recruiter.is_verified);
            assert_eq!(recruiter.email, "newbie@acme.test");
        }

        let (status, _) = send(
            f.app,
            "POST",
            "/api/invites/register",
            None,
            Some(json!({"token": token, "name": "Nina Again", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_through_legacy_path() {
        let f = fixture();
        let token = invite(&f, "legacy@acme.test", "viewer").await;

        let (status, body) = send(
            f.app,
            "POST",
            "/api/invites/intiveRegister",
            None,
            Some(json!({"token": token, "name": "Lee Legacy", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Registration successful");
        assert!(body["authToken"].is_string());
    }

    #[tokio::test]
    async fn test_accept_checks_email_and_moves_recruiter() {
        let f = fixture();
        let token = invite(&f, "Moving@Elsewhere.test", "admin").await;
        let mover_id = {
            let mut tables = f.store.tables().unwrap();
            let id = tables.next_id();
            let mover = NewRecruiter {
                name: "Max Mover".to_string(),
                email: "moving@elsewhere.test".to_string(),
                password_hash: "unused".to_string(),
                designation: None,
                role: "recruiter".to_string(),
                company_id: None,
                is_verified: false,
            };
            tables.recruiters.insert(id, mover.into_model(id));
            id
        };

        let stranger = bearer(&f.state, 4242, "stranger@x.test", "recruiter", None);
        let (status, _) = send(
            f.app.clone(),
            "POST",
            "/api/invites/accept",
            Some(&stranger),
            Some(json!({"token": token})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let mover = bearer(&f.state, mover_id, "moving@elsewhere.test", "recruiter", None);
        let (status, body) = send(
            f.app.clone(),
            "POST",
            "/api/invites/accept",
            Some(&mover),
            Some(json!({"token": token})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Invite accepted successfully");
        {
            let tables = f.store.tables().unwrap();
            assert_eq!(tables.recruiters[&mover_id].company_id, Some(f.company_id));
            assert_eq!(tables.recruiters[&mover_id].role, "admin");
        }

        let (status, _) = send(
            f.app,
            "POST",
            "/api/invites/accept",
            Some(&mover),
            Some(json!({"token": token})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_and_delete_invites() {
        let f = fixture();
        invite(&f, "first@acme.test", "viewer").await;
        let token = invite(&f, "second@acme.test", "recruiter").await;
        let (status, _) = send(
            f.app.clone(),
            "POST",
            "/api/invites/register",
            None,
            Some(json!({"token": token, "name": "Sam Second", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            f.app.clone(),
            "GET",
            "/api/invites/RecruiterInvites",
            Some(&f.owner),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["invites"][0]["email"], "second@acme.test");
        assert_eq!(body["invites"][0]["used"], true);
        assert_eq!(body["invites"][0]["invited_by_name"], "Olivia Owner");
        let invite_id = body["invites"][0]["id"].as_i64().unwrap();

        let no_company = bearer(&f.state, f.owner_id, "olivia@acme.test", "owner", None);
        let (status, _) = send(
            f.app.clone(),
            "GET",
            "/api/invites/RecruiterInvites",
            Some(&no_company),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let uri = format!("/api/invites/deleteInvites/{}", invite_id);
        let (status, _) = send(f.app.clone(), "DELETE", &uri, Some(&f.owner), None).await;
        assert_eq!(status, StatusCode::OK);
        {
            let tables = f.store.tables().unwrap();
            assert_eq!(tables.invites.len(), 1);
            assert!(!tables.recruiters.values().any(|r| r.email == "second@acme.test"));
            assert!(tables.recruiters.contains_key(&f.owner_id));
        }

        let (status, _) = send(f.app, "DELETE", &uri, Some(&f.owner), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
