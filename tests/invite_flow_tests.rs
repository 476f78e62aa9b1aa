use axum::http::StatusCode;
use serde_json::json;

mod utils;

use utils::*;

#[tokio::test]
async fn test_invitee_registers_and_joins_company() {
    let app = TestAppBuilder::new().build();
    let owner = app.company_owner("olivia@acme.test", "Acme").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/invites/send-invite",
            Some(&owner.account.token),
            Some(json!({"email": "nina@acme.test", "role": "recruiter"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["inviteId"].is_i64());

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].company_name, "Acme");
    assert!(sent[0].link.starts_with("https://jobs.test/invites/accept?token="));
    let token = app.mailer.token_for("nina@acme.test").unwrap();

    let (status, body) = app
        .request("GET", &format!("/api/invites/validate?token={}", token), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["company_id"], owner.company_id);
    assert_eq!(body["role"], "recruiter");

    let (status, body) = app
        .request(
            "POST",
            "/api/invites/register",
            None,
            Some(json!({
                "token": token,
                "name": "Nina Newhire",
                "password": "secret1",
                "designation": "Sourcer"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let auth_token = body["authToken"].as_str().unwrap().to_string();

    // The new account carries the company and can post for it
    let (status, _) = app
        .request(
            "POST",
            "/api/jobs/createJob",
            Some(&auth_token),
            Some(json!({
                "company_id": owner.company_id,
                "title": "Data Engineer",
                "description": "Pipelines",
                "responsibilities": "Keep data flowing",
                "qualification_category_id": 1,
                "qualification_subcategory_id": 2
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // A used token is no longer valid anywhere
    let (status, _) = app
        .request("GET", &format!("/api/invites/validate?token={}", token), None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            "GET",
            "/api/invites/RecruiterInvites",
            Some(&owner.account.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["invites"][0]["used"], true);
    assert_eq!(body["invites"][0]["invited_by_name"], "Olivia Owner");
}

#[tokio::test]
async fn test_existing_recruiter_accepts_invite() {
    let app = TestAppBuilder::new().build();
    let owner = app.company_owner("olivia@acme.test", "Acme").await;
    let mover = app.register_recruiter("Max Mover", "max@elsewhere.test").await;

    app.request(
        "POST",
        "/api/invites/send-invite",
        Some(&owner.account.token),
        Some(json!({"email": "max@elsewhere.test", "role": "viewer"})),
    )
    .await;
    let token = app.mailer.token_for("max@elsewhere.test").unwrap();

    let (status, _) = app
        .request(
            "POST",
            "/api/invites/accept",
            Some(&owner.account.token),
            Some(json!({"token": token})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            "POST",
            "/api/invites/accept",
            Some(&mover.token),
            Some(json!({"token": token})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            "GET",
            &format!("/api/recruiters/{}/companies", mover.id),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], owner.company_id);
    assert_eq!(body[0]["name"], "Acme");

    let (status, body) = app
        .request(
            "POST",
            "/api/invites/accept",
            Some(&mover.token),
            Some(json!({"token": token})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid, used, or expired token");
}

#[tokio::test]
async fn test_revoking_invite_removes_joined_recruiter() {
    let app = TestAppBuilder::new().build();
    let owner = app.company_owner("olivia@acme.test", "Acme").await;

    let (_, body) = app
        .request(
            "POST",
            "/api/invites/send-invite",
            Some(&owner.account.token),
            Some(json!({"email": "temp@acme.test", "role": "viewer"})),
        )
        .await;
    let invite_id = body["inviteId"].as_i64().unwrap();
    let token = app.mailer.token_for("temp@acme.test").unwrap();
    let (_, body) = app
        .request(
            "POST",
            "/api/invites/register",
            None,
            Some(json!({"token": token, "name": "Tina Temp", "password": "secret1"})),
        )
        .await;
    let temp_token = body["authToken"].as_str().unwrap().to_string();
    let temp_id = app.state.token_config.validate_token(&temp_token).unwrap().sub;

    let (status, _) = app
        .request(
            "DELETE",
            &format!("/api/invites/deleteInvites/{}", invite_id),
            Some(&owner.account.token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request("GET", &format!("/api/recruiters/{}", temp_id), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .request(
            "GET",
            &format!("/api/recruiters/{}", owner.account.id),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}
