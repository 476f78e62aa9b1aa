use axum::http::StatusCode;
use serde_json::json;

use super::setup::TestApp;

// ============================================================================
// Account Actions
// ============================================================================

/// A signed-in account: its id and bearer token
pub struct Account {
    pub id: i64,
    pub token: String,
}

/// A recruiter whose company profile has been saved
pub struct CompanyOwner {
    pub account: Account,
    pub company_id: i64,
}

impl TestApp {
    pub async fn register_candidate(&self, name: &str, email: &str) -> Account {
        let (status, body) = self
            .request(
                "POST",
                "/api/users/register",
                None,
                Some(json!({"name": name, "email": email, "password": "secret1"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "candidate registration: {}", body);
        Account {
            id: body["user"]["id"].as_i64().unwrap(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn register_recruiter(&self, name: &str, email: &str) -> Account {
        let (status, body) = self
            .request(
                "POST",
                "/api/recruiters/register",
                None,
                Some(json!({
                    "name": name,
                    "email": email,
                    "password": "secret1",
                    "designation": "Hiring Manager"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "recruiter registration: {}", body);
        Account {
            id: body["user"]["id"].as_i64().unwrap(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Registers a recruiter and saves a company profile for them
    pub async fn company_owner(&self, email: &str, company: &str) -> CompanyOwner {
        let recruiter = self.register_recruiter("Olivia Owner", email).await;
        let (status, body) = self
            .request(
                "POST",
                "/api/recruiters/company",
                Some(&recruiter.token),
                Some(json!({
                    "name": company,
                    "website": "https://example.com",
                    "size": "11-50"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "company profile: {}", body);
        CompanyOwner {
            account: Account {
                id: recruiter.id,
                token: body["token"].as_str().unwrap().to_string(),
            },
            company_id: body["companyId"].as_i64().unwrap(),
        }
    }
}
