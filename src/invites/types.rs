use serde::{Deserialize, Serialize};

use super::models::InviteListing;

#[derive(Debug, Deserialize)]
pub struct SendInviteRequest {
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteSentResponse {
    pub message: String,
    pub invite_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// What an invitee sees before accepting
#[derive(Debug, Serialize, Deserialize)]
pub struct InviteDetails {
    pub email: String,
    pub company_name: String,
    pub role: String,
    pub company_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct AcceptRequest {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InviteRegisterRequest {
    pub token: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub designation: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRegisterResponse {
    pub message: String,
    pub auth_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompanyInvitesResponse {
    pub message: String,
    pub invites: Vec<InviteListing>,
    pub count: usize,
}
