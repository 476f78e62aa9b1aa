use serde::{Deserialize, Serialize};

use crate::companies::models::CompanyModel;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub designation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub designation: Option<String>,
}

/// Company profile form; logo and banner arrive as already-uploaded URLs
#[derive(Debug, Default, Deserialize)]
pub struct CompanyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub video_url: Option<String>,
    pub location: Option<String>,
    pub pincode: Option<String>,
    pub state: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub established_year: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisteredRecruiter {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub designation: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: RegisteredRecruiter,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoggedInRecruiter {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub company_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoggedInRecruiter,
    pub company: Option<CompanyModel>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySavedResponse {
    pub message: String,
    pub company_id: i64,
    pub company: CompanyModel,
    pub token: String,
}

/// Public view of a recruiter
#[derive(Debug, Serialize, Deserialize)]
pub struct RecruiterProfile {
    pub name: String,
    pub email: String,
    pub designation: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecruiterSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub designation: Option<String>,
    pub company_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecruiterCompanyResponse {
    pub recruiter: RecruiterSummary,
    pub company: Option<CompanyModel>,
}
