use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Recruiter account as stored in `recruiters`
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RecruiterModel {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub designation: Option<String>,
    pub role: String,
    pub company_id: Option<i64>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to insert a recruiter row
#[derive(Debug, Clone)]
pub struct NewRecruiter {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub designation: Option<String>,
    pub role: String,
    pub company_id: Option<i64>,
    pub is_verified: bool,
}

impl NewRecruiter {
    pub fn into_model(self, id: i64) -> RecruiterModel {
        RecruiterModel {
            id,
            name: self.name,
            email: self.email,
            password: self.password_hash,
            designation: self.designation,
            role: self.role,
            company_id: self.company_id,
            is_verified: self.is_verified,
            created_at: Utc::now(),
        }
    }
}

/// Changes applied by `PATCH /api/recruiters/update-user`
#[derive(Debug, Clone)]
pub struct RecruiterUpdate {
    pub name: String,
    pub designation: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}
