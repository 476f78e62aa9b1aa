use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CompanyModel {
    pub id: i64,
    pub created_by: i64,
    pub name: String,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompanyModel {
    pub fn from_draft(id: i64, created_by: i64, draft: CompanyDraft) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_by,
            name: draft.name,
            description: draft.description,
            website: draft.website,
            logo_url: draft.logo_url,
            banner_url: draft.banner_url,
            video_url: draft.video_url,
            location: draft.location,
            pincode: draft.pincode,
            state: draft.state,
            industry: draft.industry,
            size: draft.size,
            established_year: draft.established_year,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the profile; logo and banner survive when the draft omits them
    pub fn apply(&mut self, draft: CompanyDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.website = draft.website;
        self.logo_url = draft.logo_url.or(self.logo_url.take());
        self.banner_url = draft.banner_url.or(self.banner_url.take());
        self.video_url = draft.video_url;
        self.location = draft.location;
        self.pincode = draft.pincode;
        self.state = draft.state;
        self.industry = draft.industry;
        self.size = draft.size;
        self.established_year = draft.established_year;
        self.updated_at = Utc::now();
    }
}

/// Validated company profile submitted by a recruiter
#[derive(Debug, Clone, Default)]
pub struct CompanyDraft {
    pub name: String,
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

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct CompanyRef {
    pub id: i64,
    pub name: String,
}
