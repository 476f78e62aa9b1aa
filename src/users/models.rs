use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Candidate account as stored in `users`
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserModel {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub profile_picture: Option<String>,
    pub resume: Option<String>,
    pub resume_headline: Option<String>,
    pub career_profile: Option<String>,
    pub certifications: Option<String>,
    pub skills: Option<String>,
    pub education: Option<String>,
    pub experience: Option<String>,
    pub job_preferences: Option<String>,
    pub notification_settings: String,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserModel {
    pub fn new(id: i64, name: &str, email: &str, password_hash: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password: password_hash.to_string(),
            phone: None,
            address: None,
            date_of_birth: None,
            gender: None,
            profile_picture: None,
            resume: None,
            resume_headline: None,
            career_profile: None,
            certifications: None,
            skills: None,
            education: None,
            experience: None,
            job_preferences: None,
            notification_settings: "email".to_string(),
            last_login: None,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, fields: &ProfileFields) {
        self.name = fields.name.clone().unwrap_or_else(|| self.name.clone());
        self.phone = fields.phone.clone();
        self.address = fields.address.clone();
        self.date_of_birth = fields.date_of_birth;
        self.gender = fields.gender.clone();
        self.profile_picture = fields.profile_picture.clone();
        self.resume = fields.resume.clone();
        self.resume_headline = fields.resume_headline.clone();
        self.career_profile = fields.career_profile.clone();
        self.certifications = fields.certifications.clone();
        self.skills = fields.skills.clone();
        self.education = fields.education.clone();
        self.experience = fields.experience.clone();
        self.job_preferences = fields.job_preferences.clone();
        self.notification_settings = fields.notification_settings.clone();
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct UserLanguage {
    pub language: String,
    pub proficiency: String,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct UserProject {
    pub project_title: String,
    pub associated_with: Option<String>,
    pub client: Option<String>,
    pub project_status: String,
    pub start_year: Option<i32>,
    pub start_month: Option<i32>,
    pub end_year: Option<i32>,
    pub end_month: Option<i32>,
    pub description: Option<String>,
    pub project_location: Option<String>,
    pub project_site: Option<String>,
    pub employment_nature: Option<String>,
    pub team_size: Option<i32>,
    pub role: Option<String>,
    pub role_description: Option<String>,
    pub skills_used: Option<String>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct UserEducation {
    pub degree: String,
    pub institution: String,
    pub field_of_study: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct UserExperience {
    pub company_name: String,
    pub designation: String,
    pub employment_type: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub is_current: bool,
    pub description: Option<String>,
}

/// Scalar profile columns written by a profile update.
/// `name` is only changed when present; every other column is overwritten.
#[derive(Debug, Clone, Default)]
pub struct ProfileFields {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub profile_picture: Option<String>,
    pub resume: Option<String>,
    pub resume_headline: Option<String>,
    pub career_profile: Option<String>,
    pub certifications: Option<String>,
    pub skills: Option<String>,
    pub education: Option<String>,
    pub experience: Option<String>,
    pub job_preferences: Option<String>,
    pub notification_settings: String,
}

/// A validated profile replacement: scalar columns plus every child collection
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub fields: ProfileFields,
    pub languages: Vec<UserLanguage>,
    pub projects: Vec<UserProject>,
    pub education: Vec<UserEducation>,
    pub experience: Vec<UserExperience>,
}

/// Full candidate profile as returned by `GET /api/users/profile/:id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: UserModel,
    pub languages: Vec<UserLanguage>,
    pub projects: Vec<UserProject>,
    pub education: Vec<UserEducation>,
    pub experience: Vec<UserExperience>,
}
