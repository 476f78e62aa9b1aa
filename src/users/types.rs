use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::models::{ProfileFields, UserEducation, UserExperience, UserLanguage, UserProject};
use crate::validation::non_blank;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserSummary,
    pub token: String,
}

/// Scalar part of a profile update; empty strings are stored as NULL
#[derive(Debug, Default, Deserialize)]
pub struct ProfileInput {
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
    pub notification_settings: Option<String>,
}

impl From<ProfileInput> for ProfileFields {
    fn from(input: ProfileInput) -> Self {
        Self {
            name: non_blank(input.name),
            phone: non_blank(input.phone),
            address: non_blank(input.address),
            date_of_birth: input.date_of_birth,
            gender: non_blank(input.gender),
            profile_picture: non_blank(input.profile_picture),
            resume: non_blank(input.resume),
            resume_headline: non_blank(input.resume_headline),
            career_profile: non_blank(input.career_profile),
            certifications: non_blank(input.certifications),
            skills: non_blank(input.skills),
            education: non_blank(input.education),
            experience: non_blank(input.experience),
            job_preferences: non_blank(input.job_preferences),
            notification_settings: non_blank(input.notification_settings)
                .unwrap_or_else(|| "email".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LanguageInput {
    pub language: Option<String>,
    pub proficiency: Option<String>,
}

impl LanguageInput {
    pub fn into_model(self) -> Option<UserLanguage> {
        Some(UserLanguage {
            language: non_blank(self.language)?,
            proficiency: non_blank(self.proficiency)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ProjectInput {
    pub project_title: Option<String>,
    pub associated_with: Option<String>,
    pub client: Option<String>,
    pub project_status: Option<String>,
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

impl ProjectInput {
    pub fn into_model(self) -> Option<UserProject> {
        Some(UserProject {
            project_title: non_blank(self.project_title)?,
            project_status: non_blank(self.project_status)?,
            associated_with: non_blank(self.associated_with),
            client: non_blank(self.client),
            start_year: self.start_year,
            start_month: self.start_month,
            end_year: self.end_year,
            end_month: self.end_month,
            description: non_blank(self.description),
            project_location: non_blank(self.project_location),
            project_site: non_blank(self.project_site),
            employment_nature: non_blank(self.employment_nature),
            team_size: self.team_size,
            role: non_blank(self.role),
            role_description: non_blank(self.role_description),
            skills_used: non_blank(self.skills_used),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct EducationInput {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub field_of_study: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub grade: Option<String>,
}

impl EducationInput {
    pub fn into_model(self) -> Option<UserEducation> {
        Some(UserEducation {
            degree: non_blank(self.degree)?,
            institution: non_blank(self.institution)?,
            field_of_study: non_blank(self.field_of_study),
            start_year: self.start_year,
            end_year: self.end_year,
            grade: non_blank(self.grade),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ExperienceInput {
    pub company_name: Option<String>,
    pub designation: Option<String>,
    pub employment_type: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    #[serde(default)]
    pub is_current: bool,
    pub description: Option<String>,
}

impl ExperienceInput {
    pub fn into_model(self) -> Option<UserExperience> {
        Some(UserExperience {
            company_name: non_blank(self.company_name)?,
            designation: non_blank(self.designation)?,
            employment_type: non_blank(self.employment_type),
            start_year: self.start_year,
            end_year: self.end_year,
            is_current: self.is_current,
            description: non_blank(self.description),
        })
    }
}

/// Body of `PUT /api/users/updateUserProfile/:id`
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub profile: ProfileInput,
    #[serde(default)]
    pub languages: Vec<LanguageInput>,
    #[serde(default)]
    pub projects: Vec<ProjectInput>,
    #[serde(default)]
    pub education: Vec<EducationInput>,
    #[serde(default)]
    pub experience: Vec<ExperienceInput>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_incomplete_children_are_skipped() {
        let request: ProfileUpdateRequest = serde_json::from_value(json!({
            "languages": [
                {"language": "English", "proficiency": "Fluent"},
                {"language": "French"},
                {"language": "", "proficiency": "Basic"}
            ],
            "experience": [
                {"company_name": "Acme", "designation": "Engineer", "is_current": true},
                {"designation": "Intern"}
            ]
        }))
        .unwrap();

        let languages: Vec<_> = request
            .languages
            .into_iter()
            .filter_map(LanguageInput::into_model)
            .collect();
        assert_eq!(languages.len(), 1);
        assert_eq!(languages[0].language, "English");

        let experience: Vec<_> = request
            .experience
            .into_iter()
            .filter_map(ExperienceInput::into_model)
            .collect();
        assert_eq!(experience.len(), 1);
        assert!(experience[0].is_current);
    }

    #[test]
    fn test_notification_settings_default_to_email() {
        let fields = ProfileFields::from(ProfileInput {
            phone: Some("".to_string()),
            ..ProfileInput::default()
        });
        assert_eq!(fields.notification_settings, "email");
        assert_eq!(fields.phone, None);
    }
}
