use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use strum_macros::EnumString;

pub const DEFAULT_LOGO: &str = "/uploads/logos/default-logo.png";
pub const DEFAULT_JOBS_PER_PAGE: i64 = 50;
pub const MAX_JOBS_PER_PAGE: i64 = 200;
/// Highest page whose offset still fits in an i64
pub const MAX_PAGE: i64 = i64::MAX / MAX_JOBS_PER_PAGE;

/// Body of `POST /api/jobs/createJob`
#[derive(Debug, Default, Deserialize)]
pub struct CreateJobRequest {
    #[serde(default, deserialize_with = "lenient_id")]
    pub company_id: Option<i64>,
    pub title: Option<String>,
    pub role: Option<String>,
    pub function_area: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub experience_min: Option<i32>,
    pub experience_max: Option<i32>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub hide_salary: bool,
    pub vacancies: Option<i32>,
    pub education: Option<String>,
    pub industry: Option<String>,
    pub industry_id: Option<i64>,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub responsibilities: Option<String>,
    pub qualifications: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Value>,
    pub labels: Option<Value>,
    pub questions: Option<Value>,
    pub walkin_details: Option<Value>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub qualification_category_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub qualification_subcategory_id: Option<i64>,
    pub deadline: Option<NaiveDate>,
    pub company_name: Option<String>,
}

/// Form posts send flags as `true`, `1` or `"1"`
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(flag) => Ok(flag),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|n| n != 0.0)),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "" | "0" | "false" => Ok(false),
            "1" | "true" => Ok(true),
            other => Err(de::Error::custom(format!("invalid boolean `{}`", other))),
        },
        other => Err(de::Error::custom(format!("invalid boolean `{}`", other))),
    }
}

/// Ids arrive as numbers or numeric strings; blank means absent
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid id `{}`", n))),
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid id `{}`", text))),
        other => Err(de::Error::custom(format!("invalid id `{}`", other))),
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCreatedResponse {
    pub message: String,
    pub job_id: i64,
}

/// Card shown on the job listing
#[derive(Debug, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: i64,
    pub title: String,
    pub company: Option<String>,
    pub logo: String,
    pub location: Option<String>,
    pub salary: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub summary: JobSummary,
    pub responsibilities: String,
    pub qualifications: String,
    pub education: Option<String>,
    pub qualification_category_id: Option<i64>,
    pub qualification_subcategory_id: Option<i64>,
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct JobIdQuery {
    pub id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum SortKey {
    #[default]
    CreatedAt,
    Title,
    SalaryMin,
    SalaryMax,
    ExperienceMin,
    ExperienceMax,
}

impl SortKey {
    pub fn column(self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::Title => "title",
            SortKey::SalaryMin => "salary_min",
            SortKey::SalaryMax => "salary_max",
            SortKey::ExperienceMin => "experience_min",
            SortKey::ExperienceMax => "experience_max",
        }
    }
}

/// Body of `POST /api/jobs/all`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    pub page: Option<i64>,
    pub jobs_per_page: Option<i64>,
    pub company_id: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Normalised paging and ordering for the filtered listing
#[derive(Debug, Clone, PartialEq)]
pub struct JobFilter {
    pub company_id: Option<i64>,
    pub sort: SortKey,
    pub ascending: bool,
    pub page: i64,
    pub per_page: i64,
}

impl JobFilter {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl From<FilterRequest> for JobFilter {
    fn from(request: FilterRequest) -> Self {
        let per_page = match request.jobs_per_page {
            Some(n) if n > 0 => n.min(MAX_JOBS_PER_PAGE),
            _ => DEFAULT_JOBS_PER_PAGE,
        };
        Self {
            company_id: request.company_id,
            sort: request
                .sort_by
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            ascending: request
                .sort_order
                .as_deref()
                .is_some_and(|o| o.eq_ignore_ascii_case("asc")),
            page: request.page.unwrap_or(1).clamp(1, MAX_PAGE),
            per_page,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResponse<T> {
    pub jobs: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub jobs_per_page: i64,
}

#[derive(Debug, Deserialize)]
pub struct FormFieldInput {
    pub field_label: Option<String>,
    pub field_type: Option<String>,
    pub is_required: Option<bool>,
    pub field_options: Option<Value>,
    pub is_multi: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DynamicFormRequest {
    pub job_id: Option<i64>,
    pub form_fields: Option<Vec<FormFieldInput>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFormCreated {
    pub message: String,
    pub inserted_fields: usize,
    #[serde(rename = "field_ids")]
    pub field_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FormQuery {
    pub job_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FormFieldView {
    pub field_id: i64,
    pub field_label: String,
    pub field_type: String,
    pub is_required: bool,
    pub field_options: Vec<Value>,
    pub is_multi: bool,
    pub order_no: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobFormResponse {
    pub job_id: i64,
    pub job_title: String,
    pub total_fields: usize,
    pub form_fields: Vec<FormFieldView>,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationRequest {
    pub job_id: Option<i64>,
    pub candidate_id: Option<i64>,
    pub responses: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicationCreated {
    pub message: String,
    pub application_id: i64,
    pub total_responses: usize,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationQuery {
    pub application_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicationResponses {
    pub application_id: i64,
    pub responses: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicationView {
    pub application_id: i64,
    pub candidate_id: Option<i64>,
    pub applied_at: DateTime<Utc>,
    pub responses: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicationsByJob {
    pub job_id: i64,
    pub total_applications: usize,
    pub applications: Vec<ApplicationView>,
}
