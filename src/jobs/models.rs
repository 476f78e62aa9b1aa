use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{types::Json, FromRow};

/// A posting as stored in `jobs`
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct JobModel {
    pub id: i64,
    pub company_id: i64,
    pub title: String,
    pub role: Option<String>,
    pub function_area: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub experience_min: Option<i32>,
    pub experience_max: Option<i32>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub hide_salary: bool,
    pub vacancies: i32,
    pub education: Option<String>,
    pub industry: Option<String>,
    pub industry_id: Option<i64>,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub responsibilities: Option<String>,
    pub qualifications: Option<String>,
    pub description: String,
    pub skills: Option<Json<Value>>,
    pub labels: Option<Json<Value>>,
    pub questions: Option<Json<Value>>,
    pub walkin_details: Option<Json<Value>>,
    pub receive_matching_email: bool,
    pub share_with_subusers: bool,
    pub qualification_category_id: Option<i64>,
    pub qualification_subcategory_id: Option<i64>,
    pub status: String,
    pub deadline: Option<NaiveDate>,
    pub company_name: Option<String>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobModel {
    /// Formatted salary band, hidden when the poster asked or a bound is missing
    pub fn salary_label(&self) -> Option<String> {
        if self.hide_salary {
            return None;
        }
        match (self.salary_min, self.salary_max) {
            (Some(min), Some(max)) => Some(format!(
                "${}-${}",
                group_thousands(min),
                group_thousands(max)
            )),
            _ => None,
        }
    }

    /// Descriptions saved by the rich-text editor are `{"html": "..."}` documents
    pub fn description_html(&self) -> String {
        match serde_json::from_str::<Value>(&self.description) {
            Ok(Value::Object(map)) => map
                .get("html")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            Ok(Value::String(text)) => text,
            _ => self.description.clone(),
        }
    }

    #[cfg(test)]
    pub fn sample(id: i64, company_id: i64, title: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            company_id,
            title: title.to_string(),
            role: None,
            function_area: None,
            location: Some("Bengaluru".to_string()),
            employment_type: Some("Full Time".to_string()),
            experience_min: Some(1),
            experience_max: Some(3),
            salary_min: Some(50_000),
            salary_max: Some(80_000),
            hide_salary: false,
            vacancies: 1,
            education: None,
            industry: None,
            industry_id: None,
            category_id: None,
            subcategory_id: None,
            responsibilities: Some("Build services".to_string()),
            qualifications: None,
            description: "Join us".to_string(),
            skills: Some(Json(Value::Array(vec![]))),
            labels: Some(Json(Value::Array(vec![]))),
            questions: Some(Json(Value::Array(vec![]))),
            walkin_details: None,
            receive_matching_email: false,
            share_with_subusers: false,
            qualification_category_id: Some(1),
            qualification_subcategory_id: Some(2),
            status: "open".to_string(),
            deadline: None,
            company_name: None,
            created_by: 1,
            created_at: now,
            updated_at: now,
        }
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}

/// Validated input of `POST /api/jobs/createJob`
#[derive(Debug, Clone)]
pub struct NewJob {
    pub company_id: i64,
    pub title: String,
    pub role: Option<String>,
    pub function_area: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub experience_min: Option<i32>,
    pub experience_max: Option<i32>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub hide_salary: bool,
    pub vacancies: i32,
    pub education: Option<String>,
    pub industry: Option<String>,
    pub industry_id: Option<i64>,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub responsibilities: String,
    pub qualifications: Option<String>,
    pub description: String,
    pub skills: Value,
    pub labels: Value,
    pub questions: Value,
    pub walkin_details: Value,
    pub qualification_category_id: i64,
    pub qualification_subcategory_id: i64,
    pub deadline: Option<NaiveDate>,
    pub company_name: Option<String>,
    pub created_by: i64,
}

impl NewJob {
    pub fn into_model(self, id: i64) -> JobModel {
        let now = Utc::now();
        JobModel {
            id,
            company_id: self.company_id,
            title: self.title,
            role: self.role,
            function_area: self.function_area,
            location: self.location,
            employment_type: self.employment_type,
            experience_min: self.experience_min,
            experience_max: self.experience_max,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            hide_salary: self.hide_salary,
            vacancies: self.vacancies,
            education: self.education,
            industry: self.industry,
            industry_id: self.industry_id,
            category_id: self.category_id,
            subcategory_id: self.subcategory_id,
            responsibilities: Some(self.responsibilities),
            qualifications: self.qualifications,
            description: self.description,
            skills: Some(Json(self.skills)),
            labels: Some(Json(self.labels)),
            questions: Some(Json(self.questions)),
            walkin_details: (!self.walkin_details.is_null()).then(|| Json(self.walkin_details)),
            receive_matching_email: false,
            share_with_subusers: false,
            qualification_category_id: Some(self.qualification_category_id),
            qualification_subcategory_id: Some(self.qualification_subcategory_id),
            status: "open".to_string(),
            deadline: self.deadline,
            company_name: self.company_name,
            created_by: self.created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One column assignment of a partial job update
#[derive(Debug, Clone, PartialEq)]
pub enum PatchValue {
    Text(Option<String>),
    Int(Option<i64>),
    Bool(bool),
    Date(Option<NaiveDate>),
    Json(Value),
}

/// Column/value pairs of a partial job update, in request order
pub type JobPatch = Vec<(&'static str, PatchValue)>;

/// Row for the job listing and detail endpoints, joined with company and industry
#[derive(Debug, Clone, FromRow)]
pub struct JobWithCompany {
    #[sqlx(flatten)]
    pub job: JobModel,
    pub company: Option<String>,
    pub logo: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FormFieldModel {
    pub id: i64,
    pub job_id: i64,
    pub field_label: String,
    pub field_type: String,
    pub is_required: bool,
    pub field_options: Option<Json<Value>>,
    pub is_multi: bool,
    pub order_no: i32,
}

#[derive(Debug, Clone)]
pub struct NewFormField {
    pub field_label: String,
    pub field_type: String,
    pub is_required: bool,
    pub field_options: Value,
    pub is_multi: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ApplicationModel {
    pub id: i64,
    pub job_id: i64,
    pub candidate_id: Option<i64>,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ApplicationResponseModel {
    pub id: i64,
    pub application_id: i64,
    pub job_id: i64,
    pub field_id: i64,
    pub field_value: Option<String>,
}

/// A normalised response ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewResponse {
    pub field_id: i64,
    pub field_value: Option<String>,
}

/// A stored response joined with the label and type of its form field
#[derive(Debug, Clone, FromRow)]
pub struct LabelledResponse {
    pub application_id: i64,
    pub field_label: String,
    pub field_type: String,
    pub field_value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "0")]
    #[case(999, "999")]
    #[case(1_000, "1,000")]
    #[case(50_000, "50,000")]
    #[case(1_234_567, "1,234,567")]
    fn test_group_thousands(#[case] input: i64, #[case] expected: &str) {
        assert_eq!(group_thousands(input), expected);
    }

    #[test]
    fn test_salary_label() {
        let mut job = JobModel::sample(1, 1, "Engineer");
        assert_eq!(job.salary_label().as_deref(), Some("$50,000-$80,000"));

        job.hide_salary = true;
        assert_eq!(job.salary_label(), None);

        job.hide_salary = false;
        job.salary_max = None;
        assert_eq!(job.salary_label(), None);
    }

    #[rstest]
    #[case(r#"{"html": "<p>Hi</p>"}"#, "<p>Hi</p>")]
    #[case(r#"{"text": "no html"}"#, "")]
    #[case(r#""quoted""#, "quoted")]
    #[case("plain text", "plain text")]
    fn test_description_html(#[case] stored: &str, #[case] expected: &str) {
        let mut job = JobModel::sample(1, 1, "Engineer");
        job.description = stored.to_string();
        assert_eq!(job.description_html(), expected);
    }
}
