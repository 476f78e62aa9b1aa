//! Partial job updates.
//!
//! `PUT /api/jobs/updatejob/:id` accepts any subset of the updatable columns.
//! The body is checked against a fixed column list so that only known column
//! names ever reach the SQL builder.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use sqlx::types::Json;

use super::models::{JobModel, JobPatch, PatchValue};
use crate::shared::AppError;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Text,
    /// NOT NULL text column
    RequiredText,
    /// Text column that also accepts a JSON document, stored serialised
    Document,
    Int,
    /// INT column; must fit in 32 bits
    SmallInt,
    RequiredSmallInt,
    Bool,
    Date,
    Json,
}

const UPDATABLE: &[(&str, Kind)] = &[
    ("title", Kind::RequiredText),
    ("role", Kind::Text),
    ("function_area", Kind::Text),
    ("location", Kind::Text),
    ("employment_type", Kind::Text),
    ("experience_min", Kind::SmallInt),
    ("experience_max", Kind::SmallInt),
    ("salary_min", Kind::Int),
    ("salary_max", Kind::Int),
    ("hide_salary", Kind::Bool),
    ("vacancies", Kind::RequiredSmallInt),
    ("education", Kind::Text),
    ("responsibilities", Kind::Text),
    ("description", Kind::Document),
    ("skills", Kind::Json),
    ("labels", Kind::Json),
    ("questions", Kind::Json),
    ("walkin_details", Kind::Json),
    ("receive_matching_email", Kind::Bool),
    ("share_with_subusers", Kind::Bool),
    ("industry_id", Kind::Int),
    ("category_id", Kind::Int),
    ("subcategory_id", Kind::Int),
    ("qualification_category_id", Kind::Int),
    ("qualification_subcategory_id", Kind::Int),
    ("status", Kind::RequiredText),
    ("deadline", Kind::Date),
    ("company_name", Kind::Text),
];

fn invalid(column: &str) -> AppError {
    AppError::BadRequest(format!("Invalid value for {}", column))
}

fn as_int(column: &str, value: &Value) -> Result<Option<i64>, AppError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_i64().map(Some).ok_or_else(|| invalid(column)),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s.trim().parse().map(Some).map_err(|_| invalid(column)),
        _ => Err(invalid(column)),
    }
}

fn parse_value(column: &'static str, kind: Kind, value: &Value) -> Result<PatchValue, AppError> {
    let parsed = match kind {
        Kind::Text => match value {
            Value::Null => PatchValue::Text(None),
            Value::String(s) => PatchValue::Text(Some(s.clone())),
            Value::Number(n) => PatchValue::Text(Some(n.to_string())),
            _ => return Err(invalid(column)),
        },
        Kind::RequiredText => match value {
            Value::String(s) if !s.trim().is_empty() => PatchValue::Text(Some(s.clone())),
            _ => return Err(invalid(column)),
        },
        Kind::Document => match value {
            Value::String(s) => PatchValue::Text(Some(s.clone())),
            Value::Object(_) | Value::Array(_) => PatchValue::Text(Some(value.to_string())),
            _ => return Err(invalid(column)),
        },
        Kind::Int => PatchValue::Int(as_int(column, value)?),
        Kind::SmallInt | Kind::RequiredSmallInt => {
            let parsed = as_int(column, value)?;
            if parsed.is_some_and(|v| i32::try_from(v).is_err()) {
                return Err(invalid(column));
            }
            if kind == Kind::RequiredSmallInt && parsed.is_none() {
                return Err(invalid(column));
            }
            PatchValue::Int(parsed)
        }
        Kind::Bool => match value {
            Value::Bool(b) => PatchValue::Bool(*b),
            Value::Number(n) if n.as_i64() == Some(0) => PatchValue::Bool(false),
            Value::Number(n) if n.as_i64() == Some(1) => PatchValue::Bool(true),
            _ => return Err(invalid(column)),
        },
        Kind::Date => match value {
            Value::Null => PatchValue::Date(None),
            Value::String(s) if s.is_empty() => PatchValue::Date(None),
            Value::String(s) => {
                // Accept full ISO timestamps from date pickers as well as plain dates
                let day = s.get(..10).unwrap_or(s);
                PatchValue::Date(Some(
                    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| invalid(column))?,
                ))
            }
            _ => return Err(invalid(column)),
        },
        Kind::Json => PatchValue::Json(value.clone()),
    };
    Ok(parsed)
}

/// Builds a patch from a request body, ignoring unknown keys.
/// Fails with 400 when nothing updatable was sent or a value has the wrong type.
pub fn parse_patch(body: &Map<String, Value>) -> Result<JobPatch, AppError> {
    let mut patch = JobPatch::new();
    for (column, kind) in UPDATABLE {
        if let Some(value) = body.get(*column) {
            patch.push((*column, parse_value(*column, *kind, value)?));
        }
    }
    if patch.is_empty() {
        return Err(AppError::BadRequest(
            "No updatable fields provided".to_string(),
        ));
    }
    Ok(patch)
}

fn small(value: &Option<i64>) -> Option<i32> {
    value.and_then(|v| i32::try_from(v).ok())
}

/// Applies a parsed patch to an in-memory row
pub fn apply_patch(job: &mut JobModel, patch: &JobPatch) {
    for (column, value) in patch {
        match (*column, value) {
            ("title", PatchValue::Text(Some(v))) => job.title = v.clone(),
            ("role", PatchValue::Text(v)) => job.role = v.clone(),
            ("function_area", PatchValue::Text(v)) => job.function_area = v.clone(),
            ("location", PatchValue::Text(v)) => job.location = v.clone(),
            ("employment_type", PatchValue::Text(v)) => job.employment_type = v.clone(),
            ("experience_min", PatchValue::Int(v)) => job.experience_min = small(v),
            ("experience_max", PatchValue::Int(v)) => job.experience_max = small(v),
            ("salary_min", PatchValue::Int(v)) => job.salary_min = *v,
            ("salary_max", PatchValue::Int(v)) => job.salary_max = *v,
            ("hide_salary", PatchValue::Bool(v)) => job.hide_salary = *v,
            ("vacancies", PatchValue::Int(v)) => job.vacancies = small(v).unwrap_or(1),
            ("education", PatchValue::Text(v)) => job.education = v.clone(),
            ("responsibilities", PatchValue::Text(v)) => job.responsibilities = v.clone(),
            ("description", PatchValue::Text(Some(v))) => job.description = v.clone(),
            ("skills", PatchValue::Json(v)) => job.skills = Some(Json(v.clone())),
            ("labels", PatchValue::Json(v)) => job.labels = Some(Json(v.clone())),
            ("questions", PatchValue::Json(v)) => job.questions = Some(Json(v.clone())),
            ("walkin_details", PatchValue::Json(v)) => {
                job.walkin_details = (!v.is_null()).then(|| Json(v.clone()))
            }
            ("receive_matching_email", PatchValue::Bool(v)) => job.receive_matching_email = *v,
            ("share_with_subusers", PatchValue::Bool(v)) => job.share_with_subusers = *v,
            ("industry_id", PatchValue::Int(v)) => job.industry_id = *v,
            ("category_id", PatchValue::Int(v)) => job.category_id = *v,
            ("subcategory_id", PatchValue::Int(v)) => job.subcategory_id = *v,
            ("qualification_category_id", PatchValue::Int(v)) => {
                job.qualification_category_id = *v
            }
            ("qualification_subcategory_id", PatchValue::Int(v)) => {
                job.qualification_subcategory_id = *v
            }
            ("status", PatchValue::Text(Some(v))) => job.status = v.clone(),
            ("deadline", PatchValue::Date(v)) => job.deadline = *v,
            ("company_name", PatchValue::Text(v)) => job.company_name = v.clone(),
            _ => {}
        }
    }
}
