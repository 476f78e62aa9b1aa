use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    applications::{parse_responses, responses_by_label, to_new_response},
    models::{JobModel, JobWithCompany, NewFormField, NewJob},
    patch::parse_patch,
    repository::JobRepository,
    types::{
        ApplicationCreated, ApplicationRequest, ApplicationResponses, ApplicationView,
        ApplicationsByJob, CreateJobRequest, DynamicFormCreated, DynamicFormRequest, FilterRequest,
        FilterResponse, FormFieldView, JobCreatedResponse, JobDetail, JobFilter, JobFormResponse,
        JobSummary, DEFAULT_LOGO,
    },
};
use crate::auth::{AuthClaims, Role};
use crate::companies::repository::CompanyRepository;
use crate::shared::AppError;
use crate::validation::non_blank;

/// Whether the caller may edit a job, its form and read its applications.
/// Admins manage everything; otherwise the caller must belong to the job's
/// company or have created it. Candidate tokens never qualify.
pub fn can_manage(claims: &AuthClaims, job: &JobModel) -> bool {
    match claims.role() {
        Some(Role::Candidate) => false,
        Some(Role::Admin) => true,
        _ => claims.company_id == Some(job.company_id) || claims.sub == job.created_by,
    }
}

fn required<T>(value: Option<T>, message: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::BadRequest(message.to_string()))
}

fn json_or_empty_array(value: Option<Value>) -> Value {
    match value {
        None | Some(Value::Null) => Value::Array(Vec::new()),
        Some(value) => value,
    }
}

fn summary(row: &JobWithCompany) -> JobSummary {
    JobSummary {
        id: row.job.id,
        title: row.job.title.clone(),
        company: row.company.clone(),
        logo: row
            .logo
            .clone()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LOGO.to_string()),
        location: row.job.location.clone(),
        salary: row.job.salary_label(),
        job_type: row.job.employment_type.clone(),
        description: row.job.description_html(),
    }
}

/// Service for postings, their application forms and applications
pub struct JobService {
    repository: Arc<dyn JobRepository + Send + Sync>,
    companies: Arc<dyn CompanyRepository + Send + Sync>,
}

impl JobService {
    pub fn new(
        repository: Arc<dyn JobRepository + Send + Sync>,
        companies: Arc<dyn CompanyRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            companies,
        }
    }

    /// Loads a job and checks the caller may manage it: 404 before 403
    async fn managed_job(&self, claims: &AuthClaims, id: i64) -> Result<JobModel, AppError> {
        let job = self
            .repository
            .get_job(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
        if !can_manage(claims, &job) {
            warn!(job_id = id, caller = claims.sub, "Caller may not manage job");
            return Err(AppError::Forbidden("Forbidden".to_string()));
        }
        Ok(job)
    }

    #[instrument(skip(self, claims, request))]
    pub async fn create_job(
        &self,
        claims: &AuthClaims,
        request: CreateJobRequest,
    ) -> Result<JobCreatedResponse, AppError> {
        if claims.is_candidate() {
            return Err(AppError::Forbidden(
                "Recruiter account required".to_string(),
            ));
        }

        let company_id = required(request.company_id, "company_id required")?;
        let title = required(non_blank(request.title), "title required")?;
        let description = required(non_blank(request.description), "description required")?;
        let responsibilities = required(
            non_blank(request.responsibilities),
            "responsibilities required",
        )?;
        let qualification_category_id = required(
            request.qualification_category_id,
            "qualification_category_id required",
        )?;
        let qualification_subcategory_id = required(
            request.qualification_subcategory_id,
            "qualification_subcategory_id required",
        )?;

        if self.companies.get_company(company_id).await?.is_none() {
            return Err(AppError::NotFound("Company not found".to_string()));
        }

        let job_id = self
            .repository
            .create_job(NewJob {
                company_id,
                title,
                role: non_blank(request.role),
                function_area: non_blank(request.function_area),
                location: non_blank(request.location),
                employment_type: non_blank(request.employment_type),
                experience_min: request.experience_min,
                experience_max: request.experience_max,
                salary_min: request.salary_min,
                salary_max: request.salary_max,
                hide_salary: request.hide_salary,
                vacancies: request.vacancies.unwrap_or(1),
                education: non_blank(request.education),
                industry: non_blank(request.industry),
                industry_id: request.industry_id,
                category_id: request.category_id,
                subcategory_id: request.subcategory_id,
                responsibilities,
                qualifications: non_blank(request.qualifications),
                description,
                skills: json_or_empty_array(request.skills),
                labels: json_or_empty_array(request.labels),
                questions: json_or_empty_array(request.questions),
                walkin_details: request.walkin_details.unwrap_or(Value::Null),
                qualification_category_id,
                qualification_subcategory_id,
                deadline: request.deadline,
                company_name: non_blank(request.company_name),
                created_by: claims.sub,
            })
            .await?;

        info!(job_id, company_id, "Job created");

        Ok(JobCreatedResponse {
            message: "Job created successfully".to_string(),
            job_id,
        })
    }

    pub async fn list_jobs(&self) -> Result<Vec<JobSummary>, AppError> {
        let rows = self.repository.list_with_company().await?;
        Ok(rows.iter().map(summary).collect())
    }

    pub async fn job_detail(&self, id: Option<i64>) -> Result<JobDetail, AppError> {
        let id = required(id, "id is required")?;
        let row = self
            .repository
            .get_with_company(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

        Ok(JobDetail {
            summary: summary(&row),
            responsibilities: row.job.responsibilities.clone().unwrap_or_default(),
            qualifications: row.job.qualifications.clone().unwrap_or_default(),
            education: row.job.education.clone(),
            qualification_category_id: row.job.qualification_category_id,
            qualification_subcategory_id: row.job.qualification_subcategory_id,
            category: row.category.unwrap_or_else(|| "General".to_string()),
        })
    }

    #[instrument(skip(self, request))]
    pub async fn filter_jobs(
        &self,
        request: FilterRequest,
    ) -> Result<FilterResponse<JobModel>, AppError> {
        let filter = JobFilter::from(request);
        let (jobs, total) = self.repository.filter_jobs(&filter).await?;
        Ok(FilterResponse {
            jobs,
            total,
            page: filter.page,
            jobs_per_page: filter.per_page,
        })
    }

    #[instrument(skip(self, claims, body))]
    pub async fn update_job(
        &self,
        claims: &AuthClaims,
        id: i64,
        body: Map<String, Value>,
    ) -> Result<JobModel, AppError> {
        self.managed_job(claims, id).await?;
        let patch = parse_patch(&body)?;

        let job = self
            .repository
            .update_job(id, &patch)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

        info!(job_id = id, fields = patch.len(), "Job updated");
        Ok(job)
    }

    #[instrument(skip(self, claims))]
    pub async fn delete_job(&self, claims: &AuthClaims, id: i64) -> Result<(), AppError> {
        self.managed_job(claims, id).await?;
        if !self.repository.delete_job(id).await? {
            return Err(AppError::NotFound("Job not found".to_string()));
        }
        info!(job_id = id, "Job deleted");
        Ok(())
    }

    #[instrument(skip(self, claims, request))]
    pub async fn create_form(
        &self,
        claims: &AuthClaims,
        request: DynamicFormRequest,
    ) -> Result<DynamicFormCreated, AppError> {
        let job_id = required(request.job_id, "job_id is required")?;
        let inputs = request
            .form_fields
            .filter(|fields| !fields.is_empty())
            .ok_or_else(|| AppError::BadRequest("form_fields array required".to_string()))?;

        let fields = inputs
            .into_iter()
            .enumerate()
            .map(|(index, input)| {
                match (non_blank(input.field_label), non_blank(input.field_type)) {
                    (Some(field_label), Some(field_type)) => Ok(NewFormField {
                        field_label,
                        field_type,
                        is_required: input.is_required.unwrap_or(true),
                        field_options: json_or_empty_array(input.field_options),
                        is_multi: input.is_multi.unwrap_or(false),
                    }),
                    _ => Err(AppError::BadRequest(format!(
                        "Invalid field data at index {}",
                        index
                    ))),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.managed_job(claims, job_id).await?;
        let field_ids = self.repository.create_form_fields(job_id, &fields).await?;

        info!(job_id, fields = field_ids.len(), "Application form created");

        Ok(DynamicFormCreated {
            message: "Dynamic job form created successfully".to_string(),
            inserted_fields: field_ids.len(),
            field_ids,
        })
    }

    pub async fn job_form(&self, job_id: Option<i64>) -> Result<JobFormResponse, AppError> {
        let job_id = required(job_id, "job_id is required")?;
        let job = self
            .repository
            .get_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

        let form_fields: Vec<FormFieldView> = self
            .repository
            .form_fields(job_id)
            .await?
            .into_iter()
            .map(|field| FormFieldView {
                field_id: field.id,
                field_label: field.field_label,
                field_type: field.field_type,
                is_required: field.is_required,
                field_options: match field.field_options.map(|o| o.0) {
                    Some(Value::Array(options)) => options,
                    Some(Value::Null) | None => Vec::new(),
                    Some(other) => vec![other],
                },
                is_multi: field.is_multi,
                order_no: field.order_no,
            })
            .collect();

        Ok(JobFormResponse {
            job_id,
            job_title: job.title,
            total_fields: form_fields.len(),
            form_fields,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn submit_application(
        &self,
        request: ApplicationRequest,
    ) -> Result<ApplicationCreated, AppError> {
        let job_id = required(request.job_id, "job_id required")?;
        let items = parse_responses(request.responses)?;

        if self.repository.get_job(job_id).await?.is_none() {
            return Err(AppError::NotFound("Job not found".to_string()));
        }

        let field_types: HashMap<i64, String> = self
            .repository
            .form_fields(job_id)
            .await?
            .into_iter()
            .map(|field| (field.id, field.field_type))
            .collect();

        let mut responses = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let response = to_new_response(index, item, |id| field_types.get(&id).cloned())?;
            if !field_types.contains_key(&response.field_id) {
                return Err(AppError::BadRequest(format!(
                    "Invalid response at index {}",
                    index
                )));
            }
            responses.push(response);
        }

        let application_id = self
            .repository
            .create_application(job_id, request.candidate_id, &responses)
            .await?;

        info!(application_id, job_id, "Application submitted");

        Ok(ApplicationCreated {
            message: "Application submitted successfully".to_string(),
            application_id,
            total_responses: responses.len(),
        })
    }

    pub async fn application_responses(
        &self,
        application_id: Option<i64>,
    ) -> Result<ApplicationResponses, AppError> {
        let application_id = required(application_id, "application_id is required")?;
        let rows = self.repository.application_responses(application_id).await?;
        if rows.is_empty() {
            return Err(AppError::NotFound("No responses found".to_string()));
        }
        Ok(ApplicationResponses {
            application_id,
            responses: responses_by_label(rows.iter()),
        })
    }

    #[instrument(skip(self, claims))]
    pub async fn applications_by_job(
        &self,
        claims: &AuthClaims,
        job_id: Option<i64>,
    ) -> Result<ApplicationsByJob, AppError> {
        let job_id = required(job_id, "job_id is required")?;
        self.managed_job(claims, job_id).await?;

        let (applications, responses) = self.repository.applications_for_job(job_id).await?;
        if applications.is_empty() {
            return Err(AppError::NotFound("No applications found".to_string()));
        }

        let applications: Vec<ApplicationView> = applications
            .into_iter()
            .map(|application| ApplicationView {
                application_id: application.id,
                candidate_id: application.candidate_id,
                applied_at: application.applied_at,
                responses: responses_by_label(
                    responses
                        .iter()
                        .filter(|r| r.application_id == application.id),
                ),
            })
            .collect();

        Ok(ApplicationsByJob {
            job_id,
            total_applications: applications.len(),
            applications,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::claims_for;
    use rstest::rstest;

    #[rstest]
    #[case("admin", 99, None, true)]
    #[case("recruiter", 99, Some(5), true)]
    #[case("viewer", 99, Some(5), true)]
    #[case("recruiter", 7, None, true)]
    #[case("owner", 99, Some(6), false)]
    #[case("candidate", 7, Some(5), false)]
    fn test_can_manage(
        #[case] role: &str,
        #[case] sub: i64,
        #[case] company_id: Option<i64>,
        #[case] expected: bool,
    ) {
        let mut job = JobModel::sample(1, 5, "Engineer");
        job.created_by = 7;
        let claims = claims_for(sub, "someone@example.com", role, company_id);
        assert_eq!(can_manage(&claims, &job), expected);
    }

    #[test]
    fn test_json_or_empty_array() {
        assert_eq!(json_or_empty_array(None), Value::Array(vec![]));
        assert_eq!(json_or_empty_array(Some(Value::Null)), Value::Array(vec![]));
        assert_eq!(
            json_or_empty_array(Some(serde_json::json!(["rust"]))),
            serde_json::json!(["rust"])
        );
    }
}
