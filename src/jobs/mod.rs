// Public API - what other modules can use
pub use handlers::{
    create_and_submit_application, create_dynamic_form, create_job, delete_job, filter_jobs,
    get_all_jobs, get_application_responses, get_applications_by_job, get_job_by_id,
    get_job_dynamic_form, update_job,
};

// Internal modules
mod applications;
mod handlers;
pub mod models;
mod patch;
pub mod repository;
mod service;
mod types;
