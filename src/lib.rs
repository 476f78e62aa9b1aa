// Library crate for the job board server
// This file exposes the router and public API for integration tests

pub mod auth;
pub mod catalog;
pub mod companies;
pub mod config;
pub mod db;
pub mod invites;
pub mod jobs;
pub mod mail;
pub mod memory;
pub mod recruiters;
pub mod shared;
pub mod users;
pub mod validation;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use mail::{InviteEmail, LogMailer, Mailer};
pub use memory::MemoryStore;
pub use shared::{AppError, AppState};

/// Routes reachable without a token
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "Job board server is running" }))
        // candidates
        .route("/api/users/register", post(users::register))
        .route("/api/users/login", post(users::login))
        .route("/api/users/profile/:id", get(users::get_profile))
        // recruiters
        .route("/api/recruiters/register", post(recruiters::register))
        .route("/api/recruiters/login", post(recruiters::login))
        .route("/api/recruiters/:user_id", get(recruiters::get_recruiter))
        .route(
            "/api/recruiters/:user_id/company",
            get(recruiters::recruiter_company),
        )
        .route(
            "/api/recruiters/:user_id/companies",
            get(recruiters::recruiter_companies),
        )
        // companies
        .route("/api/companies/getAllCompanies", get(companies::list_companies))
        .route("/api/companies/getCompanyById", get(companies::get_company))
        .route(
            "/api/companies/getCompanyOpenings",
            get(companies::company_openings),
        )
        // jobs
        .route("/api/jobs/getAllJobs", get(jobs::get_all_jobs))
        .route("/api/jobs/getJobById", get(jobs::get_job_by_id))
        .route("/api/jobs/all", post(jobs::filter_jobs))
        .route("/api/jobs/getJobDynamicForm", get(jobs::get_job_dynamic_form))
        .route(
            "/api/jobs/createAndSubmitApplication",
            post(jobs::create_and_submit_application),
        )
        .route(
            "/api/jobs/getApplicationResponses",
            get(jobs::get_application_responses),
        )
        // catalog
        .route("/api/categories", get(catalog::list_categories))
        .route("/api/categories/:slug", get(catalog::jobs_by_category))
        .route("/api/industries", get(catalog::list_industries))
        .route(
            "/api/industries/:industry_id/categories",
            get(catalog::industry_categories),
        )
        .route(
            "/api/industries/categories/:category_id/subcategories",
            get(catalog::category_subcategories),
        )
        .route("/api/qualifications", get(catalog::list_qualifications))
        .route(
            "/api/qualifications/:id/subcategories",
            get(catalog::qualification_subcategories),
        )
        // invites
        .route("/api/invites/validate", get(invites::validate_invite))
        .route("/api/invites/register", post(invites::register_with_invite))
        // path used by existing frontends
        .route(
            "/api/invites/intiveRegister",
            post(invites::register_with_invite),
        )
}

/// Routes behind `jwt_auth`; handlers read `Extension<AuthClaims>`
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/users/logout", post(users::logout))
        .route(
            "/api/users/updateUserProfile/:id",
            put(users::update_profile),
        )
        .route("/api/users/saveJobs", get(users::saved_jobs))
        .route("/api/users/saveJobs/:id", post(users::save_job))
        .route("/api/users/savedJobs/:id", delete(users::unsave_job))
        .route("/api/recruiters/company", post(recruiters::save_company))
        .route(
            "/api/recruiters/update-user",
            patch(recruiters::update_recruiter),
        )
        .route("/api/jobs/createJob", post(jobs::create_job))
        .route("/api/jobs/updatejob/:id", put(jobs::update_job))
        .route("/api/jobs/deletejobs/:id", delete(jobs::delete_job))
        .route("/api/jobs/createDynamicForm", post(jobs::create_dynamic_form))
        .route(
            "/api/jobs/getApplicationsByJob",
            get(jobs::get_applications_by_job),
        )
        .route("/api/invites/send-invite", post(invites::send_invite))
        .route("/api/invites/accept", post(invites::accept_invite))
        .route("/api/invites/RecruiterInvites", get(invites::company_invites))
        .route(
            "/api/invites/deleteInvites/:invite_id",
            delete(invites::delete_invite),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::jwt_auth,
        ))
}

/// Builds the full application router over the given state
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(&state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{send, AppStateBuilder};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_root_reports_running() {
        let app = build_router(AppStateBuilder::new().build());
        let response = tower::ServiceExt::oneshot(
            app,
            axum::http::Request::builder()
                .uri("/")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"Job board server is running");
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = build_router(AppStateBuilder::new().build());
        for (method, uri) in [
            ("POST", "/api/jobs/createJob"),
            ("GET", "/api/users/saveJobs"),
            ("POST", "/api/invites/send-invite"),
            ("PATCH", "/api/recruiters/update-user"),
        ] {
            let (status, body) = send(app.clone(), method, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
            assert_eq!(body["error"], "Authentication required");
        }

        let (status, _) = send(
            app,
            "GET",
            "/api/users/saveJobs",
            Some("Bearer not.a.jwt"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
