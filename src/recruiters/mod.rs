// Public API - what other modules can use
pub use handlers::{
    get_recruiter, login, recruiter_companies, recruiter_company, register, save_company,
    update_recruiter,
};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
mod types;
