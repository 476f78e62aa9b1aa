// Public API - what other modules can use
pub use handlers::{
    get_profile, login, logout, register, save_job, saved_jobs, unsave_job, update_profile,
};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
mod types;
