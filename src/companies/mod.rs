// Public API - what other modules can use
pub use handlers::{company_openings, get_company, list_companies};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
