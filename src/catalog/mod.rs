// Public API - what other modules can use
pub use handlers::{
    category_subcategories, industry_categories, jobs_by_category, list_categories,
    list_industries, list_qualifications, qualification_subcategories,
};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
