// Public API - what other modules can use
pub use handlers::{
    accept_invite, company_invites, delete_invite, register_with_invite, send_invite,
    validate_invite,
};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
mod types;
