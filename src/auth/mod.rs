// Public API - what other modules can use
pub use middleware::{jwt_auth, BearerToken};
pub use password::{hash_password, verify_password};
pub use token::{generate_token, hash_token, TokenConfig};
pub use types::{AuthClaims, Role};

// Internal modules
mod middleware;
mod password;
pub mod repository;
mod token;
mod types;
