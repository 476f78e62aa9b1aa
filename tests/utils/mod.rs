pub mod actions;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use actions::{Account, CompanyOwner};
#[allow(unused_imports)]
pub use mocks::CapturingMailer;
pub use setup::{TestApp, TestAppBuilder};
