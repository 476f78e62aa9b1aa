use async_trait::async_trait;
use std::sync::Mutex;

use job_board::{AppError, InviteEmail, Mailer};

// ============================================================================
// Mock Mailer
// ============================================================================

/// Mailer that captures invites so tests can follow the emailed link
#[derive(Default)]
pub struct CapturingMailer {
    outbox: Mutex<Vec<InviteEmail>>,
}

impl CapturingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<InviteEmail> {
        self.outbox.lock().unwrap().clone()
    }

    /// Raw token carried by the link of the latest invite sent to `to`
    pub fn token_for(&self, to: &str) -> Option<String> {
        self.outbox
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|email| email.to == to)
            .and_then(|email| email.link.split("token=").nth(1).map(str::to_string))
    }
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send_invite(&self, email: &InviteEmail) -> Result<(), AppError> {
        self.outbox.lock().unwrap().push(email.clone());
        Ok(())
    }
}
