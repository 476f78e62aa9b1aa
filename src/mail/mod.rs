//! Outgoing email. Only invites are mailed today.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::{self, Display};
use tracing::info;

use crate::shared::AppError;

mod smtp;

pub use smtp::SmtpMailer;

/// Everything needed to render an invite email
#[derive(Debug, Clone, PartialEq)]
pub struct InviteEmail {
    pub to: String,
    pub company_name: String,
    pub role: String,
    pub link: String,
    pub expires_at: DateTime<Utc>,
}

impl InviteEmail {
    pub fn subject(&self) -> String {
        format!(
            "Invitation to join {} as {}",
            self.company_name, self.role
        )
    }
}

/// Escapes text interpolated into the HTML body
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

impl Display for InviteEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"<p>You have been invited to join {company} as a {role}.</p>
<p>Please click the link below to accept the invitation:</p>
<a href="{link}">{link}</a>
<p>This link will expire on {expires}.</p>"#,
            company = escape_html(&self.company_name),
            role = escape_html(&self.role),
            link = escape_html(&self.link),
            expires = self.expires_at.format("%Y-%m-%d %H:%M UTC"),
        )
    }
}

#[async_trait]
pub trait Mailer {
    async fn send_invite(&self, email: &InviteEmail) -> Result<(), AppError>;
}

/// Mailer used when no SMTP relay is configured: logs the invite instead of sending it
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_invite(&self, email: &InviteEmail) -> Result<(), AppError> {
        info!(
            to = %email.to,
            company = %email.company_name,
            role = %email.role,
            link = %email.link,
            "SMTP not configured, invite email logged instead of sent"
        );
        Ok(())
    }
}
