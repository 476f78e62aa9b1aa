use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, instrument, warn};

use super::{InviteEmail, Mailer};
use crate::config::AppConfig;
use crate::shared::AppError;

/// Sends mail through an authenticated SMTP relay (STARTTLS)
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(host: &str, config: &AppConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(config.email_user.clone(), config.email_pass.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::Mail(format!("invalid SMTP relay {}: {}", host, e)))?
            .port(config.email_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from: config.email_from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, email), fields(to = %email.to))]
    async fn send_invite(&self, email: &InviteEmail) -> Result<(), AppError> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| AppError::Mail(format!("invalid sender address: {}", e)))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|e| AppError::Mail(format!("invalid recipient address: {}", e)))?)
            .subject(email.subject())
            .header(ContentType::TEXT_HTML)
            .body(email.to_string())
            .map_err(|e| AppError::Mail(e.to_string()))?;

        self.transport.send(message).await.map_err(|e| {
            warn!(error = %e, "SMTP relay rejected invite email");
            AppError::Mail(e.to_string())
        })?;

        info!("Invite email sent");
        Ok(())
    }
}
