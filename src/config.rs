use config::{Config, ConfigError, Environment};
use serde::Deserialize;

const DEV_JWT_SECRET: &str = "your-secret-key-change-in-production";

/// Runtime settings, read from environment variables (and `.env` when present).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub invite_expiration_days: i64,
    pub app_base_url: String,
    pub email_host: Option<String>,
    pub email_port: u16,
    pub email_user: String,
    pub email_pass: String,
    pub email_from: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("port", defaults.port)?
            .set_default("database_max_connections", defaults.database_max_connections)?
            .set_default("jwt_secret", defaults.jwt_secret)?
            .set_default("jwt_expiration_hours", defaults.jwt_expiration_hours)?
            .set_default("invite_expiration_days", defaults.invite_expiration_days)?
            .set_default("app_base_url", defaults.app_base_url)?
            .set_default("email_port", defaults.email_port)?
            .set_default("email_user", defaults.email_user)?
            .set_default("email_pass", defaults.email_pass)?
            .set_default("email_from", defaults.email_from)?
            .add_source(Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// True when the JWT secret was not overridden from the development default.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Link sent to invitees; the frontend posts the token back to `/api/invites/accept`.
    pub fn invite_link(&self, token: &str) -> String {
        format!(
            "{}/invites/accept?token={}",
            self.app_base_url.trim_end_matches('/'),
            token
        )
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            database_url: None,
            database_max_connections: 10,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expiration_hours: 24,
            invite_expiration_days: 7,
            app_base_url: "http://localhost:3000".to_string(),
            email_host: None,
            email_port: 587,
            email_user: String::new(),
            email_pass: String::new(),
            email_from: "Job Board <no-reply@jobboard.local>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_dev_secret() {
        let config = AppConfig::default();
        assert!(config.uses_dev_secret());
        assert_eq!(config.port, 5000);
        assert_eq!(config.invite_expiration_days, 7);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_invite_link_strips_trailing_slash() {
        let config = AppConfig {
            app_base_url: "https://jobs.example.com/".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(
            config.invite_link("abc123"),
            "https://jobs.example.com/invites/accept?token=abc123"
        );
    }
}
