use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Invite row. Only the SHA-256 digest of the emailed token is kept.
#[derive(Debug, Clone, FromRow)]
pub struct InviteModel {
    pub id: i64,
    pub company_id: i64,
    pub email: String,
    pub token_hash: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub used_by: Option<i64>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

impl InviteModel {
    /// Unused and not yet expired
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        !self.used && self.expires_at > now
    }
}

#[derive(Debug, Clone)]
pub struct NewInvite {
    pub company_id: i64,
    pub email: String,
    pub token_hash: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
    pub created_by: i64,
}

impl NewInvite {
    pub fn into_model(self, id: i64) -> InviteModel {
        InviteModel {
            id,
            company_id: self.company_id,
            email: self.email,
            token_hash: self.token_hash,
            role: self.role,
            expires_at: self.expires_at,
            used: false,
            used_by: None,
            used_at: None,
            created_by: self.created_by,
            created_at: Utc::now(),
        }
    }
}

/// An open invite found by its token, with the inviting company's name
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OpenInvite {
    pub id: i64,
    pub company_id: i64,
    pub company_name: String,
    pub email: String,
    pub role: String,
}

/// Row of the company invite listing
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct InviteListing {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub used: bool,
    pub invited_by_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_open() {
        let now = Utc::now();
        let mut invite = NewInvite {
            company_id: 1,
            email: "new@acme.test".to_string(),
            token_hash: "digest".to_string(),
            role: "viewer".to_string(),
            expires_at: now + Duration::days(7),
            created_by: 2,
        }
        .into_model(3);
        assert!(invite.is_open(now));

        invite.expires_at = now - Duration::seconds(1);
        assert!(!invite.is_open(now));

        invite.expires_at = now + Duration::days(1);
        invite.used = true;
        assert!(!invite.is_open(now));
    }
}
