use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// JWT claims carried by every authenticated request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthClaims {
    pub sub: i64, // user or recruiter id, depending on role
    pub email: Option<String>,
    pub role: String,
    pub company_id: Option<i64>,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

impl AuthClaims {
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }

    pub fn is_candidate(&self) -> bool {
        self.role() == Some(Role::Candidate)
    }
}

/// Account roles. Candidates sign in through `/api/users`, the others are recruiter roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Candidate,
    Owner,
    Admin,
    Recruiter,
    Viewer,
}

impl Role {
    /// Roles that can be granted through an invite
    pub fn is_invitable(self) -> bool {
        matches!(self, Role::Admin | Role::Recruiter | Role::Viewer)
    }

    /// Roles allowed to invite others into their company
    pub fn can_invite(self) -> bool {
        matches!(self, Role::Owner | Role::Admin | Role::Recruiter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_auth_claims_serialization() {
        let claims = AuthClaims {
            sub: 42,
            email: Some("jane@example.com".to_string()),
            role: "recruiter".to_string(),
            company_id: Some(7),
            exp: 1234567890,
            iat: 1234567800,
        };

        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("jane@example.com"));

        let deserialized: AuthClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, claims);
        assert_eq!(deserialized.role(), Some(Role::Recruiter));
    }

    #[rstest]
    #[case("owner", Some(Role::Owner))]
    #[case("admin", Some(Role::Admin))]
    #[case("viewer", Some(Role::Viewer))]
    #[case("candidate", Some(Role::Candidate))]
    #[case("superuser", None)]
    fn test_role_parsing(#[case] input: &str, #[case] expected: Option<Role>) {
        assert_eq!(input.parse::<Role>().ok(), expected);
    }

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.is_invitable());
        assert!(!Role::Owner.is_invitable());
        assert!(!Role::Candidate.is_invitable());

        assert!(Role::Owner.can_invite());
        assert!(Role::Recruiter.can_invite());
        assert!(!Role::Viewer.can_invite());
        assert!(!Role::Candidate.can_invite());
    }

    #[test]
    fn test_role_display_is_lowercase() {
        assert_eq!(Role::Recruiter.to_string(), "recruiter");
        assert_eq!(Role::Owner.as_ref(), "owner");
    }
}
