//! Authenticated session and role levels.
//!
//! A [`Session`] is produced by an [`AuthProvider`](crate::remote::AuthProvider) and passed
//! explicitly to everything that talks to the remote store or needs to make an admin decision.
use serde::{Deserialize, Serialize};

/// Privilege level resolved by the auth provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Player,
    Admin,
}

impl Role {
    /// Resolve the role for an email against the configured admin list (case-insensitive).
    pub fn for_email(email: &str, admin_emails: &[String]) -> Self {
        let email = email.trim();
        if admin_emails.iter().any(|a| a.trim().eq_ignore_ascii_case(email)) {
            Role::Admin
        } else {
            Role::Player
        }
    }

    /// Human-readable role name for display.
    pub fn name(&self) -> &'static str {
        match self {
            Role::Player => "Traveler",
            Role::Admin => "Admin",
        }
    }
}

/// Signed-in user plus the bearer credential used for remote calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub access_token: String,
    #[serde(default)]
    pub role: Role,
}

impl Session {
    pub fn new(user_id: &str, email: &str, username: &str, access_token: &str, role: Role) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
            username: username.to_string(),
            access_token: access_token.to_string(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Username fallback used when the provider carries no display name: the email's local part.
    pub fn default_username(email: &str) -> String {
        email.split('@').next().unwrap_or(email).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_role_is_resolved_from_email_list() {
        let admins = vec!["Keeper@Example.com".to_string()];
        assert_eq!(Role::for_email("keeper@example.com", &admins), Role::Admin);
        assert_eq!(Role::for_email("traveler@example.com", &admins), Role::Player);
        assert_eq!(Role::for_email("keeper@example.com", &[]), Role::Player);
    }

    #[test]
    fn default_username_uses_local_part() {
        assert_eq!(Session::default_username("lumine@teyvat.io"), "lumine");
        assert_eq!(Session::default_username("no-at-sign"), "no-at-sign");
    }
}
