//! Users and caller identity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User role carried in tokens as `type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Client,
    Cashier,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Cashier => "cashier",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "cashier" => Ok(Self::Cashier),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of an authenticated caller, decoded from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub is_admin: bool,
}

impl Identity {
    /// Staff may act on accounts they do not own
    pub fn is_staff(&self) -> bool {
        self.is_admin || matches!(self.role, Role::Cashier | Role::Admin)
    }

    /// Owners and staff may read or close an account
    pub fn can_access(&self, owner_id: i64) -> bool {
        self.id == owner_id || self.is_staff()
    }
}

/// Registered user
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_admin: bool,
    pub created_on: DateTime<Utc>,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
            is_admin: self.is_admin,
        }
    }
}

/// User fields before the store assigns an id
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_admin: bool,
}

impl NewUser {
    pub fn into_user(self, id: i64, created_on: DateTime<Utc>) -> User {
        User {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role,
            is_admin: self.is_admin,
            created_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role, is_admin: bool) -> Identity {
        Identity {
            id: 90,
            email: "testing@transaction.com".to_string(),
            role,
            is_admin,
        }
    }

    #[test]
    fn test_client_accesses_only_own_accounts() {
        let client = identity(Role::Client, false);
        assert!(client.can_access(90));
        assert!(!client.can_access(91));
    }

    #[test]
    fn test_staff_access() {
        assert!(identity(Role::Cashier, false).can_access(1));
        assert!(identity(Role::Client, true).is_staff());
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Cashier).unwrap(), "\"cashier\"");
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
    }
}
