use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::DomainError;

/// User role. Higher roles include the capabilities of lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserRole {
    Admin,
    Staff,
    #[default]
    Driver,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Staff => "STAFF",
            Self::Driver => "DRIVER",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Admin => 3,
            Self::Staff => 2,
            Self::Driver => 1,
        }
    }

    /// `ADMIN ⊇ STAFF ⊇ DRIVER`
    pub fn includes(&self, required: UserRole) -> bool {
        self.rank() >= required.rank()
    }

    pub fn is_staff(&self) -> bool {
        self.includes(UserRole::Staff)
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "STAFF" => Ok(Self::Staff),
            "DRIVER" => Ok(Self::Driver),
            other => Err(DomainError::bad_request(format!("Unknown role: {}", other))),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User model
#[derive(Clone, Debug)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_hierarchy() {
        assert!(UserRole::Admin.includes(UserRole::Staff));
        assert!(UserRole::Staff.includes(UserRole::Driver));
        assert!(!UserRole::Driver.includes(UserRole::Staff));
        assert!(!UserRole::Staff.includes(UserRole::Admin));
    }

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!("staff".parse::<UserRole>().unwrap(), UserRole::Staff);
        assert!("operator".parse::<UserRole>().is_err());
    }
}
