use crate::domain::{DomainError, DomainResult, UserRole};

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i32,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: i32, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// Owners and staff may act on a user's resource.
    pub fn require_owner_or_staff(&self, owner_id: i32) -> DomainResult<()> {
        if self.user_id == owner_id || self.is_staff() {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "Resource belongs to another user".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_can_act_for_others() {
        assert!(Actor::new(1, UserRole::Driver).require_owner_or_staff(1).is_ok());
        assert!(Actor::new(2, UserRole::Driver).require_owner_or_staff(1).is_err());
        assert!(Actor::new(2, UserRole::Staff).require_owner_or_staff(1).is_ok());
    }
}
