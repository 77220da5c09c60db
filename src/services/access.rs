use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{User, UserRole};
use crate::vacation::VacationError;

/// The authenticated, active user performing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub manager_id: Option<Uuid>,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            manager_id: user.manager_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct AccessDenied(pub String);

impl From<AccessDenied> for VacationError {
    fn from(denied: AccessDenied) -> Self {
        VacationError::NotAuthorized(denied.0)
    }
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Pending queue, decisions, team calendar and team stats.
    pub fn require_team_manager(&self) -> Result<(), AccessDenied> {
        if self.role.can_manage_team() {
            Ok(())
        } else {
            Err(AccessDenied(
                "Only managers can review team vacation requests".to_string(),
            ))
        }
    }

    pub fn require_admin(&self) -> Result<(), AccessDenied> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AccessDenied("Admin access required".to_string()))
        }
    }
}
