//! Caller identity as resolved by the identity provider.

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Reviewer name stamped on requests the engine decides on its own.
pub const SYSTEM_ACTOR: &str = "system";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Accountant,
    Administrator,
    SuperAdministrator,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Accountant => "accountant",
            Self::Administrator => "administrator",
            Self::SuperAdministrator => "super_administrator",
        }
    }

    /// Accountants and administrators share reviewer privilege.
    #[must_use]
    pub fn is_reviewer(self) -> bool {
        matches!(
            self,
            Self::Accountant | Self::Administrator | Self::SuperAdministrator
        )
    }

    #[must_use]
    pub fn is_administrator(self) -> bool {
        matches!(self, Self::Administrator | Self::SuperAdministrator)
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "student" => Ok(Self::Student),
            "accountant" => Ok(Self::Accountant),
            "administrator" | "admin" => Ok(Self::Administrator),
            "super_administrator" | "super_admin" => Ok(Self::SuperAdministrator),
            other => Err(EngineError::Validation(format!("invalid role: {other}"))),
        }
    }
}

/// An authenticated caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    #[must_use]
    pub fn student(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Student)
    }

    pub(crate) fn require_reviewer(&self) -> ResultEngine<()> {
        if !self.role.is_reviewer() {
            return Err(EngineError::Forbidden(
                "reviewer privilege required".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn require_administrator(&self) -> ResultEngine<()> {
        if !self.role.is_administrator() {
            return Err(EngineError::Forbidden(
                "administrator privilege required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accountant_reviews_but_cannot_administer() {
        let actor = Actor::new("carol", Role::Accountant);
        assert!(actor.require_reviewer().is_ok());
        assert!(matches!(
            actor.require_administrator(),
            Err(EngineError::Forbidden(_))
        ));
    }

    #[test]
    fn students_are_not_reviewers() {
        assert!(matches!(
            Actor::student("alice").require_reviewer(),
            Err(EngineError::Forbidden(_))
        ));
    }
}
