use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    InventoryManager,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::InventoryManager => "INVENTORY_MANAGER",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "INVENTORY_MANAGER" => Ok(Role::InventoryManager),
            "USER" => Ok(Role::User),
            other => Err(AppError::validation(format!("Unknown role '{other}'"))),
        }
    }
}

/// Who is performing a call. Passed explicitly into every workflow.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub user_id: i64,
    pub role: Role,
    pub username: String,
}

impl ActorContext {
    pub fn new(user_id: i64, role: Role, username: impl Into<String>) -> Self {
        Self { user_id, role, username: username.into() }
    }

    pub fn can_manage_inventory(&self) -> bool {
        matches!(self.role, Role::Admin | Role::InventoryManager)
    }

    /// Imports, medicines, suppliers and adjustments.
    pub fn require_inventory_manager(&self, action: &str) -> Result<(), AppError> {
        if self.can_manage_inventory() {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Only administrators and inventory managers can {action}"
            )))
        }
    }

    pub fn require_admin(&self, action: &str) -> Result<(), AppError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::forbidden(format!("Only administrators can {action}")))
        }
    }
}
