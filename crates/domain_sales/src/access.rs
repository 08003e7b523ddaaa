//! Role-based access to pipeline operations
//!
//! Roles arrive from the authentication collaborator as loosely typed
//! strings. They are parsed into the closed [`Role`] set at the boundary and
//! passed explicitly, as part of an [`Actor`], to every service operation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::UserId;

use crate::error::AccessError;

/// Brokerage user roles, declared from least to most privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    Admin,
    #[serde(alias = "superAdmin")]
    SuperAdmin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccessError;

    /// Accepts `super_admin`, `superAdmin` and `super-admin` spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "employee" => Ok(Role::Employee),
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::SuperAdmin),
            _ => Err(AccessError::UnknownRole(s.to_string())),
        }
    }
}

/// Pipeline operations subject to access control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewPipeline,
    CreateProcess,
    AdvanceStage,
    ChangeStatus,
    RequestImport,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Permission::ViewPipeline => "pipeline:view",
            Permission::CreateProcess => "process:create",
            Permission::AdvanceStage => "process:advance",
            Permission::ChangeStatus => "process:status",
            Permission::RequestImport => "process:import",
        };
        f.write_str(name)
    }
}

/// The authenticated user on whose behalf an operation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Checks `permission` for the actor; imports need at least `import_floor`
pub fn authorize(actor: &Actor, permission: Permission, import_floor: Role) -> Result<(), AccessError> {
    let granted = match permission {
        Permission::RequestImport => actor.role >= import_floor,
        Permission::ViewPipeline
        | Permission::CreateProcess
        | Permission::AdvanceStage
        | Permission::ChangeStatus => true,
    };
    if granted {
        Ok(())
    } else {
        Err(AccessError::MissingPermission {
            role: actor.role,
            permission,
        })
    }
}
