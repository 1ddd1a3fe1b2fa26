//! Caller roles and the capability gate.
//!
//! Identity and sessions live in an external collaborator; every call into
//! the stores presents one of these roles. Admin capabilities are a strict
//! superset of manager capabilities. The gate is evaluated once per
//! operation, ahead of the store call, instead of scattering ad-hoc role
//! checks through each code path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The role a caller presents with each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Unauthenticated viewer. Read-only access to public views.
    Public,
    /// Can edit the content of the currently-active campaign.
    Manager,
    /// Full access: campaign lifecycle, catalog administration, all
    /// manager capabilities.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Public => "public",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    /// Manager-level capabilities (admin included).
    pub fn can_manage(&self) -> bool {
        matches!(self, Role::Manager | Role::Admin)
    }

    /// Admin-only capabilities.
    pub fn can_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Role::Public),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            other => Err(CoreError::Validation(format!("Unknown role '{other}'"))),
        }
    }
}

/// Gate for manager-level operations.
pub fn require_manager(role: Role) -> Result<(), CoreError> {
    if role.can_manage() {
        Ok(())
    } else {
        Err(CoreError::Forbidden("Manager access required".into()))
    }
}

/// Gate for admin-only operations.
pub fn require_admin(role: Role) -> Result<(), CoreError> {
    if role.can_admin() {
        Ok(())
    } else {
        Err(CoreError::Forbidden("Admin access required".into()))
    }
}

/// Whether a caller may edit a given campaign's content.
///
/// A non-admin manager is restricted to the single currently-active
/// campaign; an admin may edit any campaign.
pub fn can_edit_campaign(role: Role, campaign_is_active: bool) -> bool {
    match role {
        Role::Admin => true,
        Role::Manager => campaign_is_active,
        Role::Public => false,
    }
}
