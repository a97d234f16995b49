//! User roles.

use serde::{Deserialize, Serialize};

/// Role carried on the user profile returned by the backend.
///
/// Serialized in `SCREAMING_SNAKE_CASE` to match the backend's enum names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular mall member.
    #[default]
    User,
    /// Store management access.
    Administrator,
    /// Full access including administrator management.
    SuperAdministrator,
}

impl Role {
    /// Whether this role may open administrative pages.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Administrator | Self::SuperAdministrator)
    }

    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Administrator => "ADMINISTRATOR",
            Self::SuperAdministrator => "SUPER_ADMINISTRATOR",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_roles() {
        assert!(!Role::User.is_admin());
        assert!(Role::Administrator.is_admin());
        assert!(Role::SuperAdministrator.is_admin());
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdministrator).unwrap(),
            "\"SUPER_ADMINISTRATOR\""
        );
        let role: Role = serde_json::from_str("\"ADMINISTRATOR\"").unwrap();
        assert_eq!(role, Role::Administrator);
    }
}
