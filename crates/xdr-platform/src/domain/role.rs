//! Roles
//!
//! Closed set of privilege classes. Authorization is set membership against
//! per-operation allow-lists (see [`crate::service::authorization`]), never
//! a comparison between roles.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Analyst,
    Viewer,
}

string_enum!(Role {
    Admin => "admin",
    Analyst => "analyst",
    Viewer => "viewer",
});

impl Default for Role {
    fn default() -> Self {
        Self::Viewer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"analyst\"").unwrap(),
            Role::Analyst
        );
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }

    #[test]
    fn test_default_role_is_least_privileged() {
        assert_eq!(Role::default(), Role::Viewer);
    }
}
