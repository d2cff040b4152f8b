//! Access Policy
//!
//! Every protected operation is an [`Operation`] variant that declares the
//! roles allowed to invoke it. [`authorize`] is a pure membership check.

use crate::domain::Role;
use crate::error::{PlatformError, Result};
use crate::service::token::VerifiedIdentity;

const ALL_ROLES: &[Role] = &[Role::Admin, Role::Analyst, Role::Viewer];
const ANALYSTS: &[Role] = &[Role::Admin, Role::Analyst];
const ADMINS: &[Role] = &[Role::Admin];

/// Operations gated by the access policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListEvents,
    ReadEvent,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    ListIncidents,
    ReadIncident,
    CreateIncident,
    UpdateIncident,
    ListAssets,
    ReadAsset,
    ListAlertRules,
    UpdateAlertRule,
    ReadDashboard,
    ReadProfile,
    RefreshToken,
    RegisterUser,
    ReadMetrics,
    ResetMetrics,
    ReadAuditLogs,
}

impl Operation {
    pub fn required_roles(self) -> &'static [Role] {
        match self {
            Self::ListEvents
            | Self::ReadEvent
            | Self::ListIncidents
            | Self::ReadIncident
            | Self::ListAssets
            | Self::ReadAsset
            | Self::ListAlertRules
            | Self::ReadDashboard
            | Self::ReadProfile
            | Self::RefreshToken => ALL_ROLES,

            Self::CreateEvent
            | Self::UpdateEvent
            | Self::CreateIncident
            | Self::UpdateIncident => ANALYSTS,

            Self::DeleteEvent
            | Self::UpdateAlertRule
            | Self::RegisterUser
            | Self::ReadMetrics
            | Self::ResetMetrics
            | Self::ReadAuditLogs => ADMINS,
        }
    }
}

/// Allow iff `role` is a member of `required_roles`.
pub fn authorize(role: Role, required_roles: &[Role]) -> Result<()> {
    if required_roles.contains(&role) {
        Ok(())
    } else {
        Err(PlatformError::forbidden("Insufficient permissions"))
    }
}

/// Authenticated caller, built from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub username: String,
    pub role: Role,
}

impl AuthContext {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn require(&self, operation: Operation) -> Result<()> {
        authorize(self.role, operation.required_roles()).map_err(|e| {
            tracing::debug!(
                username = %self.username,
                role = %self.role,
                operation = ?operation,
                "Access denied"
            );
            e
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<VerifiedIdentity> for AuthContext {
    fn from(identity: VerifiedIdentity) -> Self {
        Self::new(identity.username, identity.role)
    }
}
