//! Service Layer
//!
//! Tokens, access policy, credentials and the aggregates built on top of
//! the repositories.

pub mod token;
pub mod authorization;
pub mod password;
pub mod auth;
pub mod account;
pub mod audit;
pub mod dashboard;
pub mod metrics;

pub use token::{extract_bearer_token, AccessTokenClaims, TokenError, TokenService, VerifiedIdentity};
pub use authorization::{authorize, AuthContext, Operation};
pub use password::{Argon2Config, PasswordService};
pub use auth::{AuthService, IssuedToken};
pub use account::{AccountService, NewAccount};
pub use audit::AuditService;
pub use dashboard::{DashboardService, DashboardStats, ThreatLevel};
pub use metrics::{MetricsSnapshot, RequestMetrics};
