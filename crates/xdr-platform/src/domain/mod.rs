//! Domain Models
//!
//! Security operations entities: events, incidents, assets, alert rules,
//! user identities and the audit trail.
//! Enumerations are stored as their lowercase wire names.

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum using
/// its wire names.
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::PlatformError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(crate::error::PlatformError::validation(format!(
                        "Invalid {} value: {}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

pub mod role;
pub mod user;
pub mod event;
pub mod incident;
pub mod asset;
pub mod alert_rule;
pub mod audit_log;

pub use role::*;
pub use user::*;
pub use event::*;
pub use incident::*;
pub use asset::*;
pub use alert_rule::*;
pub use audit_log::*;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Severity shared by events, incidents and alert rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

string_enum!(Severity {
    Critical => "critical",
    High => "high",
    Medium => "medium",
    Low => "low",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_round_trips_through_wire_name() {
        for severity in Severity::ALL {
            let parsed: Severity = severity.as_str().parse().unwrap();
            assert_eq!(parsed, *severity);
        }
        assert!("catastrophic".parse::<Severity>().is_err());
    }
}
