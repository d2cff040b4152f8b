//! Alert Rule Entity

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Severity;

/// Detection rule definition. Only the enabled flag is mutable through the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    /// `RULE-NNN`
    pub id: String,
    pub name: String,
    pub severity: Severity,
    pub enabled: bool,
    pub conditions: String,
    #[serde(default)]
    pub actions: Vec<String>,
}
