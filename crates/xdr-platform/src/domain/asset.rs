//! Monitored Asset Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Healthy,
    Compromised,
    Investigating,
}

string_enum!(AssetStatus {
    Healthy => "healthy",
    Compromised => "compromised",
    Investigating => "investigating",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// `AST-NNN`
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub os: String,
    pub ip: String,
    pub status: AssetStatus,
    pub last_seen: DateTime<Utc>,
    pub owner: String,
    pub department: String,
    /// 0-100
    pub risk_score: i64,
}

impl Asset {
    pub fn is_compromised(&self) -> bool {
        self.status == AssetStatus::Compromised
    }
}
