//! Real-time message envelope
//!
//! Every message pushed to a client is `{"type": ..., "data": ...}`.

use serde::{Deserialize, Serialize};

use crate::domain::{Incident, SecurityEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Notification {
    NewEvent(SecurityEvent),
    NewIncident(Incident),
    Pong(PongPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PongPayload {
    pub message: String,
}

impl Notification {
    pub fn pong() -> Self {
        Self::Pong(PongPayload {
            message: "Connection alive".to_string(),
        })
    }

    /// Wire tag, used for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NewEvent(_) => "new_event",
            Self::NewIncident(_) => "new_incident",
            Self::Pong(_) => "pong",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<SecurityEvent> for Notification {
    fn from(event: SecurityEvent) -> Self {
        Self::NewEvent(event)
    }
}

impl From<Incident> for Notification {
    fn from(incident: Incident) -> Self {
        Self::NewIncident(incident)
    }
}
