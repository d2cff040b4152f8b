//! XDR Platform
//!
//! Security operations backend providing:
//! - Security event, incident, asset and alert rule management
//! - Bearer-token authentication with role-based access control
//! - Real-time WebSocket fan-out of new events and incidents
//! - Audit trail, request metrics and health probes

pub mod domain;
pub mod repository;
pub mod service;
pub mod realtime;
pub mod api;
pub mod config;
pub mod error;
pub mod seed;
pub mod platform;

pub use config::PlatformConfig;
pub use error::PlatformError;
pub use platform::XdrPlatform;
