//! OpenAPI Documentation
//!
//! Central OpenAPI specification for the XDR management API.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// XDR Management API OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "XDR Management API",
        version = "1.0.0",
        description = "Security events, incidents, assets and alert rules with real-time notifications"
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development")
    ),
    tags(
        (name = "auth", description = "Authentication and accounts"),
        (name = "events", description = "Security events"),
        (name = "incidents", description = "Incident tracking"),
        (name = "assets", description = "Monitored assets"),
        (name = "alerts", description = "Alert rules"),
        (name = "dashboard", description = "SOC statistics"),
        (name = "monitoring", description = "Health and metrics"),
        (name = "audit-logs", description = "Audit logs")
    ),
    paths(
        // Auth API
        super::auth::login,
        super::auth::login_json,
        super::auth::me,
        super::auth::register,
        super::auth::refresh,
        // Events API
        super::events::list_events,
        super::events::get_event,
        super::events::create_event,
        super::events::update_event,
        super::events::delete_event,
        // Incidents API
        super::incidents::list_incidents,
        super::incidents::get_incident,
        super::incidents::create_incident,
        super::incidents::update_incident,
        // Assets API
        super::assets::list_assets,
        super::assets::get_asset,
        // Alert Rules API
        super::alerts::list_alert_rules,
        super::alerts::update_alert_rule,
        // Dashboard API
        super::dashboard::get_stats,
        // Monitoring API
        super::monitoring::health,
        super::monitoring::ready,
        super::monitoring::live,
        super::monitoring::get_metrics,
        super::monitoring::reset_metrics,
        // Audit Logs Admin API
        super::audit_logs::list_audit_logs,
    ),
    components(
        schemas(
            // Domain schemas
            crate::domain::Role,
            crate::domain::Severity,
            crate::domain::SecurityEvent,
            crate::domain::EventStatus,
            crate::domain::Incident,
            crate::domain::IncidentStatus,
            crate::domain::TimelineEntry,
            crate::domain::Asset,
            crate::domain::AssetStatus,
            crate::domain::AlertRule,
            crate::domain::AuditLog,
            crate::domain::AuditAction,
            // Request/response schemas
            super::auth::LoginRequest,
            super::auth::TokenResponse,
            super::auth::UserSummary,
            super::auth::UserResponse,
            super::auth::RegisterRequest,
            super::events::CreateEventRequest,
            super::events::UpdateEventRequest,
            super::incidents::CreateIncidentRequest,
            super::incidents::UpdateIncidentRequest,
            super::alerts::UpdateAlertRuleRequest,
            super::monitoring::HealthResponse,
            super::monitoring::ProbeResponse,
            super::audit_logs::AuditLogListResponse,
            crate::service::DashboardStats,
            crate::service::ThreatLevel,
            crate::service::MetricsSnapshot,
            // Common schemas
            super::common::ApiError,
            super::common::MessageResponse,
        )
    ),
    modifiers(&BearerAuth)
)]
pub struct XdrApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_protected_and_public_paths() {
        let doc = XdrApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/events/{id}"));
        assert!(doc.paths.paths.contains_key("/api/monitoring/health"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
