//! Platform assembly
//!
//! Builds repositories, services and the real-time core from one pool and
//! one [`PlatformConfig`]. The server binary and integration tests share
//! this wiring.

use std::sync::Arc;
use std::time::Instant;

use sqlx::SqlitePool;

use crate::config::PlatformConfig;
use crate::error::Result;
use crate::realtime::{Broadcaster, ConnectionRegistry, EventGenerator, GeneratorConfig};
use crate::repository::{
    AlertRuleRepository, AssetRepository, AuditLogRepository, EventRepository,
    IncidentRepository, UserRepository,
};
use crate::seed::DemoDataSeeder;
use crate::service::{
    AccountService, AuditService, AuthService, DashboardService, PasswordService,
    RequestMetrics, TokenService,
};

#[derive(Clone)]
pub struct XdrPlatform {
    pub users: UserRepository,
    pub events: EventRepository,
    pub incidents: IncidentRepository,
    pub assets: AssetRepository,
    pub alert_rules: AlertRuleRepository,
    pub audit_logs: AuditLogRepository,

    pub tokens: Arc<TokenService>,
    pub passwords: PasswordService,
    pub auth: AuthService,
    pub accounts: AccountService,
    pub audit: AuditService,
    pub dashboard: DashboardService,
    pub metrics: RequestMetrics,

    pub registry: ConnectionRegistry,
    pub broadcaster: Broadcaster,

    pub start_time: Instant,
}

impl XdrPlatform {
    pub fn new(pool: SqlitePool, config: &PlatformConfig) -> Result<Self> {
        let users = UserRepository::new(pool.clone());
        let events = EventRepository::new(pool.clone());
        let incidents = IncidentRepository::new(pool.clone());
        let assets = AssetRepository::new(pool.clone());
        let alert_rules = AlertRuleRepository::new(pool.clone());
        let audit_logs = AuditLogRepository::new(pool);

        let tokens = Arc::new(TokenService::new(&config.secret_key, config.token_ttl()));
        let passwords = PasswordService::new(config.argon2)?;
        let auth = AuthService::new(Arc::new(users.clone()), passwords.clone(), tokens.clone());
        let accounts = AccountService::new(users.clone(), passwords.clone());
        let audit = AuditService::new(audit_logs.clone());
        let dashboard = DashboardService::new(events.clone(), incidents.clone(), assets.clone());

        let registry = ConnectionRegistry::new();
        let broadcaster = Broadcaster::new(registry.clone());

        Ok(Self {
            users,
            events,
            incidents,
            assets,
            alert_rules,
            audit_logs,
            tokens,
            passwords,
            auth,
            accounts,
            audit,
            dashboard,
            metrics: RequestMetrics::new(),
            registry,
            broadcaster,
            start_time: Instant::now(),
        })
    }

    pub fn seeder(&self) -> DemoDataSeeder {
        DemoDataSeeder::new(
            self.users.clone(),
            self.events.clone(),
            self.incidents.clone(),
            self.assets.clone(),
            self.alert_rules.clone(),
            self.passwords.clone(),
        )
    }

    pub fn event_generator(&self, config: GeneratorConfig) -> EventGenerator {
        EventGenerator::new(self.events.clone(), self.broadcaster.clone(), config)
    }
}
