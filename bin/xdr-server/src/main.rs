//! XDR Management Server
//!
//! Production server for the XDR management APIs:
//! - REST APIs: auth, events, incidents, assets, alert rules, dashboard
//! - Admin APIs: audit logs, request metrics
//! - WebSocket push of new events and incidents at `/ws`
//! - Optional background generator of simulated detections
//!
//! Configuration is read from `XDR_*` environment variables; see
//! [`xdr_platform::config`] for the full table. `RUST_LOG` controls the log
//! level (default `info`).

use std::net::SocketAddr;

use anyhow::Result;
use axum::http::{HeaderValue, Method};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use xdr_platform::api::build_router;
use xdr_platform::config::LogFormat;
use xdr_platform::repository::{connect, init_schema};
use xdr_platform::{PlatformConfig, XdrPlatform};

#[tokio::main]
async fn main() -> Result<()> {
    let config = PlatformConfig::from_env();
    init_tracing(config.log_format);

    info!("Starting XDR Management Server");
    if config.uses_default_secret() {
        warn!("XDR_SECRET_KEY is not set; using the built-in development key");
    }

    info!(database_url = %config.database_url, "Connecting to database");
    let pool = connect(&config.database_url, config.db_max_connections).await?;
    init_schema(&pool).await?;

    let platform = XdrPlatform::new(pool.clone(), &config)?;

    if config.seed_data {
        if let Err(e) = platform.seeder().seed().await {
            warn!(error = %e, "Demo data seeding failed");
        }
    }

    let app = build_router(&platform)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins));

    let generator_task = if config.generator_enabled {
        Some(platform.event_generator(config.generator).spawn())
    } else {
        info!("Event generator disabled");
        None
    };

    let api_addr = format!("0.0.0.0:{}", config.api_port);
    let listener = TcpListener::bind(&api_addr).await?;
    info!("API server listening on http://{}", api_addr);
    info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown signal received...");
    if let Some(task) = generator_task {
        task.abort();
    }
    pool.close().await;

    info!("XDR Management Server shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    match format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
