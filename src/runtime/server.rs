//! Server mode
//!
//! Configures and starts the HTTP server for the lookup endpoint.

use actix_web::{App, HttpServer, middleware::Condition, web};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::{AccessLog, lookup_routes};
use crate::config::AppConfig;
use crate::runtime::lifetime;

/// Run the HTTP server until it receives a shutdown signal
///
/// actix-web installs its own SIGINT/SIGTERM handlers and stops gracefully;
/// the response cache is closed once the server future resolves.
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: AppConfig) -> Result<()> {
    info!("ipgeo {}", env!("CARGO_PKG_VERSION"));

    let startup = lifetime::startup::prepare_server_startup(&config).map_err(|e| {
        tracing::error!("Server startup failed: {:#}", e);
        e
    })?;

    let pipeline = startup.pipeline.clone();
    let policy = startup.policy.clone();
    let access_log = config.http.access_log;
    let workers = config.server.workers.max(1);

    if access_log {
        warn!(
            "Logging of requests is enabled, this may severely impact performance under high utilization!"
        );
    }
    info!("Using {} worker threads", workers);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Condition::new(access_log, AccessLog))
            .app_data(web::Data::new(pipeline.clone()))
            .app_data(web::Data::new(policy.clone()))
            .service(lookup_routes())
    })
    .workers(workers);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let server = server
        .bind(&bind_address)
        .map_err(|e| crate::errors::IpGeoError::bind(format!("{}: {}", bind_address, e)))
        .context("Failed to bind listener")?;

    info!("Listening for connections on http://{}", bind_address);
    server.run().await.context("HTTP server error")?;

    lifetime::shutdown::perform_shutdown(startup.cache.as_ref());
    Ok(())
}
