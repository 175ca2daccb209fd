//! Server mode
//!
//! Configures and starts the HTTP server with all routes, then waits for
//! Ctrl+C and drains the side-effect dispatcher before returning.

use std::time::Duration;

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::configure_routes;
use crate::api::services::AppStartTime;
use crate::config::StaticConfig;
use crate::runtime::{shutdown, startup};

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: StaticConfig) -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let startup = startup::prepare_server_startup(&config)
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {:#}", e))?;

    let store = startup.store.clone();
    let link_service = startup.link_service.clone();
    let dispatcher = link_service.dispatcher().clone();
    let routes = config.routes.clone();

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(link_service.clone()))
            .app_data(web::Data::new(routes.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::PayloadConfig::new(64 * 1024))
            .configure(configure_routes)
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .workers(cpu_count)
    .disable_signals()
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    info!("Starting server at http://{}", bind_address);
    info!(
        "Short links are published under {}/",
        config.shortener.public_base()
    );

    let handle = server.handle();
    actix_web::rt::spawn(async move {
        shutdown::listen_for_shutdown().await;
        handle.stop(true).await;
    });

    server.await.context("HTTP server terminated with an error")?;

    shutdown::drain_dispatcher(
        &dispatcher,
        Duration::from_secs(config.dispatcher.drain_timeout_secs),
    )
    .await;
    warn!("Graceful shutdown: all tasks completed");

    Ok(())
}
