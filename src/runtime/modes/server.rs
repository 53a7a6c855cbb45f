//! Server mode
//!
//! Configures and starts the HTTP server, then waits for either the server to
//! exit or a shutdown signal.

use std::time::Duration;

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    http::{Method, header},
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::api::middleware::RequestIdMiddleware;
use crate::api::services::{AppStartTime, configure};
use crate::config::CorsConfig;
use crate::runtime::lifetime;

/// Validate CORS configuration at startup (runs once)
fn validate_cors_config(cors: &CorsConfig) {
    if cors.enabled && cors.allowed_origins.is_empty() {
        warn!(
            "CORS enabled but allowed_origins is empty. \
            No cross-origin requests will be allowed."
        );
    }
}

/// Build CORS middleware from configuration
///
/// 浏览器前端只需要 GET（历史、事件流）和 POST（创建）
pub fn build_cors_middleware(cors_config: &CorsConfig) -> Cors {
    if !cors_config.enabled {
        return Cors::default();
    }

    let mut cors = Cors::default()
        .allowed_methods([Method::GET, Method::POST])
        .allowed_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::HeaderName::from_static("x-request-id")])
        .max_age(cors_config.max_age as usize);

    if cors_config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

/// Run the HTTP server
///
/// **Note**: logging must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime::now();

    let startup = lifetime::startup::prepare_server_startup()
        .await
        .inspect_err(|e| error!("Server startup failed: {:#}", e))?;

    let config = crate::config::get_config();
    let cpu_count = config.server.cpu_count.clamp(1, 32);
    info!("Using {} CPU cores for the server", cpu_count);

    let cors_config = config.cors.clone();
    validate_cors_config(&cors_config);

    let handles = startup.handles(app_start_time);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(build_cors_middleware(&cors_config))
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("Connection", "keep-alive"))
                    .add(("Keep-Alive", "timeout=30, max=1000")),
            )
            .configure(|cfg| handles.register(cfg))
            .app_data(web::PayloadConfig::new(64 * 1024))
            .configure(configure)
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(config.server.request_timeout_ms.max(1)))
    .client_disconnect_timeout(Duration::from_millis(1000))
    // SSE 连接由事件总线关闭结束，这里无需长时间等待
    .shutdown_timeout(10)
    .workers(cpu_count)
    .disable_signals()
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!("Starting server at http://{}", bind_address);
    info!("Short links are served under {}", startup.settings.base_url);

    let server = server.run();
    let server_handle = server.handle();
    // 服务必须持续被轮询，停机期间也一样
    let mut server_task = actix_web::rt::spawn(server);

    tokio::select! {
        res = &mut server_task => {
            res.context("HTTP server task failed")?
                .context("HTTP server exited with an error")?;
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            lifetime::shutdown::shutdown(
                server_handle,
                startup.bus.clone(),
                startup.registry.clone(),
            )
            .await;
            if let Ok(Err(e)) = server_task.await {
                error!("HTTP server stopped with an error: {}", e);
            }
            info!("Graceful shutdown: all tasks completed");
        }
    }

    Ok(())
}
