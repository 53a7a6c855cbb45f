use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::storage::UrlRegistry;
use crate::system::event::NotificationBus;

/// 关闭超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// 单个任务超时时间（秒）
const TASK_TIMEOUT_SECS: u64 = 10;

/// 等待 Ctrl+C
pub async fn listen_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, stopping..."),
        Err(e) => warn!(
            "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
            e
        ),
    }
}

/// 关闭顺序：事件总线（结束 SSE 长连接）→ HTTP 服务（等待进行中的请求）→ 存储
pub async fn shutdown(server: ServerHandle, bus: Arc<NotificationBus>, registry: Arc<dyn UrlRegistry>) {
    let result = timeout(
        Duration::from_secs(SHUTDOWN_TIMEOUT_SECS),
        perform_shutdown_tasks(server, bus, registry),
    )
    .await;

    match result {
        Ok(()) => info!("All shutdown tasks completed successfully"),
        Err(_) => error!(
            "Shutdown tasks timed out after {} seconds",
            SHUTDOWN_TIMEOUT_SECS
        ),
    }
}

async fn perform_shutdown_tasks(
    server: ServerHandle,
    bus: Arc<NotificationBus>,
    registry: Arc<dyn UrlRegistry>,
) {
    bus.close();
    info!("Notification bus closed");

    if timeout(Duration::from_secs(TASK_TIMEOUT_SECS), server.stop(true))
        .await
        .is_err()
    {
        error!(
            "HTTP server did not stop within {} seconds",
            TASK_TIMEOUT_SECS
        );
    }

    match timeout(Duration::from_secs(TASK_TIMEOUT_SECS), registry.close()).await {
        Ok(Ok(())) => info!("Storage closed"),
        Ok(Err(e)) => error!("Failed to close storage: {}", e),
        Err(_) => error!("Storage close timed out after {} seconds", TASK_TIMEOUT_SECS),
    }
}
