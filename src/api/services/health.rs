use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::{HttpResponse, Responder, http::StatusCode, web};
use tracing::{error, info, trace};

use crate::api::types::{HealthEventsCheck, HealthResponse, HealthStorageCheck};
use crate::services::ResolutionService;

/// 存储探测上限
const STORAGE_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

// 应用启动时间
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }
}

/// Health Service
///
/// 直接使用注册表的 count，不加载全表
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        service: web::Data<Arc<ResolutionService>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let registry = service.registry();
        let backend = registry.backend_name().to_string();

        let storage = match tokio::time::timeout(STORAGE_PROBE_TIMEOUT, registry.count()).await {
            Ok(Ok(count)) => HealthStorageCheck {
                status: "healthy".to_string(),
                backend,
                records_count: Some(count),
                error: None,
            },
            Ok(Err(e)) => {
                error!("Storage health check failed: {}", e);
                HealthStorageCheck {
                    status: "unhealthy".to_string(),
                    backend,
                    records_count: None,
                    error: Some(e.message().to_string()),
                }
            }
            Err(_) => {
                error!("Storage health check timeout");
                HealthStorageCheck {
                    status: "unhealthy".to_string(),
                    backend,
                    records_count: None,
                    error: Some("timeout".to_string()),
                }
            }
        };

        let bus = service.bus();
        let events = HealthEventsCheck {
            subscribers: bus.subscriber_count(),
            published: bus.published_count(),
            closed: bus.is_closed(),
        };

        let now = chrono::Utc::now();
        let uptime = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;
        let is_healthy = storage.status == "healthy";

        let body = HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            timestamp: now.to_rfc3339(),
            uptime,
            storage,
            events,
            response_time_ms: start_time.elapsed().as_millis() as u32,
        };

        info!(
            "Health check completed in {:?}, status: {}, uptime: {}s",
            start_time.elapsed(),
            body.status,
            uptime
        );

        let status = if is_healthy {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        HttpResponse::build(status).json(body)
    }

    // 就绪检查：总线关闭（正在停机）后不再接收流量
    pub async fn readiness_check(service: web::Data<Arc<ResolutionService>>) -> impl Responder {
        trace!("Received readiness check request");

        if service.bus().is_closed() {
            return HttpResponse::ServiceUnavailable()
                .content_type("text/plain")
                .body("SHUTTING DOWN");
        }
        HttpResponse::Ok().content_type("text/plain").body("OK")
    }

    // 活跃性检查
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");

        HttpResponse::NoContent().finish()
    }
}
