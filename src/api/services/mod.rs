//! HTTP handlers and route tables

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use actix_web::web;

use crate::config::StaticConfig;
use crate::errors::{LinkpulseError, Result};

pub mod events;
pub mod health;
pub mod links;
pub mod redirect;

pub use events::EventsService;
pub use health::{AppStartTime, HealthService};
pub use links::LinksService;
pub use redirect::RedirectService;

/// Request-handling settings shared by every worker
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// 短链前缀，不带结尾斜杠
    pub base_url: String,
    pub request_timeout: Duration,
    pub keepalive: Duration,
    pub qr_enabled: bool,
}

impl ApiSettings {
    pub fn from_config(config: &StaticConfig) -> Self {
        Self {
            base_url: config.server.base_url(),
            request_timeout: Duration::from_millis(config.server.request_timeout_ms.max(1)),
            keepalive: Duration::from_secs(config.events.keepalive_secs.max(1)),
            qr_enabled: config.qr.enabled,
        }
    }

    pub fn short_url(&self, short_code: &str) -> String {
        format!("{}/{}", self.base_url, short_code)
    }

    /// 超过 `request_timeout` 的操作以 `Timeout` 失败
    pub async fn with_deadline<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.request_timeout, fut)
            .await
            .map_err(|_| {
                tracing::warn!(
                    "{} exceeded {} ms",
                    operation,
                    self.request_timeout.as_millis()
                );
                LinkpulseError::timeout(format!(
                    "{} did not finish within {} ms",
                    operation,
                    self.request_timeout.as_millis()
                ))
            })?
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self::from_config(&StaticConfig::default())
    }
}

/// `/api` 路由
pub fn api_routes() -> actix_web::Scope {
    web::scope("/api")
        .app_data(LinksService::json_config())
        .route("/short", web::post().to(LinksService::create_short_url))
        .route("/history", web::get().to(LinksService::history))
        .route("/events", web::get().to(EventsService::click_events))
}

/// `/health` 路由
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/ready", web::head().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}

/// 短码跳转，必须最后注册
pub fn redirect_routes() -> actix_web::Resource {
    web::resource("/{code}").route(web::get().to(RedirectService::handle_redirect))
}

/// Register every route; shared by the server and the integration tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api_routes())
        .service(health_routes())
        .service(redirect_routes());
}

/// Shared handles registered as app data
#[derive(Clone)]
pub struct AppHandles {
    pub service: Arc<crate::services::ResolutionService>,
    pub qr: Arc<dyn crate::services::QrRenderer>,
    pub settings: ApiSettings,
    pub start_time: AppStartTime,
}

impl AppHandles {
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.service.clone()))
            .app_data(web::Data::new(self.qr.clone()))
            .app_data(web::Data::new(self.settings.clone()))
            .app_data(web::Data::new(self.start_time.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_url_join() {
        let settings = ApiSettings {
            base_url: "https://sho.rt".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.short_url("abcd1234"), "https://sho.rt/abcd1234");
    }

    #[tokio::test]
    async fn test_deadline_reports_timeout() {
        let settings = ApiSettings {
            request_timeout: Duration::from_millis(10),
            ..Default::default()
        };
        let err = settings
            .with_deadline("slow", async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(())
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Timeout);
    }
}
