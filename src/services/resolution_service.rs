//! Short-code resolution and click counting
//!
//! Owns the three public operations of the engine: create-or-fetch,
//! redirect-and-count and history listing. Registry and generator errors are
//! translated here; `AlreadyExists` is consumed and never returned.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use xxhash_rust::xxh64::xxh64;

use crate::config::CodeConfig;
use crate::errors::{ErrorKind, LinkpulseError, Result};
use crate::services::CodeGenerator;
use crate::storage::{UrlRecord, UrlRegistry};
use crate::system::event::{ClickEvent, NotificationBus};
use crate::utils::is_header_safe;

/// 每码锁的条带数
const LOCK_STRIPES: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct ResolutionSettings {
    /// 生成短码的最大尝试次数
    pub max_attempts: u32,
}

impl Default for ResolutionSettings {
    fn default() -> Self {
        Self { max_attempts: 5 }
    }
}

impl From<&CodeConfig> for ResolutionSettings {
    fn from(codes: &CodeConfig) -> Self {
        Self {
            max_attempts: codes.max_attempts.max(1),
        }
    }
}

/// Result of [`ResolutionService::create_or_fetch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    pub record: UrlRecord,
    /// `false` when the URL was already registered (by an earlier or a racing request)
    pub created: bool,
}

/// Result of [`ResolutionService::redirect`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectOutcome {
    pub original_url: String,
    pub click_count: u64,
    /// 收到点击事件的订阅者数量
    pub notified: usize,
}

pub struct ResolutionService {
    registry: Arc<dyn UrlRegistry>,
    generator: Arc<dyn CodeGenerator>,
    bus: Arc<NotificationBus>,
    settings: ResolutionSettings,
    // 自增 + 发布在同一条带锁内完成，保证同一短码的事件按自增顺序发出
    stripes: Vec<Mutex<()>>,
}

impl ResolutionService {
    pub fn new(
        registry: Arc<dyn UrlRegistry>,
        generator: Arc<dyn CodeGenerator>,
        bus: Arc<NotificationBus>,
        settings: ResolutionSettings,
    ) -> Self {
        Self {
            registry,
            generator,
            bus,
            settings,
            stripes: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    pub fn registry(&self) -> &Arc<dyn UrlRegistry> {
        &self.registry
    }

    pub fn bus(&self) -> &Arc<NotificationBus> {
        &self.bus
    }

    /// Return the record for `original_url`, creating it on first use.
    ///
    /// Exactly one record exists per distinct URL even when callers race:
    /// the loser of a concurrent insert gets the winner's record.
    pub async fn create_or_fetch(&self, original_url: &str) -> Result<CreateOutcome> {
        let original_url = original_url.trim();
        if original_url.is_empty() {
            return Err(LinkpulseError::invalid_input("originalUrl must not be empty"));
        }
        // 存进去的地址必须能作为 Location 头返回，否则每次跳转都会失败
        if !is_header_safe(original_url) {
            return Err(LinkpulseError::invalid_input(
                "originalUrl contains characters that cannot be sent in a Location header",
            ));
        }

        if let Some(record) = self
            .registry
            .find_by_original_url(original_url)
            .await
            .map_err(service_error)?
        {
            debug!("URL already registered as '{}'", record.short_code);
            return Ok(CreateOutcome {
                record,
                created: false,
            });
        }

        for attempt in 1..=self.settings.max_attempts {
            let code = self.generator.generate().map_err(service_error)?;
            let record = UrlRecord::new(original_url, code);

            match self.registry.insert(record.clone()).await {
                Ok(()) => {
                    info!("Created short code '{}' -> {}", record.short_code, original_url);
                    return Ok(CreateOutcome {
                        record,
                        created: true,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    // URL 冲突说明并发请求已经插入成功，直接返回它的记录
                    if let Some(winner) = self
                        .registry
                        .find_by_original_url(original_url)
                        .await
                        .map_err(service_error)?
                    {
                        debug!(
                            "Concurrent creation won with '{}', returning it",
                            winner.short_code
                        );
                        return Ok(CreateOutcome {
                            record: winner,
                            created: false,
                        });
                    }
                    warn!(
                        "Short code collision on '{}' (attempt {}/{})",
                        record.short_code, attempt, self.settings.max_attempts
                    );
                }
                Err(e) => return Err(service_error(e)),
            }
        }

        error!(
            "Code space exhausted: {} consecutive collisions for {}",
            self.settings.max_attempts, original_url
        );
        Err(LinkpulseError::code_space_exhausted(format!(
            "no free short code after {} attempts",
            self.settings.max_attempts
        )))
    }

    /// Count one visit to `short_code` and announce the new count.
    pub async fn redirect(&self, short_code: &str) -> Result<RedirectOutcome> {
        let not_found =
            || LinkpulseError::not_found(format!("no record for short code '{}'", short_code));

        // 目标地址创建后不再变化，可以在锁外读取
        let original_url = self
            .registry
            .find_by_short_code(short_code)
            .await
            .map_err(service_error)?
            .map(|r| r.original_url)
            .ok_or_else(not_found)?;

        let _guard = self.stripe(short_code).lock().await;

        let click_count = self
            .registry
            .increment_click(short_code)
            .await
            .map_err(service_error)?
            .ok_or_else(not_found)?;

        let notified = self.bus.publish(ClickEvent::new(short_code, click_count));
        debug!(
            "Redirect '{}' -> {} (clicks: {}, notified: {})",
            short_code, original_url, click_count, notified
        );

        Ok(RedirectOutcome {
            original_url,
            click_count,
            notified,
        })
    }

    pub async fn list_history(&self) -> Result<Vec<UrlRecord>> {
        self.registry.list_all().await.map_err(service_error)
    }

    fn stripe(&self, short_code: &str) -> &Mutex<()> {
        let idx = (xxh64(short_code.as_bytes(), 0) % self.stripes.len() as u64) as usize;
        &self.stripes[idx]
    }
}

/// 把注册表 / 生成器错误转换为对外的错误种类
fn service_error(err: LinkpulseError) -> LinkpulseError {
    match err.kind() {
        ErrorKind::InvalidInput
        | ErrorKind::NotFound
        | ErrorKind::GeneratorUnavailable
        | ErrorKind::Timeout
        | ErrorKind::CodeSpaceExhausted => err,
        ErrorKind::AlreadyExists | ErrorKind::ServerError => {
            error!("Resolution failed: {}", err);
            LinkpulseError::server_error(err.message().to_string())
        }
    }
}
