use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::services::{ApiSettings, AppHandles, AppStartTime};
use crate::config::StaticConfig;
use crate::services::{
    QrRenderer, RandomCodeGenerator, ResolutionService, ResolutionSettings, SvgQrRenderer,
};
use crate::storage::{StorageFactory, UrlRegistry};
use crate::system::event::NotificationBus;

/// Everything the HTTP server needs, built once at startup
pub struct StartupContext {
    pub registry: Arc<dyn UrlRegistry>,
    pub bus: Arc<NotificationBus>,
    pub service: Arc<ResolutionService>,
    pub qr: Arc<dyn QrRenderer>,
    pub settings: ApiSettings,
}

impl StartupContext {
    pub fn handles(&self, start_time: AppStartTime) -> AppHandles {
        AppHandles {
            service: self.service.clone(),
            qr: self.qr.clone(),
            settings: self.settings.clone(),
            start_time,
        }
    }
}

/// 准备服务器启动的上下文（使用全局配置）
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let config = crate::config::get_config();
    prepare_with_config(&config).await
}

/// 按给定配置构建存储、事件总线、短码生成器、二维码渲染器和解析服务
pub async fn prepare_with_config(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    // 已安装（例如测试中重复启动）时忽略
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let registry = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", registry.backend_name());

    let existing = registry
        .count()
        .await
        .context("Failed to count stored records")?;
    info!("{} url records available", existing);

    let bus = Arc::new(NotificationBus::new(config.events.buffer));

    if config.codes.length < RandomCodeGenerator::DEFAULT_LENGTH {
        warn!(
            "codes.length = {} is short; collisions become likely as the registry grows",
            config.codes.length
        );
    }
    let generator = Arc::new(RandomCodeGenerator::new(config.codes.length));

    let service = Arc::new(ResolutionService::new(
        registry.clone(),
        generator,
        bus.clone(),
        ResolutionSettings::from(&config.codes),
    ));

    let qr: Arc<dyn QrRenderer> = Arc::new(SvgQrRenderer::new(config.qr.min_dimension));

    debug!("Pre-startup processing completed in {:?}", start_time.elapsed());

    Ok(StartupContext {
        registry,
        bus,
        service,
        qr,
        settings: ApiSettings::from_config(config),
    })
}
