use std::sync::Arc;

use actix_web::{HttpResponse, web};
use tracing::{error, info};

use super::ApiSettings;
use crate::api::types::{
    CreateShortRequest, CreateShortResponse, HistoryItem, MESSAGE_CREATED, MESSAGE_EXISTING,
};
use crate::errors::{LinkpulseError, Result};
use crate::services::{QrRenderer, ResolutionService, to_data_url};

/// 请求体上限
const MAX_BODY_BYTES: usize = 64 * 1024;

pub struct LinksService;

impl LinksService {
    /// 非法 JSON 与缺失字段统一返回 `InvalidInput`
    pub fn json_config() -> web::JsonConfig {
        web::JsonConfig::default()
            .limit(MAX_BODY_BYTES)
            .error_handler(|err, _req| {
                LinkpulseError::invalid_input(format!("invalid request body: {}", err)).into()
            })
    }

    pub async fn create_short_url(
        body: web::Json<CreateShortRequest>,
        service: web::Data<Arc<ResolutionService>>,
        qr: web::Data<Arc<dyn QrRenderer>>,
        settings: web::Data<ApiSettings>,
    ) -> Result<HttpResponse> {
        let outcome = settings
            .with_deadline("create", service.create_or_fetch(&body.original_url))
            .await?;

        let record = outcome.record;
        let short_url = settings.short_url(&record.short_code);

        // 渲染失败时记录已保存，重试同一 URL 会得到同一个短码
        let qr_code_img = if settings.qr_enabled {
            Some(to_data_url(qr.get_ref().as_ref(), &short_url).map_err(|e| {
                error!("QR render failed for {}: {}", short_url, e);
                LinkpulseError::server_error(format!("failed to render QR code: {}", e.message()))
            })?)
        } else {
            None
        };

        if outcome.created {
            info!("Generated {} for {}", short_url, record.original_url);
        }

        Ok(HttpResponse::Ok().json(CreateShortResponse {
            message: if outcome.created {
                MESSAGE_CREATED
            } else {
                MESSAGE_EXISTING
            }
            .to_string(),
            short_url,
            short_code: record.short_code,
            click_count: record.click_count,
            qr_code_img,
        }))
    }

    pub async fn history(
        service: web::Data<Arc<ResolutionService>>,
        settings: web::Data<ApiSettings>,
    ) -> Result<HttpResponse> {
        let records = settings
            .with_deadline("history", service.list_history())
            .await?;

        let items: Vec<HistoryItem> = records
            .into_iter()
            .map(|r| HistoryItem {
                short_url: settings.short_url(&r.short_code),
                original_url: r.original_url,
                short_code: r.short_code,
                click_count: r.click_count,
                created_at: r.created_at,
            })
            .collect();

        Ok(HttpResponse::Ok().json(items))
    }
}
