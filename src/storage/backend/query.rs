//! Read-only operations for SeaOrmStorage

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use tracing::{debug, error};

use super::converters::{model_to_record, url_hash};
use super::{SeaOrmStorage, retry};
use crate::errors::{LinkpulseError, Result};
use crate::storage::UrlRecord;

use migration::entities::url_record;

impl SeaOrmStorage {
    pub async fn get(&self, code: &str) -> Result<Option<UrlRecord>> {
        let db = &self.db;

        retry::with_retry(&format!("get({})", code), self.retry_config, || async {
            url_record::Entity::find_by_id(code.to_string()).one(db).await
        })
        .await
        .map(|found| found.map(model_to_record))
        .map_err(|e| {
            error!("查询短码失败（重试后仍失败）: {}", e);
            LinkpulseError::database_operation(format!("Failed to look up '{}': {}", code, e))
        })
    }

    pub async fn get_by_original_url(&self, url: &str) -> Result<Option<UrlRecord>> {
        let db = &self.db;
        let hash = url_hash(url);

        retry::with_retry("get_by_original_url", self.retry_config, || async {
            // 摘要走唯一索引，再比对原文排除碰撞
            url_record::Entity::find()
                .filter(url_record::Column::UrlHash.eq(hash.as_str()))
                .filter(url_record::Column::OriginalUrl.eq(url))
                .one(db)
                .await
        })
        .await
        .map(|found| found.map(model_to_record))
        .map_err(|e| {
            error!("按原始 URL 查询失败: {}", e);
            LinkpulseError::database_operation(format!("Failed to look up URL: {}", e))
        })
    }

    /// 全部记录，按创建时间升序
    pub async fn load_all(&self) -> Result<Vec<UrlRecord>> {
        let db = &self.db;

        let models = retry::with_retry("load_all", self.retry_config, || async {
            url_record::Entity::find()
                .order_by_asc(url_record::Column::CreatedAt)
                .order_by_asc(url_record::Column::ShortCode)
                .all(db)
                .await
        })
        .await
        .map_err(|e| {
            LinkpulseError::database_operation(format!("Failed to load records: {}", e))
        })?;

        debug!("Loaded {} url records", models.len());
        Ok(models.into_iter().map(model_to_record).collect())
    }

    pub async fn count_records(&self) -> Result<u64> {
        let db = &self.db;

        retry::with_retry("count", self.retry_config, || async {
            url_record::Entity::find().count(db).await
        })
        .await
        .map_err(|e| LinkpulseError::database_operation(format!("Failed to count records: {}", e)))
    }
}
