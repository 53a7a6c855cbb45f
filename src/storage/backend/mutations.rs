//! Write operations for SeaOrmStorage

use sea_orm::{
    ColumnTrait, DbErr, EntityTrait, ExprTrait, QueryFilter, SqlErr, TransactionTrait,
    sea_query::Expr,
};
use tracing::{debug, error};

use super::converters::{model_to_record, record_to_active_model};
use super::{SeaOrmStorage, retry};
use crate::errors::{LinkpulseError, Result};
use crate::storage::UrlRecord;

use migration::entities::url_record;

/// 唯一约束冲突（短码或原始 URL 已被占用）
pub(super) fn is_unique_violation(err: &DbErr) -> bool {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }
    let msg = err.to_string();
    msg.contains("UNIQUE constraint failed")
        || msg.contains("Duplicate entry")
        || msg.contains("duplicate key")
}

impl SeaOrmStorage {
    /// 插入新记录；短码或原始 URL 已存在时返回 `AlreadyExists`，不覆盖
    pub async fn insert_record(&self, record: &UrlRecord) -> Result<()> {
        let db = &self.db;

        let result = retry::with_retry(
            &format!("insert({})", record.short_code),
            self.retry_config,
            || async {
                url_record::Entity::insert(record_to_active_model(record))
                    .exec_without_returning(db)
                    .await
            },
        )
        .await;

        match result {
            Ok(_) => {
                debug!("Inserted record {} -> {}", record.short_code, record.original_url);
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => Err(LinkpulseError::already_exists(format!(
                "short code '{}' or its URL is already registered",
                record.short_code
            ))),
            Err(e) => {
                error!("插入记录失败: {}", e);
                Err(LinkpulseError::database_operation(format!(
                    "Failed to insert '{}': {}",
                    record.short_code, e
                )))
            }
        }
    }

    /// 原子地将点击数加一并返回新值
    ///
    /// UPDATE 与随后的 SELECT 在同一事务中完成，返回值恰好是本次自增的结果。
    pub async fn increment(&self, code: &str) -> Result<Option<u64>> {
        let db = &self.db;

        let updated = retry::with_retry(
            &format!("increment({})", code),
            self.retry_config,
            || async {
                let txn = db.begin().await?;

                let res = url_record::Entity::update_many()
                    .col_expr(
                        url_record::Column::ClickCount,
                        Expr::col(url_record::Column::ClickCount).add(Expr::val(1i64)),
                    )
                    .filter(url_record::Column::ShortCode.eq(code))
                    .exec(&txn)
                    .await?;

                if res.rows_affected == 0 {
                    txn.rollback().await?;
                    return Ok::<_, DbErr>(None);
                }

                let model = url_record::Entity::find_by_id(code.to_string())
                    .one(&txn)
                    .await?;
                txn.commit().await?;
                Ok::<_, DbErr>(model)
            },
        )
        .await
        .map_err(|e| {
            error!("点击计数失败: {}", e);
            LinkpulseError::database_operation(format!("Failed to increment '{}': {}", code, e))
        })?;

        Ok(updated.map(|model| model_to_record(model).click_count))
    }
}
