//! 数据库操作重试
//!
//! 只对瞬时故障（连接池耗尽、断线、死锁、SQLite BUSY）重试；
//! 唯一约束冲突等确定性错误立即返回给调用方。

use std::future::Future;
use std::time::Duration;

use sea_orm::DbErr;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

/// 可重试的数据库错误码
const RETRYABLE_CODES: &[&str] = &[
    // MySQL 死锁 / 锁等待超时
    "1213", "1205", //
    // PostgreSQL 序列化失败 / 死锁
    "40001", "40P01", //
    // SQLite BUSY / LOCKED
    "5", "6",
];

/// 判断数据库错误是否可重试
pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => is_retryable_runtime(runtime_err),
        _ => false,
    }
}

fn is_retryable_runtime(err: &sea_orm::error::RuntimeErr) -> bool {
    use sea_orm::error::RuntimeErr;

    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            use std::ops::Deref;
            if let Some(code) = sqlx_err
                .deref()
                .as_database_error()
                .and_then(|db_err| db_err.code())
            {
                return RETRYABLE_CODES.contains(&code.as_ref());
            }
            is_retryable_message(&sqlx_err.to_string())
        }
        RuntimeErr::Internal(msg) => is_retryable_message(msg),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

fn is_retryable_message(msg: &str) -> bool {
    let msg = msg.to_lowercase();
    ["deadlock", "lock wait timeout", "database is locked", "serialization failure"]
        .iter()
        .any(|needle| msg.contains(needle))
}

/// 重试配置
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl From<&DatabaseConfig> for RetryConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        }
    }
}

/// 以指数退避 + 抖动重试 `operation`
///
/// 总调用次数最多为 `max_retries + 1`。
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0;
    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("'{}' succeeded after {} retries", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if !is_retryable_error(&err) || attempt >= config.max_retries {
            debug!("'{}' failed after {} attempts: {}", operation_name, attempt + 1, err);
            return Err(err);
        }

        attempt += 1;
        let delay = backoff_delay(attempt, config.base_delay_ms, config.max_delay_ms);
        warn!(
            "'{}' failed (attempt {}/{}): {}; retrying in {} ms",
            operation_name,
            attempt,
            config.max_retries + 1,
            err,
            delay
        );
        sleep(Duration::from_millis(delay)).await;
    }
}

/// 第 `attempt` 次重试的等待时间：`base * 2^(attempt-1)`，上限 `max`，再加 0-25% 抖动
fn backoff_delay(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    let exp = base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exp.min(max_ms);
    capped.saturating_add(rand::random_range(0..=capped / 4))
}
