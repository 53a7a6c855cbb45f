//! SeaORM storage backend
//!
//! This module provides durable record storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod connection;
mod converters;
mod mutations;
mod query;
pub mod retry;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::errors::{LinkpulseError, Result};
use crate::storage::{UrlRecord, UrlRegistry};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{model_to_record, record_to_active_model, url_hash};

/// `memory://` 前缀选择非持久化的内存注册表
pub fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("memory://")
}

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(LinkpulseError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://, memory://",
            database_url
        )))
    }
}

/// 规范化 backend 名称
pub fn normalize_backend_name(backend: &str) -> String {
    match backend {
        "mariadb" => "mysql".to_string(),
        other => other.to_string(),
    }
}

/// SeaORM-based durable registry
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    /// 重试配置
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(LinkpulseError::database_config("database_url is not set"));
        }

        let backend_name = normalize_backend_name(backend_name);

        // 读取重试配置
        let config = crate::config::get_config();
        let retry_config = retry::RetryConfig::from(&config.database);

        // 根据不同数据库类型配置连接选项
        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, &backend_name).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name,
            retry_config,
        };

        // 运行迁移
        run_migrations(&storage.db).await?;

        info!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl UrlRegistry for SeaOrmStorage {
    async fn find_by_original_url(&self, url: &str) -> Result<Option<UrlRecord>> {
        self.get_by_original_url(url).await
    }

    async fn find_by_short_code(&self, code: &str) -> Result<Option<UrlRecord>> {
        self.get(code).await
    }

    async fn insert(&self, record: UrlRecord) -> Result<()> {
        self.insert_record(&record).await
    }

    async fn increment_click(&self, code: &str) -> Result<Option<u64>> {
        self.increment(code).await
    }

    async fn list_all(&self) -> Result<Vec<UrlRecord>> {
        self.load_all().await
    }

    async fn count(&self) -> Result<u64> {
        self.count_records().await
    }

    fn backend_name(&self) -> &str {
        &self.backend_name
    }

    async fn close(&self) -> Result<()> {
        self.db.clone().close().await.map_err(|e| {
            LinkpulseError::database_connection(format!("Failed to close database: {}", e))
        })?;
        info!("{} storage closed", self.backend_name.to_uppercase());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(infer_backend_from_url("sqlite://test.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("links.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("mysql://u:p@h/db").unwrap(), "mysql");
        assert_eq!(infer_backend_from_url("mariadb://u:p@h/db").unwrap(), "mysql");
        assert_eq!(
            infer_backend_from_url("postgresql://u:p@h/db").unwrap(),
            "postgres"
        );
    }

    #[test]
    fn test_infer_backend_rejects_unknown_scheme() {
        let err = infer_backend_from_url("redis://localhost").unwrap_err();
        assert!(matches!(err, LinkpulseError::DatabaseConfig(_)));
    }

    #[test]
    fn test_memory_url() {
        assert!(is_memory_url("memory://"));
        assert!(!is_memory_url("sqlite://memory.db"));
    }

    #[test]
    fn test_normalize_backend_name() {
        assert_eq!(normalize_backend_name("mariadb"), "mysql");
        assert_eq!(normalize_backend_name("sqlite"), "sqlite");
    }
}
