use std::sync::Arc;

use tracing::warn;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod memory;
pub mod models;
pub mod registry;

pub use backend::SeaOrmStorage;
pub use memory::MemoryRegistry;
pub use models::UrlRecord;
pub use registry::UrlRegistry;

pub struct StorageFactory;

impl StorageFactory {
    /// Build the registry selected by `database.database_url`
    ///
    /// `memory://` selects the non-durable in-memory registry; anything else
    /// is handed to the sea-orm backend.
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<dyn UrlRegistry>> {
        let database_url = &config.database_url;

        if backend::is_memory_url(database_url) {
            warn!("Using in-memory registry: records will NOT survive a restart");
            return Ok(Arc::new(MemoryRegistry::new()));
        }

        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(database_url)?;

        let storage = SeaOrmStorage::new(database_url, &backend_type).await?;
        Ok(Arc::new(storage))
    }
}
