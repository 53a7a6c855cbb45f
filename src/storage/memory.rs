//! Non-durable registry kept entirely in process memory
//!
//! Used for `memory://` database URLs and in tests. Records are lost on
//! restart.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::errors::{LinkpulseError, Result};
use crate::storage::{UrlRecord, UrlRegistry};

#[derive(Default)]
pub struct MemoryRegistry {
    /// short_code -> record
    records: DashMap<String, UrlRecord>,
    /// original_url -> short_code
    by_url: DashMap<String, String>,
    /// 串行化插入，保证两个唯一性检查和两次写入作为整体发生
    insert_lock: Mutex<()>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UrlRegistry for MemoryRegistry {
    async fn find_by_original_url(&self, url: &str) -> Result<Option<UrlRecord>> {
        let Some(code) = self.by_url.get(url).map(|c| c.value().clone()) else {
            return Ok(None);
        };
        Ok(self.records.get(&code).map(|r| r.value().clone()))
    }

    async fn find_by_short_code(&self, code: &str) -> Result<Option<UrlRecord>> {
        Ok(self.records.get(code).map(|r| r.value().clone()))
    }

    async fn insert(&self, record: UrlRecord) -> Result<()> {
        let _guard = self.insert_lock.lock();

        if self.records.contains_key(&record.short_code) {
            return Err(LinkpulseError::already_exists(format!(
                "short code '{}' is already registered",
                record.short_code
            )));
        }
        if self.by_url.contains_key(&record.original_url) {
            return Err(LinkpulseError::already_exists(format!(
                "URL '{}' is already registered",
                record.original_url
            )));
        }

        // 先写主表再写索引：读者通过索引找到短码时，记录一定已可见
        self.records
            .insert(record.short_code.clone(), record.clone());
        self.by_url.insert(record.original_url, record.short_code);
        Ok(())
    }

    async fn increment_click(&self, code: &str) -> Result<Option<u64>> {
        // get_mut 持有分片写锁，读-改-写不会与其他自增交错
        Ok(self.records.get_mut(code).map(|mut r| {
            r.click_count += 1;
            r.click_count
        }))
    }

    async fn list_all(&self) -> Result<Vec<UrlRecord>> {
        let mut all: Vec<UrlRecord> = self.records.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.short_code.cmp(&b.short_code))
        });
        Ok(all)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.len() as u64)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
