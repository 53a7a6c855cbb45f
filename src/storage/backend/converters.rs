use xxhash_rust::xxh3::xxh3_128;

use crate::storage::UrlRecord;
use migration::entities::url_record;

/// original_url 的唯一键：xxh3-128 的 32 位十六进制
pub fn url_hash(url: &str) -> String {
    format!("{:032x}", xxh3_128(url.as_bytes()))
}

/// 将 Sea-ORM Model 转换为 UrlRecord
pub fn model_to_record(model: url_record::Model) -> UrlRecord {
    UrlRecord {
        original_url: model.original_url,
        short_code: model.short_code,
        click_count: model.click_count.max(0) as u64,
        created_at: model.created_at,
    }
}

/// 将 UrlRecord 转换为 ActiveModel（仅用于插入）
pub fn record_to_active_model(record: &UrlRecord) -> url_record::ActiveModel {
    use sea_orm::ActiveValue::Set;

    url_record::ActiveModel {
        short_code: Set(record.short_code.clone()),
        original_url: Set(record.original_url.clone()),
        url_hash: Set(url_hash(&record.original_url)),
        click_count: Set(record.click_count as i64),
        created_at: Set(record.created_at),
    }
}
