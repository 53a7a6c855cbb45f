//! Short code ↔ original URL record

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "url_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub short_code: String,
    #[sea_orm(column_type = "Text")]
    pub original_url: String,
    /// 128 位 xxh3 摘要（十六进制），承担 original_url 的唯一约束
    #[sea_orm(unique)]
    pub url_hash: String,
    pub click_count: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
