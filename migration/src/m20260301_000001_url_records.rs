use sea_orm_migration::prelude::*;

/// url_hash 为 xxh3-128 的十六进制表示
const URL_HASH_LEN: u32 = 32;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 url_records 表
        manager
            .create_table(
                Table::create()
                    .table(UrlRecord::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UrlRecord::ShortCode)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UrlRecord::OriginalUrl).text().not_null())
                    .col(
                        ColumnDef::new(UrlRecord::UrlHash)
                            .string_len(URL_HASH_LEN)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UrlRecord::ClickCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UrlRecord::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 唯一约束建在定长摘要上：TEXT 列在 MySQL 上不能建唯一索引，
        // PostgreSQL 的 btree 索引项也有长度上限。
        // 并发创建同一 URL 时只有一个 INSERT 能成功
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_url_records_url_hash")
                    .table(UrlRecord::Table)
                    .col(UrlRecord::UrlHash)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_url_records_created_at")
                    .table(UrlRecord::Table)
                    .col(UrlRecord::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_url_records_created_at")
                    .table(UrlRecord::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("uq_url_records_url_hash")
                    .table(UrlRecord::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(UrlRecord::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UrlRecord {
    #[sea_orm(iden = "url_records")]
    Table,
    ShortCode,
    OriginalUrl,
    UrlHash,
    ClickCount,
    CreatedAt,
}
