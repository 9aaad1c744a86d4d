use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Option values and the trusted IP datastore.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SettingsOption::Table)
                    .if_not_exists()
                    .col(string(SettingsOption::Name).primary_key())
                    .col(text(SettingsOption::Value))
                    .col(
                        timestamp_with_time_zone(SettingsOption::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TrustedIp::Table)
                    .if_not_exists()
                    .col(string(TrustedIp::CacheKey).primary_key())
                    .col(string(TrustedIp::RemoteAddr))
                    .col(
                        ColumnDef::new(TrustedIp::CidrRange)
                            .small_integer()
                            .not_null()
                            .comment("Prefix length: 32 or 128 means a single host"),
                    )
                    .col(string(TrustedIp::CidrFormat))
                    .col(
                        timestamp_with_time_zone(TrustedIp::AddedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .index(
                        Index::create()
                            .name("idx_trusted_ip_added_at")
                            .col(TrustedIp::AddedAt),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TrustedIp::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SettingsOption::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SettingsOption {
    Table,
    Name,
    Value,
    UpdatedAt,
}

#[derive(Iden)]
enum TrustedIp {
    Table,
    CacheKey,
    RemoteAddr,
    CidrRange,
    CidrFormat,
    AddedAt,
}
