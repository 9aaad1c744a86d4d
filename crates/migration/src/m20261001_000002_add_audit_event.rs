use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Audit trail of settings changes
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuditEvent::Table)
                    .if_not_exists()
                    .col(pk_auto(AuditEvent::Id))
                    .col(
                        ColumnDef::new(AuditEvent::Level)
                            .string()
                            .not_null()
                            .comment("One of 'info', 'notice', 'warning'"),
                    )
                    .col(text(AuditEvent::Message))
                    .col(
                        timestamp_with_time_zone(AuditEvent::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .index(
                        Index::create()
                            .name("idx_audit_event_created_at")
                            .col(AuditEvent::CreatedAt),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditEvent::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AuditEvent {
    Table,
    Id,
    Level,
    Message,
    CreatedAt,
}
