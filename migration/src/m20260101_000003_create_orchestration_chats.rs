use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrchestrationChats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrchestrationChats::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrchestrationChats::SessionId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OrchestrationChats::Role).string().not_null())
                    .col(ColumnDef::new(OrchestrationChats::Content).text().not_null())
                    .col(ColumnDef::new(OrchestrationChats::Intent).string())
                    .col(
                        ColumnDef::new(OrchestrationChats::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orchestration_chats_session")
                    .table(OrchestrationChats::Table)
                    .col(OrchestrationChats::SessionId)
                    .col(OrchestrationChats::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrchestrationChats::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OrchestrationChats {
    Table,
    Id,
    SessionId,
    Role,
    Content,
    Intent,
    CreatedAt,
}
