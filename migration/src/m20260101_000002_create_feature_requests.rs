// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 功能请求表及开发者代理审计日志表
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FeatureRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeatureRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FeatureRequests::Name).string().not_null())
                    .col(
                        ColumnDef::new(FeatureRequests::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(FeatureRequests::Category).string())
                    .col(
                        ColumnDef::new(FeatureRequests::Priority)
                            .string()
                            .not_null()
                            .default("medium"),
                    )
                    .col(ColumnDef::new(FeatureRequests::Requester).string())
                    .col(ColumnDef::new(FeatureRequests::SourceTweetUrl).string())
                    .col(
                        ColumnDef::new(FeatureRequests::TargetAccount)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FeatureRequests::Status)
                            .string()
                            .not_null()
                            .default("requested"),
                    )
                    .col(
                        ColumnDef::new(FeatureRequests::MentionCount)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(FeatureRequests::AssignedTo).string())
                    .col(
                        ColumnDef::new(FeatureRequests::ImplementationStartedAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(ColumnDef::new(FeatureRequests::ShippedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(FeatureRequests::FailedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(FeatureRequests::RejectedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(FeatureRequests::PrUrl).string())
                    .col(ColumnDef::new(FeatureRequests::PrNumber).integer())
                    .col(ColumnDef::new(FeatureRequests::ErrorMessage).text())
                    .col(ColumnDef::new(FeatureRequests::ImplementationMetadata).json())
                    .col(
                        ColumnDef::new(FeatureRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(FeatureRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // (name, target_account) 唯一
        manager
            .create_index(
                Index::create()
                    .name("idx_feature_requests_name_account")
                    .table(FeatureRequests::Table)
                    .col(FeatureRequests::Name)
                    .col(FeatureRequests::TargetAccount)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_feature_requests_status")
                    .table(FeatureRequests::Table)
                    .col(FeatureRequests::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DeveloperAgentLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeveloperAgentLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DeveloperAgentLogs::FeatureRequestId).uuid())
                    .col(
                        ColumnDef::new(DeveloperAgentLogs::EventType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DeveloperAgentLogs::Message).text().not_null())
                    .col(ColumnDef::new(DeveloperAgentLogs::Payload).json())
                    .col(
                        ColumnDef::new(DeveloperAgentLogs::CreatedAt)
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
                    .name("idx_developer_agent_logs_feature")
                    .table(DeveloperAgentLogs::Table)
                    .col(DeveloperAgentLogs::FeatureRequestId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DeveloperAgentLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FeatureRequests::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FeatureRequests {
    Table,
    Id,
    Name,
    Description,
    Category,
    Priority,
    Requester,
    SourceTweetUrl,
    TargetAccount,
    Status,
    MentionCount,
    AssignedTo,
    ImplementationStartedAt,
    ShippedAt,
    FailedAt,
    RejectedAt,
    PrUrl,
    PrNumber,
    ErrorMessage,
    ImplementationMetadata,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DeveloperAgentLogs {
    Table,
    Id,
    FeatureRequestId,
    EventType,
    Message,
    Payload,
    CreatedAt,
}
