// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 监控相关表：github_repos、monitored_urls、orchestration_deployments
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. github_repos
        manager
            .create_table(
                Table::create()
                    .table(GithubRepos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GithubRepos::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GithubRepos::Owner).string().not_null())
                    .col(ColumnDef::new(GithubRepos::Name).string().not_null())
                    .col(ColumnDef::new(GithubRepos::Url).string().not_null())
                    .col(ColumnDef::new(GithubRepos::Description).text())
                    .col(
                        ColumnDef::new(GithubRepos::CreatedAt)
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
                    .name("idx_github_repos_owner_name")
                    .table(GithubRepos::Table)
                    .col(GithubRepos::Owner)
                    .col(GithubRepos::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 2. monitored_urls
        manager
            .create_table(
                Table::create()
                    .table(MonitoredUrls::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MonitoredUrls::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MonitoredUrls::Url).string().not_null())
                    .col(ColumnDef::new(MonitoredUrls::UrlType).string().not_null())
                    .col(
                        ColumnDef::new(MonitoredUrls::CheckFrequencyMinutes)
                            .integer()
                            .not_null()
                            .default(60),
                    )
                    .col(
                        ColumnDef::new(MonitoredUrls::Priority)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(MonitoredUrls::LastCheckedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(MonitoredUrls::GithubRepoId).uuid())
                    .col(
                        ColumnDef::new(MonitoredUrls::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(MonitoredUrls::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(MonitoredUrls::UpdatedAt)
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
                    .name("idx_monitored_urls_url")
                    .table(MonitoredUrls::Table)
                    .col(MonitoredUrls::Url)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 3. orchestration_deployments
        manager
            .create_table(
                Table::create()
                    .table(OrchestrationDeployments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrchestrationDeployments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrchestrationDeployments::GithubRepoId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrchestrationDeployments::MonitoredUrlId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrchestrationDeployments::Configuration)
                            .json()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OrchestrationDeployments::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(OrchestrationDeployments::RunCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OrchestrationDeployments::ErrorCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OrchestrationDeployments::LastRunAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(ColumnDef::new(OrchestrationDeployments::LastError).text())
                    .col(
                        ColumnDef::new(OrchestrationDeployments::NextRunAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(
                        ColumnDef::new(OrchestrationDeployments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(OrchestrationDeployments::UpdatedAt)
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
                    .name("idx_deployments_status")
                    .table(OrchestrationDeployments::Table)
                    .col(OrchestrationDeployments::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(OrchestrationDeployments::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(MonitoredUrls::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GithubRepos::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GithubRepos {
    Table,
    Id,
    Owner,
    Name,
    Url,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum MonitoredUrls {
    Table,
    Id,
    Url,
    UrlType,
    CheckFrequencyMinutes,
    Priority,
    LastCheckedAt,
    GithubRepoId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrchestrationDeployments {
    Table,
    Id,
    GithubRepoId,
    MonitoredUrlId,
    Configuration,
    Status,
    RunCount,
    ErrorCount,
    LastRunAt,
    LastError,
    NextRunAt,
    CreatedAt,
    UpdatedAt,
}
