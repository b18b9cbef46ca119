// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "feature_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: Option<String>,
    pub priority: String,
    pub requester: Option<String>,
    pub source_tweet_url: Option<String>,
    pub target_account: String,
    pub status: String,
    pub mention_count: i32,
    pub assigned_to: Option<String>,
    pub implementation_started_at: Option<ChronoDateTimeWithTimeZone>,
    pub shipped_at: Option<ChronoDateTimeWithTimeZone>,
    pub failed_at: Option<ChronoDateTimeWithTimeZone>,
    pub rejected_at: Option<ChronoDateTimeWithTimeZone>,
    pub pr_url: Option<String>,
    pub pr_number: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,
    pub implementation_metadata: Option<Json>,
    pub created_at: ChronoDateTimeWithTimeZone,
    pub updated_at: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
