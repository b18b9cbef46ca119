// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::domain::models::feature_request::{FeaturePriority, FeatureRequest, FeatureStatus};

/// 创建功能请求DTO
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateFeatureRequestDto {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(min = 1, max = 100))]
    pub target_account: String,

    #[serde(default)]
    #[validate(length(max = 4000))]
    pub description: String,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    pub priority: Option<FeaturePriority>,

    #[validate(length(max = 100))]
    pub requester: Option<String>,

    #[validate(url)]
    pub source_tweet_url: Option<String>,
}

impl CreateFeatureRequestDto {
    pub fn into_feature(self) -> FeatureRequest {
        let mut feature = FeatureRequest::new(&self.name, &self.target_account, self.description);
        feature.category = self.category;
        feature.priority = self.priority.unwrap_or_default();
        feature.requester = self.requester;
        feature.source_tweet_url = self.source_tweet_url;
        feature
    }
}

/// 更新功能请求DTO
///
/// 只允许修改描述性字段，状态通过 reject/reset 接口修改
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdateFeatureRequestDto {
    #[validate(length(max = 4000))]
    pub description: Option<String>,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    pub priority: Option<FeaturePriority>,
}

impl UpdateFeatureRequestDto {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.category.is_none() && self.priority.is_none()
    }

    pub fn apply(self, feature: &mut FeatureRequest) {
        if let Some(description) = self.description {
            feature.description = description;
        }
        if let Some(category) = self.category {
            feature.category = Some(category);
        }
        if let Some(priority) = self.priority {
            feature.priority = priority;
        }
        feature.updated_at = chrono::Utc::now().into();
    }
}

/// 功能请求查询DTO
#[derive(Debug, Deserialize, Serialize, Validate, Default)]
pub struct FeatureQueryDto {
    pub status: Option<FeatureStatus>,

    #[validate(length(min = 1, max = 100))]
    pub target_account: Option<String>,

    #[validate(range(min = 1, max = 500))]
    pub limit: Option<u64>,

    pub offset: Option<u64>,
}

/// 拒绝请求DTO
#[derive(Debug, Deserialize, Serialize, Validate, Default)]
pub struct RejectFeatureDto {
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

/// 功能请求列表响应DTO
#[derive(Debug, Serialize)]
pub struct FeatureListResponseDto {
    pub success: bool,
    pub data: Vec<FeatureRequest>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// 功能请求统计DTO
#[derive(Debug, Serialize)]
pub struct FeatureStatsDto {
    pub total: u64,
    /// 每个状态都会出现，没有记录时为 0
    pub by_status: BTreeMap<String, u64>,
}
