// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::models::feature_request::{
    normalize_account, normalize_feature_name, DomainError, FeaturePriority, FeatureRequest,
};
use crate::domain::repositories::feature_request_repository::FeatureRequestRepository;
use crate::utils::errors::RepositoryError;

/// 从回复中识别出的一次功能提及
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureMention {
    pub name: String,
    pub target_account: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub requester: Option<String>,
    #[serde(default)]
    pub source_tweet_url: Option<String>,
    #[serde(default)]
    pub priority: Option<FeaturePriority>,
}

/// 功能请求跟踪服务
///
/// 同名同账号的提及合并到已有记录上（mention_count + 1），不会改变其状态
pub struct FeatureTracker {
    features: Arc<dyn FeatureRequestRepository>,
}

impl FeatureTracker {
    pub fn new(features: Arc<dyn FeatureRequestRepository>) -> Self {
        Self { features }
    }

    pub async fn track(&self, mention: FeatureMention) -> Result<FeatureRequest> {
        let name = normalize_feature_name(&mention.name);
        let account = normalize_account(&mention.target_account);
        if name.is_empty() || account.is_empty() {
            return Err(DomainError::ValidationError(
                "feature name and target account are required".to_string(),
            )
            .into());
        }

        if let Some(existing) = self.features.find_by_name_and_account(&name, &account).await? {
            return self.bump(existing, &mention).await;
        }

        let mut feature = FeatureRequest::new(
            &name,
            &account,
            mention.description.clone().unwrap_or_default(),
        );
        feature.category = mention.category.clone();
        feature.requester = mention.requester.clone();
        feature.source_tweet_url = mention.source_tweet_url.clone();
        if let Some(priority) = mention.priority {
            feature.priority = priority;
        }

        match self.features.create(&feature).await {
            Ok(created) => {
                info!(feature = %created.name, account = %created.target_account, "Tracked new feature request");
                Ok(created)
            }
            // 并发插入时回退为合并
            Err(RepositoryError::AlreadyExists(_)) => {
                let existing = self
                    .features
                    .find_by_name_and_account(&name, &account)
                    .await?
                    .ok_or(RepositoryError::NotFound)?;
                self.bump(existing, &mention).await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn bump(
        &self,
        mut existing: FeatureRequest,
        mention: &FeatureMention,
    ) -> Result<FeatureRequest> {
        existing.mention_count += 1;
        if existing.description.trim().is_empty() {
            if let Some(description) = &mention.description {
                existing.description = description.clone();
            }
        }
        if existing.category.is_none() {
            existing.category = mention.category.clone();
        }
        if existing.requester.is_none() {
            existing.requester = mention.requester.clone();
        }
        if existing.source_tweet_url.is_none() {
            existing.source_tweet_url = mention.source_tweet_url.clone();
        }
        existing.updated_at = Utc::now().into();

        let updated = self.features.update(&existing).await?;
        debug!(
            feature = %updated.name,
            mentions = updated.mention_count,
            "Merged repeated feature mention"
        );
        Ok(updated)
    }
}
