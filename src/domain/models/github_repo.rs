// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// GitHub 仓库，创建后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubRepo {
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

impl GithubRepo {
    pub fn new(owner: &str, name: &str, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            name: name.to_string(),
            url: format!("https://github.com/{}/{}", owner, name),
            description,
            created_at: Utc::now().into(),
        }
    }

    /// `owner/name` 形式的全名
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}
