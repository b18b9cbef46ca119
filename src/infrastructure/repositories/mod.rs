// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod agent_log_repo_impl;
pub mod chat_repo_impl;
pub mod deployment_repo_impl;
pub mod feature_request_repo_impl;
pub mod github_repo_repo_impl;
pub mod monitored_url_repo_impl;
