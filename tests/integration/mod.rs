// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod api_test;
pub mod chat_agent_test;
pub mod developer_agent_test;
pub mod feature_tracker_test;
pub mod helpers;
pub mod orchestrator_test;
pub mod reply_client_test;
pub mod repositories;
pub mod task_source_test;
