// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod chat_handler;
pub mod deployment_handler;
pub mod feature_handler;
pub mod orchestration_handler;
