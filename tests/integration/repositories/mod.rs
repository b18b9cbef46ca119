// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod deployment_repository_test;
pub mod feature_request_repository_test;
