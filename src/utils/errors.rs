// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// 仓库层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("数据库错误: {0}")]
    Database(DbErr),

    #[error("未找到数据")]
    NotFound,

    #[error("数据已存在: {0}")]
    AlreadyExists(String),

    #[error("存储不可用: {0}")]
    Unavailable(String),
}

impl From<DbErr> for RepositoryError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return RepositoryError::AlreadyExists(detail);
        }
        match err {
            DbErr::ConnectionAcquire(e) => RepositoryError::Unavailable(e.to_string()),
            DbErr::Conn(e) => RepositoryError::Unavailable(e.to_string()),
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepositoryError::NotFound,
            other => RepositoryError::Database(other),
        }
    }
}

/// 外部客户端错误类型
///
/// 覆盖回复抓取、LLM 调用以及开发者代理链路
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("客户端未配置: {0}")]
    NotConfigured(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("HTTP错误 {status}: {body}")]
    Http { status: u16, body: String },

    #[error("请求失败: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Socket错误: {0}")]
    Socket(String),

    #[error("请求超时 ({0}s)")]
    Timeout(u64),

    #[error("协议错误: {0}")]
    Protocol(String),

    #[error("工具调用失败: {0}")]
    Tool(String),
}

/// 编排层错误类型
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// 已有调度周期在执行
    #[error("编排周期正在执行")]
    Busy,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Domain(#[from] crate::domain::models::feature_request::DomainError),

    #[error("无效配置: {0}")]
    InvalidConfig(String),
}
