//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::narrator::NarratorError;
use crate::application::ports::{StoreError, StoryApiError};
use crate::domain::story::StoryError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误（输入不合法，状态不变）
    #[error("{0}")]
    ValidationError(String),

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 朗读错误
    #[error("Narration error: {0}")]
    NarrationError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// 是否为输入校验错误
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_))
    }
}

impl From<StoryError> for ApplicationError {
    fn from(err: StoryError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<StoryApiError> for ApplicationError {
    fn from(err: StoryApiError) -> Self {
        match err {
            StoryApiError::NotFound(id) => Self::not_found("Story", id),
            // 服务端返回的 {error} 原样透出
            StoryApiError::ServiceError { message, .. } => Self::ExternalServiceError(message),
            other => Self::ExternalServiceError(other.to_string()),
        }
    }
}

impl From<StoreError> for ApplicationError {
    fn from(err: StoreError) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<NarratorError> for ApplicationError {
    fn from(err: NarratorError) -> Self {
        match err {
            NarratorError::Narration(e) => Self::InvalidState(e.to_string()),
            other => Self::NarrationError(other.to_string()),
        }
    }
}
