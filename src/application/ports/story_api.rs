//! Story API Port - 故事服务抽象
//!
//! 故事生成与经典故事查询，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::story::{
    AdultStory, AdultStoryRequest, ClassicStory, PersonalisedStory, PersonalisedStoryRequest,
    StoryId,
};

/// 故事服务错误
#[derive(Debug, Error)]
pub enum StoryApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Story not found: {0}")]
    NotFound(String),

    #[error("Service error (HTTP {status}): {message}")]
    ServiceError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Story API Port
#[async_trait]
pub trait StoryApiPort: Send + Sync {
    /// 按关键词生成个性化故事
    async fn generate_story(
        &self,
        request: &PersonalisedStoryRequest,
    ) -> Result<PersonalisedStory, StoryApiError>;

    /// 按睡眠问题生成成人故事
    async fn generate_adult_story(
        &self,
        request: &AdultStoryRequest,
    ) -> Result<AdultStory, StoryApiError>;

    /// 列出经典故事
    async fn list_stories(&self) -> Result<Vec<ClassicStory>, StoryApiError>;

    /// 获取单个经典故事
    async fn get_story(&self, id: &StoryId) -> Result<ClassicStory, StoryApiError>;
}
