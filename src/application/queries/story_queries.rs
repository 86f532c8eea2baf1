//! Story Queries

use crate::domain::story::StoryKind;

/// 列出所有经典故事
#[derive(Debug, Clone)]
pub struct ListClassicStories;

/// 获取单个经典故事
#[derive(Debug, Clone)]
pub struct GetClassicStory {
    pub story_id: String,
}

/// 恢复会话中保存的已生成故事
#[derive(Debug, Clone)]
pub struct RestoreGeneratedStory {
    pub kind: StoryKind,
}
