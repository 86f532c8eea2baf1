//! Story Commands - 故事生成与重置

use crate::domain::story::StoryKind;

/// 按关键词生成个性化故事
#[derive(Debug, Clone)]
pub struct GenerateStory {
    pub keywords: Vec<String>,
    pub child_name: String,
}

/// 按睡眠问题生成成人故事
#[derive(Debug, Clone, Default)]
pub struct GenerateAdultStory {
    pub sleep_issue: Option<String>,
    pub custom_sleep_reason: Option<String>,
    pub memories: Vec<String>,
    pub custom_memory: Option<String>,
    pub adult_name: String,
}

/// 开始新故事：停止朗读并清除会话中保存的故事
#[derive(Debug, Clone)]
pub struct ResetStory {
    pub kind: StoryKind,
}
