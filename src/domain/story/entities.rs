//! Story Context - Entities
//!
//! 字段名与故事服务返回的 JSON 保持一致，可直接序列化进会话存储

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{PersonName, StoryError, StoryId};

const PREVIEW_CHARS: usize = 150;

/// 个性化儿童故事（按关键词生成）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalisedStory {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub child_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub story_type: Option<String>,
    #[serde(default)]
    pub temporary: bool,
}

impl PersonalisedStory {
    /// 主角名，缺省为 "Adventure"
    pub fn starring(&self) -> &str {
        if self.child_name.is_empty() {
            "Adventure"
        } else {
            &self.child_name
        }
    }
}

/// 成人助眠故事（按睡眠问题和怀旧记忆生成）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdultStory {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub sleep_issue: Option<String>,
    #[serde(default)]
    pub custom_sleep_reason: String,
    #[serde(default)]
    pub sleep_issue_display: String,
    #[serde(default)]
    pub memories: Vec<String>,
    #[serde(default)]
    pub custom_memory: String,
    #[serde(default)]
    pub adult_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub story_type: Option<String>,
    #[serde(default)]
    pub temporary: bool,
}

impl AdultStory {
    /// 听众名，缺省为 "You"
    pub fn created_for(&self) -> &str {
        if self.adult_name.is_empty() {
            "You"
        } else {
            &self.adult_name
        }
    }
}

/// 经典故事（服务端预置，带预渲染音频）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassicStory {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub story_type: Option<String>,
}

impl ClassicStory {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled Story")
    }

    /// 卡片预览：正文前 150 个字符
    pub fn preview(&self) -> String {
        match self.content.as_deref() {
            Some(content) if !content.is_empty() => {
                let head: String = content.chars().take(PREVIEW_CHARS).collect();
                format!("{}...", head)
            }
            _ => "No content available".to_string(),
        }
    }

    pub fn story_id(&self) -> Result<StoryId, StoryError> {
        StoryId::new(self.id.clone())
    }
}

/// 会话中保存的已生成故事种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoryKind {
    Personalised,
    Adult,
}

impl StoryKind {
    /// 会话存储键
    pub fn storage_key(&self) -> &'static str {
        match self {
            Self::Personalised => "currentGeneratedStory",
            Self::Adult => "currentGeneratedAdultStory",
        }
    }
}

/// 会话中保存的已生成故事
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedStory {
    Personalised(PersonalisedStory),
    Adult(AdultStory),
}

impl GeneratedStory {
    pub fn kind(&self) -> StoryKind {
        match self {
            Self::Personalised(_) => StoryKind::Personalised,
            Self::Adult(_) => StoryKind::Adult,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Personalised(s) => &s.title,
            Self::Adult(s) => &s.title,
        }
    }

    /// 原始正文（保留换行，分段依赖它）
    pub fn content(&self) -> &str {
        match self {
            Self::Personalised(s) => &s.content,
            Self::Adult(s) => &s.content,
        }
    }
}

/// 个性化故事生成请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalisedStoryRequest {
    pub keywords: Vec<String>,
    pub child_name: PersonName,
}

/// 成人故事生成请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdultStoryRequest {
    pub sleep_issue: Option<String>,
    pub custom_sleep_reason: Option<String>,
    pub memories: Vec<String>,
    pub custom_memory: Option<String>,
    pub adult_name: PersonName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personalised_story_from_service_json() {
        let json = r#"{
            "title": "Mia's Story with dragons, moon",
            "content": "Once upon a time...\n\nThe end.",
            "keywords": ["dragons", "moon"],
            "child_name": "Mia",
            "timestamp": "2024-05-01T20:15:30.123456",
            "type": "generated",
            "temporary": true
        }"#;
        let story: PersonalisedStory = serde_json::from_str(json).unwrap();
        assert_eq!(story.keywords, vec!["dragons", "moon"]);
        assert_eq!(story.starring(), "Mia");
        assert_eq!(story.story_type.as_deref(), Some("generated"));
        assert!(story.timestamp.is_some());
        assert!(story.temporary);
    }

    #[test]
    fn test_adult_story_defaults() {
        let json = r#"{"title": "A Soothing Story", "content": "Breathe.", "sleep_issue": null}"#;
        let story: AdultStory = serde_json::from_str(json).unwrap();
        assert_eq!(story.created_for(), "You");
        assert!(story.memories.is_empty());
        assert!(story.sleep_issue.is_none());
    }

    #[test]
    fn test_classic_story_preview_and_title() {
        let story = ClassicStory {
            id: "abc".to_string(),
            title: None,
            content: Some("x".repeat(200)),
            keywords: vec![],
            timestamp: None,
            story_type: None,
        };
        assert_eq!(story.display_title(), "Untitled Story");
        assert_eq!(story.preview().chars().count(), 153);

        let empty = ClassicStory { content: None, ..story };
        assert_eq!(empty.preview(), "No content available");
    }

    #[test]
    fn test_storage_keys() {
        assert_eq!(StoryKind::Personalised.storage_key(), "currentGeneratedStory");
        assert_eq!(StoryKind::Adult.storage_key(), "currentGeneratedAdultStory");
    }
}
