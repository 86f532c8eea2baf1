//! Story Store Port - 会话级故事存储
//!
//! 保存最近一次生成的故事，刷新/重启后用于恢复界面

use thiserror::Error;

use crate::domain::story::{GeneratedStory, StoryKind};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Story Store Port
///
/// 每种故事只保存一份，按 [`StoryKind::storage_key`] 存取
pub trait StoryStorePort: Send + Sync {
    fn save(&self, story: &GeneratedStory) -> Result<(), StoreError>;

    fn load(&self, kind: StoryKind) -> Result<Option<GeneratedStory>, StoreError>;

    fn remove(&self, kind: StoryKind) -> Result<(), StoreError>;
}

/// 序列化为服务端返回的原始 JSON 结构
pub fn encode_story(story: &GeneratedStory) -> Result<String, StoreError> {
    let encoded = match story {
        GeneratedStory::Personalised(s) => serde_json::to_string(s),
        GeneratedStory::Adult(s) => serde_json::to_string(s),
    };
    encoded.map_err(|e| StoreError::Serialization(e.to_string()))
}

pub fn decode_story(kind: StoryKind, raw: &str) -> Result<GeneratedStory, StoreError> {
    let decoded = match kind {
        StoryKind::Personalised => serde_json::from_str(raw).map(GeneratedStory::Personalised),
        StoryKind::Adult => serde_json::from_str(raw).map(GeneratedStory::Adult),
    };
    decoded.map_err(|e| StoreError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::story::PersonalisedStory;

    #[test]
    fn test_encode_decode_keeps_kind() {
        let story = GeneratedStory::Personalised(PersonalisedStory {
            title: "Mia's Story with stars".into(),
            content: "Once.\n\nTwice.".into(),
            keywords: vec!["stars".into()],
            child_name: "Mia".into(),
            timestamp: None,
            story_type: Some("generated".into()),
            temporary: true,
        });
        let raw = encode_story(&story).unwrap();
        assert!(raw.contains("\"type\":\"generated\""));
        assert_eq!(decode_story(StoryKind::Personalised, &raw).unwrap(), story);
    }

    #[test]
    fn test_decode_garbage_is_serialization_error() {
        let err = decode_story(StoryKind::Adult, "{not json").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
