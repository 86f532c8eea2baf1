//! In-Memory Story Store Implementation

use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{decode_story, encode_story, StoreError, StoryStorePort};
use crate::domain::story::{GeneratedStory, StoryKind};

/// 内存故事存储
///
/// 与浏览器会话存储一样按键保存序列化后的 JSON，进程退出即丢失
pub struct InMemoryStoryStore {
    entries: DashMap<&'static str, String>,
}

impl InMemoryStoryStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemoryStoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StoryStorePort for InMemoryStoryStore {
    fn save(&self, story: &GeneratedStory) -> Result<(), StoreError> {
        let key = story.kind().storage_key();
        self.entries.insert(key, encode_story(story)?);
        tracing::debug!(key = key, "Story saved");
        Ok(())
    }

    fn load(&self, kind: StoryKind) -> Result<Option<GeneratedStory>, StoreError> {
        match self.entries.get(kind.storage_key()) {
            Some(raw) => decode_story(kind, raw.value()).map(Some),
            None => Ok(None),
        }
    }

    fn remove(&self, kind: StoryKind) -> Result<(), StoreError> {
        if self.entries.remove(kind.storage_key()).is_some() {
            tracing::debug!(key = kind.storage_key(), "Story removed");
        }
        Ok(())
    }
}
