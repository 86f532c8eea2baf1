//! Story Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{StoryApiPort, StoryStorePort};
use crate::application::queries::{GetClassicStory, ListClassicStories, RestoreGeneratedStory};
use crate::domain::story::{
    ClassicStory, GeneratedStory, KeywordSelection, SleepStorySelection, StoryId,
};

// ============================================================================
// Response DTOs
// ============================================================================

/// 经典故事卡片
#[derive(Debug, Clone, PartialEq)]
pub struct ClassicStoryCard {
    pub id: String,
    pub title: String,
    pub preview: String,
}

impl From<&ClassicStory> for ClassicStoryCard {
    fn from(story: &ClassicStory) -> Self {
        Self {
            id: story.id.clone(),
            title: story.display_title().to_string(),
            preview: story.preview(),
        }
    }
}

/// 恢复出的选择状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoredSelection {
    Keywords(KeywordSelection),
    Sleep(SleepStorySelection),
}

/// 恢复结果：故事本身以及生成它时的选择
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredStory {
    pub story: GeneratedStory,
    pub selection: RestoredSelection,
}

// ============================================================================
// Handlers
// ============================================================================

/// ListClassicStories Handler
pub struct ListClassicStoriesHandler {
    story_api: Arc<dyn StoryApiPort>,
}

impl ListClassicStoriesHandler {
    pub fn new(story_api: Arc<dyn StoryApiPort>) -> Self {
        Self { story_api }
    }

    pub async fn handle(&self, _query: ListClassicStories) -> Result<Vec<ClassicStory>, ApplicationError> {
        let stories = self.story_api.list_stories().await?;
        tracing::debug!(count = stories.len(), "Classic stories listed");
        Ok(stories)
    }
}

/// GetClassicStory Handler
pub struct GetClassicStoryHandler {
    story_api: Arc<dyn StoryApiPort>,
}

impl GetClassicStoryHandler {
    pub fn new(story_api: Arc<dyn StoryApiPort>) -> Self {
        Self { story_api }
    }

    pub async fn handle(&self, query: GetClassicStory) -> Result<ClassicStory, ApplicationError> {
        let id = StoryId::new(query.story_id)?;
        Ok(self.story_api.get_story(&id).await?)
    }
}

/// RestoreGeneratedStory Handler
pub struct RestoreGeneratedStoryHandler {
    story_store: Arc<dyn StoryStorePort>,
}

impl RestoreGeneratedStoryHandler {
    pub fn new(story_store: Arc<dyn StoryStorePort>) -> Self {
        Self { story_store }
    }

    /// 没有保存的故事时返回 None
    pub async fn handle(
        &self,
        query: RestoreGeneratedStory,
    ) -> Result<Option<RestoredStory>, ApplicationError> {
        let Some(story) = self.story_store.load(query.kind)? else {
            return Ok(None);
        };

        let selection = match &story {
            GeneratedStory::Personalised(s) => {
                RestoredSelection::Keywords(KeywordSelection::from_story(s))
            }
            GeneratedStory::Adult(s) => RestoredSelection::Sleep(SleepStorySelection::from_story(s)),
        };
        tracing::debug!(key = query.kind.storage_key(), title = %story.title(), "Story restored");
        Ok(Some(RestoredStory { story, selection }))
    }
}
