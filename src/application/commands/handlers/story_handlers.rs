//! Story Command Handlers

use std::sync::Arc;

use crate::application::commands::{GenerateAdultStory, GenerateStory, ResetStory};
use crate::application::error::ApplicationError;
use crate::application::narrator::NarrationBackend;
use crate::application::ports::{StoryApiPort, StoryStorePort};
use crate::domain::story::{
    AdultStory, GeneratedStory, KeywordSelection, PersonalisedStory, SleepStorySelection,
};

// ============================================================================
// GenerateStory
// ============================================================================

/// GenerateStory Handler - 校验选择、调用故事服务并保存到会话
pub struct GenerateStoryHandler {
    story_api: Arc<dyn StoryApiPort>,
    story_store: Arc<dyn StoryStorePort>,
}

impl GenerateStoryHandler {
    pub fn new(story_api: Arc<dyn StoryApiPort>, story_store: Arc<dyn StoryStorePort>) -> Self {
        Self {
            story_api,
            story_store,
        }
    }

    pub async fn handle(&self, command: GenerateStory) -> Result<PersonalisedStory, ApplicationError> {
        let mut selection = KeywordSelection::new();
        for keyword in &command.keywords {
            selection.add_custom(keyword);
        }
        let request = selection.to_request(&command.child_name)?;

        tracing::info!(
            keywords = ?request.keywords,
            child_name = %request.child_name,
            "Generating story"
        );
        let story = self.story_api.generate_story(&request).await?;

        self.story_store
            .save(&GeneratedStory::Personalised(story.clone()))?;

        tracing::info!(title = %story.title, text_len = story.content.len(), "Story generated");
        Ok(story)
    }
}

// ============================================================================
// GenerateAdultStory
// ============================================================================

/// GenerateAdultStory Handler
pub struct GenerateAdultStoryHandler {
    story_api: Arc<dyn StoryApiPort>,
    story_store: Arc<dyn StoryStorePort>,
}

impl GenerateAdultStoryHandler {
    pub fn new(story_api: Arc<dyn StoryApiPort>, story_store: Arc<dyn StoryStorePort>) -> Self {
        Self {
            story_api,
            story_store,
        }
    }

    pub async fn handle(&self, command: GenerateAdultStory) -> Result<AdultStory, ApplicationError> {
        let mut selection = SleepStorySelection::new();
        if let Some(issue) = command.sleep_issue.as_deref() {
            selection.select_sleep_issue(issue);
        }
        // 自定义原因覆盖预设问题
        if let Some(reason) = command.custom_sleep_reason.as_deref() {
            selection.set_custom_sleep_reason(reason)?;
        }
        for memory in &command.memories {
            selection.toggle_memory(memory);
        }
        if let Some(memory) = command.custom_memory.as_deref() {
            selection.set_custom_memory(memory)?;
        }
        let request = selection.to_request(&command.adult_name)?;

        tracing::info!(
            sleep_issue = request.sleep_issue.as_deref().unwrap_or("custom"),
            memories = request.memories.len(),
            "Generating adult story"
        );
        let story = self.story_api.generate_adult_story(&request).await?;

        self.story_store.save(&GeneratedStory::Adult(story.clone()))?;

        tracing::info!(title = %story.title, text_len = story.content.len(), "Adult story generated");
        Ok(story)
    }
}

// ============================================================================
// ResetStory
// ============================================================================

/// ResetStory Handler - 取消朗读并清除会话故事
pub struct ResetStoryHandler {
    story_store: Arc<dyn StoryStorePort>,
    narrator: Arc<dyn NarrationBackend>,
}

impl ResetStoryHandler {
    pub fn new(story_store: Arc<dyn StoryStorePort>, narrator: Arc<dyn NarrationBackend>) -> Self {
        Self {
            story_store,
            narrator,
        }
    }

    pub async fn handle(&self, command: ResetStory) -> Result<(), ApplicationError> {
        self.narrator.cancel().await;
        self.story_store.remove(command.kind)?;
        tracing::info!(key = command.kind.storage_key(), "Stored story cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::application::ports::StoryApiError;
    use crate::domain::story::{
        AdultStoryRequest, ClassicStory, PersonalisedStoryRequest, StoryId, StoryKind,
    };
    use crate::infrastructure::memory::InMemoryStoryStore;

    #[derive(Default)]
    struct RecordingApi {
        personalised: Mutex<Vec<PersonalisedStoryRequest>>,
        adult: Mutex<Vec<AdultStoryRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl StoryApiPort for RecordingApi {
        async fn generate_story(
            &self,
            request: &PersonalisedStoryRequest,
        ) -> Result<PersonalisedStory, StoryApiError> {
            if self.fail {
                return Err(StoryApiError::ServiceError {
                    status: 500,
                    message: "Failed to generate story".into(),
                });
            }
            self.personalised.lock().unwrap().push(request.clone());
            Ok(PersonalisedStory {
                title: format!("{}'s Story", request.child_name),
                content: "Once upon a time.".into(),
                keywords: request.keywords.clone(),
                child_name: request.child_name.to_string(),
                timestamp: None,
                story_type: Some("generated".into()),
                temporary: true,
            })
        }

        async fn generate_adult_story(
            &self,
            request: &AdultStoryRequest,
        ) -> Result<AdultStory, StoryApiError> {
            self.adult.lock().unwrap().push(request.clone());
            Ok(AdultStory {
                title: "Quiet Evening".into(),
                content: "Breathe slowly.".into(),
                sleep_issue: request.sleep_issue.clone(),
                custom_sleep_reason: request.custom_sleep_reason.clone().unwrap_or_default(),
                sleep_issue_display: String::new(),
                memories: request.memories.clone(),
                custom_memory: request.custom_memory.clone().unwrap_or_default(),
                adult_name: request.adult_name.to_string(),
                timestamp: None,
                story_type: None,
                temporary: true,
            })
        }

        async fn list_stories(&self) -> Result<Vec<ClassicStory>, StoryApiError> {
            Ok(Vec::new())
        }

        async fn get_story(&self, id: &StoryId) -> Result<ClassicStory, StoryApiError> {
            Err(StoryApiError::NotFound(id.to_string()))
        }
    }

    #[tokio::test]
    async fn test_generate_story_saves_to_store() {
        let api = Arc::new(RecordingApi::default());
        let store = Arc::new(InMemoryStoryStore::new());
        let handler = GenerateStoryHandler::new(api.clone(), store.clone());

        let story = handler
            .handle(GenerateStory {
                keywords: vec![" Dragons ".into(), "moon".into(), "dragons".into()],
                child_name: " Mia ".into(),
            })
            .await
            .unwrap();

        assert_eq!(story.child_name, "Mia");
        let sent = api.personalised.lock().unwrap();
        assert_eq!(sent[0].keywords, vec!["dragons", "moon"]);
        let saved = store.load(StoryKind::Personalised).unwrap().unwrap();
        assert_eq!(saved, GeneratedStory::Personalised(story));
    }

    #[tokio::test]
    async fn test_generate_story_validation_does_not_call_api() {
        let api = Arc::new(RecordingApi::default());
        let store = Arc::new(InMemoryStoryStore::new());
        let handler = GenerateStoryHandler::new(api.clone(), store.clone());

        let err = handler
            .handle(GenerateStory {
                keywords: vec![],
                child_name: "Mia".into(),
            })
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = handler
            .handle(GenerateStory {
                keywords: vec!["moon".into()],
                child_name: "   ".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please enter your name!");
        assert!(api.personalised.lock().unwrap().is_empty());
        assert!(store.load(StoryKind::Personalised).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_generate_story_service_error_is_not_saved() {
        let api = Arc::new(RecordingApi {
            fail: true,
            ..Default::default()
        });
        let store = Arc::new(InMemoryStoryStore::new());
        let handler = GenerateStoryHandler::new(api, store.clone());

        let err = handler
            .handle(GenerateStory {
                keywords: vec!["moon".into()],
                child_name: "Mia".into(),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to generate story"));
        assert!(store.load(StoryKind::Personalised).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_custom_reason_overrides_sleep_issue() {
        let api = Arc::new(RecordingApi::default());
        let store = Arc::new(InMemoryStoryStore::new());
        let handler = GenerateAdultStoryHandler::new(api.clone(), store.clone());

        handler
            .handle(GenerateAdultStory {
                sleep_issue: Some("racing_thoughts".into()),
                custom_sleep_reason: Some("Worried about tomorrow's exam".into()),
                memories: vec!["Summer holidays".into()],
                adult_name: "Sam".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let sent = api.adult.lock().unwrap();
        assert_eq!(sent[0].sleep_issue, None);
        assert_eq!(
            sent[0].custom_sleep_reason.as_deref(),
            Some("Worried about tomorrow's exam")
        );
        assert!(store.load(StoryKind::Adult).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_adult_story_requires_detailed_custom_text() {
        let api = Arc::new(RecordingApi::default());
        let store = Arc::new(InMemoryStoryStore::new());
        let handler = GenerateAdultStoryHandler::new(api.clone(), store);

        let err = handler
            .handle(GenerateAdultStory {
                custom_sleep_reason: Some("stress".into()),
                adult_name: "Sam".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = handler
            .handle(GenerateAdultStory {
                adult_name: "Sam".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(api.adult.lock().unwrap().is_empty());
    }
}
