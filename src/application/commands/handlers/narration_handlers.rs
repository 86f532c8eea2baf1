//! Narration Command Handlers

use std::sync::Arc;

use crate::application::commands::{ControlNarration, ReadSource, ReadStory};
use crate::application::error::ApplicationError;
use crate::application::narrator::NarrationBackend;
use crate::domain::narration::{NarrationRequest, SessionId};
use crate::domain::story::StoryError;

/// 把朗读来源转换为朗读请求
///
/// 经典故事直接播放 `/static/audio/classic_<id>.mp3`，不经过逐段合成
pub fn narration_request(source: ReadSource) -> Result<NarrationRequest, ApplicationError> {
    let request = match source {
        ReadSource::Generated(story) => NarrationRequest::Text(story.content().to_string()),
        ReadSource::Classic(story) => {
            let id = story.story_id()?;
            NarrationRequest::Prerendered {
                text: story.content.unwrap_or_default(),
                audio_path: id.prerendered_audio_path(),
            }
        }
        ReadSource::Text(text) => NarrationRequest::Text(text),
    };

    if request.text().trim().is_empty() {
        return Err(StoryError::EmptyContent.into());
    }
    Ok(request)
}

/// ReadStory Handler
pub struct ReadStoryHandler {
    narrator: Arc<dyn NarrationBackend>,
}

impl ReadStoryHandler {
    pub fn new(narrator: Arc<dyn NarrationBackend>) -> Self {
        Self { narrator }
    }

    pub async fn handle(&self, command: ReadStory) -> Result<SessionId, ApplicationError> {
        let request = narration_request(command.source)?;
        let session_id = self.narrator.start(request).await?;
        tracing::debug!(
            session_id = %session_id,
            backend = self.narrator.kind().as_str(),
            "Read requested"
        );
        Ok(session_id)
    }
}

/// ControlNarration Handler
pub struct ControlNarrationHandler {
    narrator: Arc<dyn NarrationBackend>,
}

impl ControlNarrationHandler {
    pub fn new(narrator: Arc<dyn NarrationBackend>) -> Self {
        Self { narrator }
    }

    pub async fn handle(&self, command: ControlNarration) -> Result<(), ApplicationError> {
        match command {
            ControlNarration::Pause => self.narrator.pause().await?,
            ControlNarration::Resume => self.narrator.resume().await?,
            ControlNarration::Cancel => self.narrator.cancel().await,
        }
        Ok(())
    }
}
