//! Story Context - 故事限界上下文
//!
//! 职责:
//! - 个性化 / 成人 / 经典故事实体
//! - 生成参数的选择与校验
//! - 会话存储键

mod entities;
mod errors;
mod selection;
mod value_objects;

pub use entities::{
    AdultStory, AdultStoryRequest, ClassicStory, GeneratedStory, PersonalisedStory,
    PersonalisedStoryRequest, StoryKind,
};
pub use errors::StoryError;
pub use selection::{
    truncate_label, KeywordSelection, SleepStorySelection, LABEL_MAX_CHARS, MIN_CUSTOM_TEXT_CHARS,
};
pub use value_objects::{normalize_keyword, sleep_issue_display, PersonName, StoryId};
