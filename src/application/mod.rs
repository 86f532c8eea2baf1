//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（StoryApi、TtsEngine、Playback、SpeechSynthesizer、StoryStore 等）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - narrator: 朗读后端（远端逐段 / 本地合成）
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod narrator;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    handlers::{
        narration_request, ControlNarrationHandler, GenerateAdultStoryHandler,
        GenerateStoryHandler, ReadStoryHandler, ResetStoryHandler,
    },
    ControlNarration, GenerateAdultStory, GenerateStory, ReadSource, ReadStory, ResetStory,
};

pub use error::ApplicationError;

pub use narrator::{
    build_narrator, BackendKind, LocalSynthesisNarrator, NarrationBackend, NarratorConfig,
    NarratorDeps, NarratorError, RemoteChunkedNarrator, SpeechSettings,
};

pub use ports::{
    NarrationControls, PlaybackPort, SpeechSynthesizerPort, StoryApiPort, StoryStorePort,
    TtsEnginePort,
};

pub use queries::{
    handlers::{
        ClassicStoryCard, GetClassicStoryHandler, ListClassicStoriesHandler,
        RestoreGeneratedStoryHandler, RestoredSelection, RestoredStory,
    },
    GetClassicStory, ListClassicStories, RestoreGeneratedStory,
};
