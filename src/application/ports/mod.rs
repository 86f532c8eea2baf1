//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod narration_controls;
mod playback;
mod speech_synthesizer;
mod story_api;
mod story_store;
mod tts_engine;

pub use narration_controls::NarrationControls;
pub use playback::{
    PlaybackError, PlaybackEvent, PlaybackHandle, PlaybackListener, PlaybackNotice, PlaybackPort,
};
pub use speech_synthesizer::{
    pick_voice, SpeechError, SpeechEvent, SpeechListener, SpeechNotice, SpeechSynthesizerPort,
    Utterance, VoiceInfo,
};
pub use story_api::{StoryApiError, StoryApiPort};
pub use story_store::{decode_story, encode_story, StoreError, StoryStorePort};
pub use tts_engine::{SynthesizeRequest, SynthesizedAudio, TtsEnginePort, TtsError};
