//! Speech Synthesizer Port - 本地语音合成抽象
//!
//! 整篇文本作为一个 utterance 朗读，暂停/继续直接映射到合成器

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::narration::HandleId;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Speech synthesis not supported")]
    Unavailable,

    #[error("Nothing is being spoken")]
    NotSpeaking,

    #[error("Synthesizer error: {0}")]
    SynthesizerError(String),
}

/// 一次朗读的参数
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// 语速倍率，1.0 为正常
    pub rate: f32,
    /// 音高，1.0 为正常
    pub pitch: f32,
    /// 音量 0.0-1.0
    pub volume: f32,
    pub voice: Option<String>,
}

/// 合成器提供的音色
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    pub name: String,
    pub lang: String,
}

/// 选择偏好音色：语言为英语且名字包含 hint（不区分大小写）
pub fn pick_voice<'a>(voices: &'a [VoiceInfo], hint: &str) -> Option<&'a VoiceInfo> {
    let hint = hint.to_lowercase();
    voices
        .iter()
        .find(|v| v.lang.contains("en") && v.name.to_lowercase().contains(&hint))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Started,
    Paused,
    Resumed,
    Ended,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechNotice {
    pub utterance: HandleId,
    pub event: SpeechEvent,
}

#[derive(Debug, Clone)]
pub struct SpeechListener {
    utterance: HandleId,
    tx: mpsc::UnboundedSender<SpeechNotice>,
}

impl SpeechListener {
    pub fn new(utterance: HandleId, tx: mpsc::UnboundedSender<SpeechNotice>) -> Self {
        Self { utterance, tx }
    }

    pub fn utterance(&self) -> HandleId {
        self.utterance
    }

    pub fn emit(&self, event: SpeechEvent) {
        let notice = SpeechNotice {
            utterance: self.utterance,
            event,
        };
        if self.tx.send(notice).is_err() {
            tracing::debug!(utterance = %self.utterance, "Speech listener closed, event dropped");
        }
    }
}

/// Speech Synthesizer Port
///
/// 同一时间只朗读一个 utterance；speak 之前调用方负责 cancel
#[async_trait]
pub trait SpeechSynthesizerPort: Send + Sync {
    /// 探测合成器是否可用；实现方可缓存结果
    async fn is_available(&self) -> bool;

    async fn voices(&self) -> Vec<VoiceInfo>;

    fn speak(&self, utterance: Utterance, listener: SpeechListener) -> Result<(), SpeechError>;

    fn pause(&self) -> Result<(), SpeechError>;

    fn resume(&self) -> Result<(), SpeechError>;

    /// 取消当前朗读；没有朗读时为空操作。取消后不再发出通知
    fn cancel(&self);
}
