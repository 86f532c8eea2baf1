//! Narrator - 朗读控制面
//!
//! 两种后端实现同一个 [`NarrationBackend`] 接口：
//! - [`RemoteChunkedNarrator`]: 逐段调用远端 TTS，顺序播放音频片段
//! - [`LocalSynthesisNarrator`]: 本地合成器整篇朗读
//!
//! 每个 narrator 内部是一个独占会话的事件循环任务，
//! 对外只暴露 start / pause / resume / cancel。

mod local_synthesis;
mod remote_chunked;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::application::ports::{
    NarrationControls, PlaybackError, PlaybackPort, SpeechError, SpeechSynthesizerPort,
    TtsEnginePort,
};
use crate::domain::narration::{
    NarrationError, NarrationRequest, NarrationSnapshot, SessionId, SessionOptions,
};
use crate::domain::SegmentConfig;

pub use local_synthesis::LocalSynthesisNarrator;
pub use remote_chunked::RemoteChunkedNarrator;

/// Narrator 错误
#[derive(Debug, Error)]
pub enum NarratorError {
    #[error(transparent)]
    Narration(#[from] NarrationError),

    #[error("No active narration session")]
    NoActiveSession,

    #[error("Speech synthesis not supported")]
    Unavailable,

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Speech(#[from] SpeechError),

    #[error("Narrator stopped")]
    Stopped,
}

/// 后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// 远端逐段合成
    #[default]
    Remote,
    /// 本地语音合成
    Local,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

/// 本地合成参数
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechSettings {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// 偏好音色名包含的关键字
    pub voice_hint: Option<String>,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            rate: 0.8, // 睡前故事稍慢
            pitch: 1.0,
            volume: 1.0,
            voice_hint: Some("female".to_string()),
        }
    }
}

/// Narrator 配置
#[derive(Debug, Clone, Default)]
pub struct NarratorConfig {
    pub backend: BackendKind,
    pub segment: SegmentConfig,
    pub prefetch: bool,
    pub mid_stream_retries: u32,
    pub speech: SpeechSettings,
}

impl NarratorConfig {
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            segment: self.segment.clone(),
            prefetch: self.prefetch,
            mid_stream_retries: self.mid_stream_retries,
        }
    }
}

/// 朗读后端统一接口
#[async_trait]
pub trait NarrationBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// 开始朗读；已有会话会先被取消
    async fn start(&self, request: NarrationRequest) -> Result<SessionId, NarratorError>;

    async fn pause(&self) -> Result<(), NarratorError>;

    async fn resume(&self) -> Result<(), NarratorError>;

    /// 取消当前会话；没有会话时为空操作
    async fn cancel(&self);

    /// 当前（或最近一次）会话的快照
    async fn snapshot(&self) -> Option<NarrationSnapshot>;
}

/// 发往事件循环的命令
pub(crate) enum Command {
    Start {
        request: NarrationRequest,
        reply: oneshot::Sender<Result<SessionId, NarratorError>>,
    },
    Pause {
        reply: oneshot::Sender<Result<(), NarratorError>>,
    },
    Resume {
        reply: oneshot::Sender<Result<(), NarratorError>>,
    },
    Cancel {
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<Option<NarrationSnapshot>>,
    },
}

/// 发送命令并等待事件循环回复
pub(crate) async fn request<T>(
    inbox: &mpsc::UnboundedSender<Command>,
    build: impl FnOnce(oneshot::Sender<T>) -> Command,
) -> Result<T, NarratorError> {
    let (tx, rx) = oneshot::channel();
    inbox.send(build(tx)).map_err(|_| NarratorError::Stopped)?;
    rx.await.map_err(|_| NarratorError::Stopped)
}

/// 构建 narrator 所需的外部依赖
#[derive(Clone)]
pub struct NarratorDeps {
    pub tts: Arc<dyn TtsEnginePort>,
    pub playback: Arc<dyn PlaybackPort>,
    pub synthesizer: Arc<dyn SpeechSynthesizerPort>,
    pub controls: Arc<dyn NarrationControls>,
}

/// 按配置创建 narrator（每个页面/前端一个实例）
///
/// 必须在 tokio 运行时内调用
pub fn build_narrator(config: &NarratorConfig, deps: NarratorDeps) -> Arc<dyn NarrationBackend> {
    tracing::info!(
        backend = config.backend.as_str(),
        segmentation = config.segment.policy.as_str(),
        prefetch = config.prefetch,
        "Creating narrator"
    );
    match config.backend {
        BackendKind::Remote => Arc::new(RemoteChunkedNarrator::spawn(
            config.session_options(),
            deps.tts,
            deps.playback,
            deps.controls,
        )),
        BackendKind::Local => Arc::new(LocalSynthesisNarrator::spawn(
            config.speech.clone(),
            deps.synthesizer,
            deps.controls,
        )),
    }
}
