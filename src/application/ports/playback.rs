//! Playback Port - 音频播放句柄抽象
//!
//! 一个句柄对应一段可播放音频，支持播放/暂停/停止，
//! 并通过 [`PlaybackListener`] 发出 Started/Paused/Ended/Failed 通知。

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::narration::HandleId;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Audio source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Player error: {0}")]
    PlayerError(String),

    #[error("Handle already released")]
    Released,
}

/// 播放通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    Started,
    Paused,
    Ended,
    Failed(String),
}

/// 带句柄 ID 的播放通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackNotice {
    pub handle: HandleId,
    pub event: PlaybackEvent,
}

/// 播放事件监听器
///
/// 所有句柄共用同一个接收端，通知按句柄 ID 区分
#[derive(Debug, Clone)]
pub struct PlaybackListener {
    handle: HandleId,
    tx: mpsc::UnboundedSender<PlaybackNotice>,
}

impl PlaybackListener {
    pub fn new(handle: HandleId, tx: mpsc::UnboundedSender<PlaybackNotice>) -> Self {
        Self { handle, tx }
    }

    pub fn handle(&self) -> HandleId {
        self.handle
    }

    pub fn emit(&self, event: PlaybackEvent) {
        let notice = PlaybackNotice {
            handle: self.handle,
            event,
        };
        if self.tx.send(notice).is_err() {
            tracing::debug!(handle = %self.handle, "Playback listener closed, event dropped");
        }
    }
}

/// 播放句柄
pub trait PlaybackHandle: Send {
    fn id(&self) -> HandleId;

    /// 开始播放，或从暂停位置继续
    fn play(&mut self) -> Result<(), PlaybackError>;

    /// 原位暂停
    fn pause(&mut self) -> Result<(), PlaybackError>;

    /// 解除监听，之后不再发出任何通知
    fn detach(&mut self);

    /// 停止并释放资源
    fn stop(&mut self);
}

/// Playback Port
#[async_trait]
pub trait PlaybackPort: Send + Sync {
    /// 准备音频资源，返回尚未开始播放的句柄
    async fn open(
        &self,
        source: &str,
        listener: PlaybackListener,
    ) -> Result<Box<dyn PlaybackHandle>, PlaybackError>;
}
